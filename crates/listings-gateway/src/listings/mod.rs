//! Listings provider integration: query building, tolerant decoding, featured selection,
//! rental reconciliation, and the HTTP routes that expose them.

pub mod client;
pub mod featured;
pub mod model;
pub mod presets;
pub mod query;
pub mod reconcile;
pub mod rentals;
pub mod router;
pub mod scalar;
pub mod service;

pub use client::{
    AddressSearch, BulkStream, ByteStream, HttpListingsClient, ListingsError, ListingsProvider,
};
pub use model::{
    FeaturedListing, ListingData, ListingKey, ListingRecord, ListingsPage, Media, RawListing,
    RentalCandidate,
};
pub use query::{Bounds, Predicate, Query, QueryBuilder, SortDirection};
pub use rentals::{RentalRecord, RentalStore, RentalStoreError, StaticRentalStore};
pub use router::listings_router;
pub use service::{ListingsService, RentalListings, ServiceError};
