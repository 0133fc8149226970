use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::client::{AddressSearch, BulkStream, ListingsError, ListingsProvider};
use super::featured::{self, FEATURED_LIMIT};
use super::model::{
    FeaturedListing, ListingData, ListingKey, ListingRecord, ListingsPage, RentalCandidate,
};
use super::presets;
use super::query::Query;
use super::reconcile::reconcile_data;
use super::rentals::{RentalStore, RentalStoreError};

pub const RENTAL_LISTING_FIELDS: &[&str] = &[
    "listing_id",
    "unparsed_address",
    "list_price",
    "city",
    "state_or_province",
    "bedrooms_total",
    "bathrooms_total_decimal",
    "living_area",
    "latitude",
    "longitude",
    "modification_timestamp",
    "mls_status",
];
pub const RENTAL_PHOTO_FIELDS: &[&str] = &["uri_thumb", "uri_800", "is_primary"];

pub const CANDIDATE_FIELDS: &[&str] = &[
    "id",
    "listing_id",
    "unparsed_address",
    "mls_status",
    "list_price",
    "bedrooms_total",
    "bathrooms_full",
    "city",
    "state_or_province",
];
pub const CANDIDATE_PROPERTY_TYPE: &str = "Residential Lease";
pub const CANDIDATE_LIMIT: u32 = 50;
const AVAILABLE_STATUSES: &[&str] = &["active", "coming soon", "pending", "active under contract"];

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Listings(#[from] ListingsError),
    #[error(transparent)]
    RentalStore(#[from] RentalStoreError),
    #[error("{operation}: records do not match the listing schema: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("{0} not found")]
    NotFound(String),
}

/// Rentals merged with provider data, in the curated order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RentalListings {
    pub properties: ListingData,
    pub count: usize,
}

/// Listing use cases composed over a provider and the local rental list.
pub struct ListingsService<P, R> {
    provider: Arc<P>,
    rentals: Arc<R>,
}

impl<P, R> ListingsService<P, R>
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    pub fn new(provider: Arc<P>, rentals: Arc<R>) -> Self {
        Self { provider, rentals }
    }

    /// Up to six listings: the brokerage's own first, topped up from the fallback city.
    pub async fn featured_listings(&self) -> Result<Vec<FeaturedListing>, ServiceError> {
        let office = self
            .provider
            .query(&featured::office_query())
            .await?
            .data
            .into_records()
            .map_err(decode_error("featured office listings"))?;

        let mut seen = HashSet::new();
        let mut selected: Vec<ListingRecord> = Vec::with_capacity(FEATURED_LIMIT);
        push_unique(&mut selected, &mut seen, office);
        debug!(office = selected.len(), "featured office listings selected");

        if selected.len() < FEATURED_LIMIT {
            match self.provider.query(&featured::fallback_query()).await {
                Ok(page) => match page.data.into_records() {
                    Ok(records) => push_unique(&mut selected, &mut seen, records),
                    Err(error) => warn!(%error, "featured fallback listings undecodable"),
                },
                Err(error) => warn!(%error, "featured fallback query failed"),
            }
        }

        info!(count = selected.len(), "featured listings assembled");
        Ok(selected.iter().map(featured::project).collect())
    }

    /// Curated rentals with provider data attached. Makes no provider call when there are
    /// no rentals.
    pub async fn rentals_with_listings(&self) -> Result<RentalListings, ServiceError> {
        let rentals = self.rentals.ordered()?;
        if rentals.is_empty() {
            return Ok(RentalListings {
                properties: ListingData::Raw(Vec::new()),
                count: 0,
            });
        }

        let search = AddressSearch {
            addresses: rentals
                .iter()
                .map(|rental| rental.unparsed_address.clone())
                .collect(),
            fields: Some(RENTAL_LISTING_FIELDS.iter().map(|f| f.to_string()).collect()),
            include_photos: true,
            photo_fields: RENTAL_PHOTO_FIELDS.iter().map(|f| f.to_string()).collect(),
        };
        let page = self.provider.search_by_addresses(&search).await?;
        let properties = reconcile_data(&rentals, page.data);
        debug!(
            rentals = rentals.len(),
            matched = properties.len(),
            "rentals reconciled"
        );

        Ok(RentalListings {
            count: properties.len(),
            properties,
        })
    }

    pub async fn neighborhood(&self, slug: &str) -> Result<ListingsPage, ServiceError> {
        let query = presets::neighborhood(slug)
            .ok_or_else(|| ServiceError::NotFound("Neighborhood".into()))?;
        Ok(self.provider.query(&query).await?)
    }

    pub async fn lookup_listing(
        &self,
        listing_id: &str,
        include_photos: bool,
    ) -> Result<ListingsPage, ServiceError> {
        let listing_id = listing_id.trim();
        if listing_id.is_empty() {
            return Err(ServiceError::InvalidQuery("listing_id is required".into()));
        }
        let query = Query::by_listing_id(listing_id, include_photos);
        Ok(self.provider.query(&query).await?)
    }

    pub async fn query(&self, query: &Query) -> Result<ListingsPage, ServiceError> {
        Ok(self.provider.query(query).await?)
    }

    pub async fn stream_bulk(&self) -> Result<BulkStream, ServiceError> {
        Ok(self.provider.stream_bulk().await?)
    }

    /// Operator search for a lease listing to attach to the rentals page. Numeric input is
    /// treated as an MLS listing id, anything else as an address fragment.
    pub async fn search_rental_candidates(
        &self,
        q: &str,
    ) -> Result<Vec<RentalCandidate>, ServiceError> {
        let q = q.trim();
        if q.is_empty() {
            return Err(ServiceError::InvalidQuery(
                "search query must not be empty".into(),
            ));
        }

        let builder = Query::builder()
            .fields(CANDIDATE_FIELDS.iter().copied())
            .eq("property_type", CANDIDATE_PROPERTY_TYPE)
            .limit(CANDIDATE_LIMIT);
        let query = if q.parse::<i64>().is_ok() {
            builder.eq("listing_id", q)
        } else {
            builder.contains("unparsed_address", q)
        }
        .build();

        let records = self
            .provider
            .query(&query)
            .await?
            .data
            .into_records()
            .map_err(decode_error("rental candidates"))?;
        Ok(records.into_iter().map(candidate).collect())
    }
}

fn push_unique(
    selected: &mut Vec<ListingRecord>,
    seen: &mut HashSet<ListingKey>,
    records: Vec<ListingRecord>,
) {
    for record in records {
        if selected.len() >= FEATURED_LIMIT {
            break;
        }
        if seen.insert(record.key()) {
            selected.push(record);
        }
    }
}

fn decode_error(operation: &'static str) -> impl Fn(serde_json::Error) -> ServiceError {
    move |source| ServiceError::Decode { operation, source }
}

fn candidate(record: ListingRecord) -> RentalCandidate {
    let is_available = record.mls_status.as_deref().is_some_and(|status| {
        let status = status.trim();
        AVAILABLE_STATUSES
            .iter()
            .any(|available| available.eq_ignore_ascii_case(status))
    });
    RentalCandidate {
        listing_id: record.listing_id,
        unparsed_address: record.unparsed_address.unwrap_or_default(),
        mls_status: record.mls_status,
        is_available,
        list_price: record.list_price,
        bedrooms_total: record.bedrooms_total,
        bathrooms_full: record.bathrooms_full,
        city: record.city,
        state_or_province: record.state_or_province,
    }
}
