//! Integration layer between the brokerage site and the external listings provider.
//!
//! The [`listings`] module owns the provider boundary: query construction, tolerant
//! decoding of provider records, featured selection, rental reconciliation, and the
//! HTTP routes that expose them. [`config`], [`error`], and [`telemetry`] carry the
//! runtime plumbing shared with the service binary.

pub mod config;
pub mod error;
pub mod listings;
pub mod telemetry;
