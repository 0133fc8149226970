use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally curated rental entry. The site owns the display order; the provider owns
/// everything else about the property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub id: i64,
    pub order: i32,
    pub unparsed_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read-only view of the rental list so reconciliation can run without a database.
pub trait RentalStore: Send + Sync {
    /// Every rental, sorted by `order` ascending.
    fn ordered(&self) -> Result<Vec<RentalRecord>, RentalStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RentalStoreError {
    #[error("rental store unavailable: {0}")]
    Unavailable(String),
    #[error("rental data is malformed: {0}")]
    Malformed(String),
}

/// Fixed list, sorted on construction.
#[derive(Debug, Clone, Default)]
pub struct StaticRentalStore {
    rentals: Vec<RentalRecord>,
}

impl StaticRentalStore {
    pub fn new(mut rentals: Vec<RentalRecord>) -> Self {
        rentals.sort_by_key(|rental| rental.order);
        Self { rentals }
    }
}

impl RentalStore for StaticRentalStore {
    fn ordered(&self) -> Result<Vec<RentalRecord>, RentalStoreError> {
        Ok(self.rentals.clone())
    }
}
