//! Merge provider records back into the locally curated rental order.

use std::collections::HashMap;

use serde_json::Value;

use super::model::{ListingData, ListingRecord, RawListing};
use super::rentals::RentalRecord;

/// Anything that can be matched to a rental by its street address.
pub trait AddressKeyed {
    fn address_key(&self) -> Option<&str>;
}

impl AddressKeyed for ListingRecord {
    fn address_key(&self) -> Option<&str> {
        self.unparsed_address.as_deref()
    }
}

impl AddressKeyed for RawListing {
    fn address_key(&self) -> Option<&str> {
        self.get("unparsed_address").and_then(Value::as_str)
    }
}

/// Re-emit `listings` in the order of `rentals`.
///
/// Addresses are compared as exact strings. When the provider returns two records for
/// one address the later one wins; rentals with no matching record are dropped.
pub fn reconcile<T>(rentals: &[RentalRecord], listings: Vec<T>) -> Vec<T>
where
    T: AddressKeyed + Clone,
{
    let mut by_address: HashMap<String, T> = HashMap::with_capacity(listings.len());
    for listing in listings {
        if let Some(address) = listing.address_key() {
            by_address.insert(address.to_string(), listing);
        }
    }

    rentals
        .iter()
        .filter_map(|rental| by_address.get(&rental.unparsed_address).cloned())
        .collect()
}

/// `reconcile` applied to whichever variant the provider returned.
pub fn reconcile_data(rentals: &[RentalRecord], data: ListingData) -> ListingData {
    match data {
        ListingData::Records(records) => ListingData::Records(reconcile(rentals, records)),
        ListingData::Raw(rows) => ListingData::Raw(reconcile(rentals, rows)),
    }
}
