use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::scalar;

/// Provider record decoded generically, with the provider's field order preserved.
pub type RawListing = Map<String, Value>;

/// Stable subset of a provider listing. Fields the provider adds beyond this set are kept
/// in `extra` rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(
        default,
        deserialize_with = "scalar::optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    #[serde(default)]
    pub listing_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_or_province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unparsed_address: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar::optional_float",
        skip_serializing_if = "Option::is_none"
    )]
    pub list_price: Option<f64>,
    #[serde(
        default,
        deserialize_with = "scalar::optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub bedrooms_total: Option<i64>,
    #[serde(
        default,
        deserialize_with = "scalar::optional_float",
        skip_serializing_if = "Option::is_none"
    )]
    pub bathrooms_full: Option<f64>,
    #[serde(
        default,
        deserialize_with = "scalar::optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub living_area: Option<i64>,
    #[serde(
        default,
        deserialize_with = "scalar::optional_float",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<f64>,
    #[serde(
        default,
        deserialize_with = "scalar::optional_float",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mls_status: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub media: Vec<Media>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity used to keep a listing from being selected twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    Id(i64),
    ListingId(String),
}

impl ListingRecord {
    pub fn key(&self) -> ListingKey {
        match self.id {
            Some(id) => ListingKey::Id(id),
            None => ListingKey::ListingId(self.listing_id.clone()),
        }
    }
}

/// One photo attached to a listing. The provider gives no ordering guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, alias = "photo_id", skip_serializing_if = "Option::is_none")]
    pub media_key: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_300: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_640: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_800: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_1024: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_1280: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_1600: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_2048: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_large: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Media>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Media>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Records from a single provider response: all fixed-schema or all generic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListingData {
    Records(Vec<ListingRecord>),
    Raw(Vec<RawListing>),
}

impl ListingData {
    pub fn len(&self) -> usize {
        match self {
            ListingData::Records(records) => records.len(),
            ListingData::Raw(raw) => raw.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed-schema records, decoding generic rows when necessary.
    pub fn into_records(self) -> Result<Vec<ListingRecord>, serde_json::Error> {
        match self {
            ListingData::Records(records) => Ok(records),
            ListingData::Raw(raw) => raw
                .into_iter()
                .map(|row| serde_json::from_value(Value::Object(row)))
                .collect(),
        }
    }
}

impl Default for ListingData {
    fn default() -> Self {
        ListingData::Records(Vec::new())
    }
}

/// Provider response envelope, passed through to callers as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingsPage {
    pub data: ListingData,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub total_count: u64,
}

/// Display projection for the home page carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedListing {
    pub listing_id: String,
    pub address: String,
    pub location: String,
    pub price: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baths: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqft: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Listing summary shown when an operator picks a property for the rentals page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalCandidate {
    pub listing_id: String,
    pub unparsed_address: String,
    pub mls_status: Option<String>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms_full: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_or_province: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_decodes_mixed_numeric_representations() {
        let record: ListingRecord = serde_json::from_value(json!({
            "id": 81,
            "listing_id": "1690001",
            "list_price": "489000",
            "bedrooms_total": "4.00",
            "bathrooms_full": 2,
            "living_area": "",
            "latitude": null,
            "longitude": -85.71,
            "mls_status": "Active"
        }))
        .expect("decodes");

        assert_eq!(record.id, Some(81));
        assert_eq!(record.list_price, Some(489000.0));
        assert_eq!(record.bedrooms_total, Some(4));
        assert_eq!(record.bathrooms_full, Some(2.0));
        assert_eq!(record.living_area, None);
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, Some(-85.71));
        assert!(record.extra.is_empty());
    }

    #[test]
    fn numeric_fields_decode_identically_across_representations() {
        let fields = [
            "list_price",
            "bedrooms_total",
            "bathrooms_full",
            "living_area",
            "latitude",
            "longitude",
        ];
        for field in fields {
            let native: ListingRecord =
                serde_json::from_value(json!({ field: 3 })).expect("number decodes");
            let string: ListingRecord =
                serde_json::from_value(json!({ field: "3" })).expect("string decodes");
            let empty: ListingRecord =
                serde_json::from_value(json!({ field: "" })).expect("empty decodes");
            let null: ListingRecord =
                serde_json::from_value(json!({ field: null })).expect("null decodes");
            assert_eq!(native, string, "{field}");
            assert_eq!(empty, ListingRecord::default(), "{field}");
            assert_eq!(null, ListingRecord::default(), "{field}");
        }
    }

    #[test]
    fn unknown_provider_fields_land_in_extra() {
        let record: ListingRecord = serde_json::from_value(json!({
            "listing_id": "1690002",
            "modification_timestamp": "2025-10-01T12:00:00Z",
            "bathrooms_total_decimal": 2.5
        }))
        .expect("decodes");

        assert_eq!(
            record.extra.get("bathrooms_total_decimal"),
            Some(&json!(2.5))
        );
        let round_trip = serde_json::to_value(&record).expect("serializes");
        assert_eq!(round_trip["modification_timestamp"], "2025-10-01T12:00:00Z");
    }

    #[test]
    fn media_accepts_legacy_photo_id_and_null_lists() {
        let record: ListingRecord = serde_json::from_value(json!({
            "listing_id": "1",
            "media": [{"photo_id": "p-1", "uri_640": "https://cdn/p-1-640.jpg"}]
        }))
        .expect("decodes");
        assert_eq!(record.media[0].media_key.as_deref(), Some("p-1"));
        assert!(!record.media[0].is_primary);

        let record: ListingRecord =
            serde_json::from_value(json!({"listing_id": "2", "media": null})).expect("decodes");
        assert!(record.media.is_empty());
    }

    #[test]
    fn media_entries_serialize_as_received() {
        let entry = json!({"uri_thumb": "t", "uri_800": "e", "is_primary": true, "media_order": 1});
        let media: Media = serde_json::from_value(entry.clone()).expect("decodes");
        assert_eq!(media.media_key, None);
        assert_eq!(media.extra.get("media_order"), Some(&json!(1)));
        assert_eq!(serde_json::to_value(&media).expect("serializes"), entry);
    }

    #[test]
    fn raw_rows_convert_to_records() {
        let data = ListingData::Raw(vec![json!({"listing_id": "9", "list_price": "100"})
            .as_object()
            .cloned()
            .expect("object")]);
        let records = data.into_records().expect("converts");
        assert_eq!(records[0].list_price, Some(100.0));
    }

    #[test]
    fn records_without_id_are_keyed_by_listing_id() {
        let record = ListingRecord {
            listing_id: "1690003".to_string(),
            ..ListingRecord::default()
        };
        assert_eq!(record.key(), ListingKey::ListingId("1690003".to_string()));
    }
}
