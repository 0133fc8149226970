//! Home page carousel: which listings to show and how each one is displayed.

use super::model::{FeaturedListing, ListingRecord, Media};
use super::query::{Query, SortDirection};

pub const FEATURED_LIMIT: usize = 6;
pub const FEATURED_OFFICE_MLS_ID: &str = "16619";
pub const FALLBACK_CITY: &str = "Anchorage";
pub const FEATURED_STATUSES: &[&str] =
    &["Active", "Coming Soon", "Pending", "Active Under Contract"];
pub const FEATURED_PROPERTY_TYPES: &[&str] = &["Residential"];

pub const FEATURED_FIELDS: &[&str] = &[
    "id",
    "listing_id",
    "street_number",
    "street_name",
    "street_suffix",
    "city",
    "state_or_province",
    "list_price",
    "bedrooms_total",
    "bathrooms_full",
    "living_area",
    "mls_status",
];
pub const FEATURED_PHOTO_FIELDS: &[&str] = &["media_key", "uri_640", "uri_800", "is_primary"];

const ADDRESS_UNAVAILABLE: &str = "Address not available";
const LOCATION_UNAVAILABLE: &str = "Location not available";
const PRICE_UNAVAILABLE: &str = "Price not available";

/// Statuses that get a badge on the card. Plain "Active" listings get none.
const BADGE_STATUSES: &[&str] = &["Pending", "Coming Soon", "Active Under Contract"];

fn featured_query(field: &str, value: &str, limit: u32) -> Query {
    Query::builder()
        .fields(FEATURED_FIELDS.iter().copied())
        .photos(FEATURED_PHOTO_FIELDS.iter().copied())
        .eq(field, value)
        .one_of("mls_status", FEATURED_STATUSES.iter().copied())
        .one_of("property_type", FEATURED_PROPERTY_TYPES.iter().copied())
        .order_by("list_price", SortDirection::Desc)
        .limit(limit)
        .build()
}

/// The brokerage's own listings, most expensive first.
pub fn office_query() -> Query {
    featured_query("list_office_mls_id", FEATURED_OFFICE_MLS_ID, FEATURED_LIMIT as u32)
}

/// Fallback geography used to fill the carousel. Asks for a full carousel so records
/// already picked from the office query cannot starve the remaining slots.
pub fn fallback_query() -> Query {
    featured_query("city", FALLBACK_CITY, FEATURED_LIMIT as u32)
}

pub fn project(record: &ListingRecord) -> FeaturedListing {
    FeaturedListing {
        listing_id: record.listing_id.clone(),
        address: address(record),
        location: location(record),
        price: record
            .list_price
            .map(format_price)
            .unwrap_or_else(|| PRICE_UNAVAILABLE.to_string()),
        image: image(&record.media).unwrap_or_default(),
        beds: record.bedrooms_total,
        baths: record.bathrooms_full,
        sqft: record.living_area,
        status: record.mls_status.as_deref().and_then(status_badge),
    }
}

fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, separator: &str) -> String {
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn address(record: &ListingRecord) -> String {
    let joined = join_present(
        [
            record.street_number.as_deref(),
            record.street_name.as_deref(),
            record.street_suffix.as_deref(),
        ],
        " ",
    );
    if joined.is_empty() {
        ADDRESS_UNAVAILABLE.to_string()
    } else {
        joined
    }
}

pub fn location(record: &ListingRecord) -> String {
    let joined = join_present(
        [
            record.city.as_deref(),
            record.state_or_province.as_deref(),
        ],
        ", ",
    );
    if joined.is_empty() {
        LOCATION_UNAVAILABLE.to_string()
    } else {
        joined
    }
}

/// `$` followed by the whole-dollar amount with thousands separators.
pub fn format_price(price: f64) -> String {
    let dollars = price.trunc() as i64;
    let digits = dollars.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if dollars < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn sized_uri(media: &Media) -> Option<&str> {
    media
        .uri_640
        .as_deref()
        .filter(|uri| !uri.is_empty())
        .or_else(|| media.uri_800.as_deref().filter(|uri| !uri.is_empty()))
}

/// Primary photo if one carries a usable size, otherwise whatever the first photo has.
pub fn image(media: &[Media]) -> Option<String> {
    media
        .iter()
        .filter(|photo| photo.is_primary)
        .find_map(sized_uri)
        .or_else(|| media.first().and_then(sized_uri))
        .map(str::to_string)
}

pub fn status_badge(status: &str) -> Option<String> {
    let normalized = status.trim();
    BADGE_STATUSES
        .iter()
        .find(|badge| badge.eq_ignore_ascii_case(normalized))
        .map(|badge| badge.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(key: &str, primary: bool, uri_640: Option<&str>, uri_800: Option<&str>) -> Media {
        Media {
            media_key: Some(key.to_string()),
            is_primary: primary,
            uri_640: uri_640.map(str::to_string),
            uri_800: uri_800.map(str::to_string),
            ..Media::default()
        }
    }

    #[test]
    fn prices_format_with_separators() {
        assert_eq!(format_price(1_234_567.0), "$1,234,567");
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(999.99), "$999");
        assert_eq!(format_price(1000.0), "$1,000");
        assert_eq!(format_price(100_000.0), "$100,000");
        assert_eq!(format_price(-2500.0), "-$2,500");

        let record = ListingRecord::default();
        assert_eq!(project(&record).price, "Price not available");
    }

    #[test]
    fn address_and_location_fall_back_to_placeholders() {
        let record = ListingRecord {
            street_number: Some("123".into()),
            street_name: Some("Main".into()),
            street_suffix: Some("St".into()),
            city: Some("Louisville".into()),
            state_or_province: Some("KY".into()),
            ..ListingRecord::default()
        };
        assert_eq!(address(&record), "123 Main St");
        assert_eq!(location(&record), "Louisville, KY");

        let partial = ListingRecord {
            street_name: Some("Main".into()),
            state_or_province: Some("KY".into()),
            ..ListingRecord::default()
        };
        assert_eq!(address(&partial), "Main");
        assert_eq!(location(&partial), "KY");

        let empty = ListingRecord::default();
        assert_eq!(address(&empty), "Address not available");
        assert_eq!(location(&empty), "Location not available");
    }

    #[test]
    fn image_prefers_primary_photo() {
        let media = vec![
            photo("a", false, Some("a-640"), None),
            photo("b", true, None, Some("b-800")),
            photo("c", true, Some("c-640"), None),
        ];
        assert_eq!(image(&media).as_deref(), Some("b-800"));
    }

    #[test]
    fn image_falls_back_to_first_photo_or_nothing() {
        let media = vec![
            photo("a", false, None, Some("a-800")),
            photo("b", true, None, None),
        ];
        assert_eq!(image(&media).as_deref(), Some("a-800"));
        assert_eq!(image(&[]), None);
        assert_eq!(image(&[photo("z", true, None, None)]), None);
    }

    #[test]
    fn only_badge_statuses_are_shown() {
        assert_eq!(status_badge(" pending "), Some("Pending".to_string()));
        assert_eq!(status_badge("COMING SOON"), Some("Coming Soon".to_string()));
        assert_eq!(
            status_badge("active under contract"),
            Some("Active Under Contract".to_string())
        );
        assert_eq!(status_badge("Active"), None);
        assert_eq!(status_badge("Closed"), None);
    }

    #[test]
    fn office_query_targets_the_brokerage() {
        let body = serde_json::to_value(office_query().wire()).expect("serializes");
        assert_eq!(body["filters"]["list_office_mls_id"]["eq"], "16619");
        assert_eq!(body["order_by"], "list_price DESC");
        assert_eq!(body["limit"], 6);
        assert_eq!(body["photo_fields"][2], "uri_800");

        let body = serde_json::to_value(fallback_query().wire()).expect("serializes");
        assert_eq!(body["filters"]["city"]["eq"], "Anchorage");
        assert_eq!(body["limit"], 6);
        assert!(body["filters"].get("list_office_mls_id").is_none());
    }
}
