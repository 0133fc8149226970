use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media fields requested when a single listing is opened on its detail page.
pub const DETAIL_PHOTO_FIELDS: &[&str] = &[
    "id",
    "listing_id",
    "media_key",
    "media_category",
    "name",
    "is_primary",
    "media_order",
    "uri_thumb",
    "uri_300",
    "uri_640",
    "uri_800",
    "uri_1024",
    "uri_1280",
    "uri_1600",
    "uri_2048",
    "uri_large",
];

/// One filter predicate in the provider's dialect, serialized as `{"<operator>": operand}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    Eq(Value),
    In(Vec<Value>),
    Like(String),
}

impl Predicate {
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Eq(value.into())
    }

    pub fn any_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In(values.into_iter().map(Into::into).collect())
    }

    /// Substring match; `%` in `text` is escaped so it matches a literal percent sign.
    pub fn contains(text: &str) -> Self {
        Self::Like(format!("%{}%", escape_like(text)))
    }
}

/// Escape the provider's wildcard character. No other character is touched.
pub fn escape_like(text: &str) -> String {
    text.replace('%', "\\%")
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// Immutable description of the listings subset a caller wants.
///
/// `fields == None` asks the provider for its full natural schema; responses to such
/// queries are decoded generically so unknown provider fields survive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Query {
    #[serde(default)]
    fields: Option<Vec<String>>,
    #[serde(default)]
    include_photos: bool,
    #[serde(default)]
    photo_fields: Vec<String>,
    #[serde(default)]
    filters: BTreeMap<String, Predicate>,
    #[serde(default)]
    bounds: Option<Bounds>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    offset: Option<u32>,
    #[serde(default)]
    order_by: Option<String>,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Single listing lookup by MLS listing id, returning every provider field.
    pub fn by_listing_id(listing_id: &str, include_photos: bool) -> Self {
        let builder = Self::builder().all_fields().eq("listing_id", listing_id);
        if include_photos {
            builder.photos(DETAIL_PHOTO_FIELDS.iter().copied()).build()
        } else {
            builder.build()
        }
    }

    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    /// Whether the response must be decoded generically.
    pub fn wants_all_fields(&self) -> bool {
        self.fields.is_none()
    }

    pub fn include_photos(&self) -> bool {
        self.include_photos
    }

    pub fn photo_fields(&self) -> &[String] {
        &self.photo_fields
    }

    pub fn filters(&self) -> &BTreeMap<String, Predicate> {
        &self.filters
    }

    pub fn filter(&self, field: &str) -> Option<&Predicate> {
        self.filters.get(field)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    /// Borrowed view in the provider's request body format.
    pub fn wire(&self) -> WireQuery<'_> {
        WireQuery {
            fields: self.fields.as_deref(),
            include_photos: self.include_photos,
            photo_fields: if self.include_photos {
                self.photo_fields.as_slice()
            } else {
                &[]
            },
            filters: &self.filters,
            bounds: self.bounds.as_ref(),
            limit: self.limit.filter(|limit| *limit > 0),
            offset: self.offset.filter(|offset| *offset > 0),
            order_by: self.order_by.as_deref().filter(|order| !order.is_empty()),
        }
    }
}

/// Request body sent to `POST /api/v1/properties`.
#[derive(Debug, Serialize)]
pub struct WireQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [String]>,
    #[serde(skip_serializing_if = "is_false")]
    include_photos: bool,
    #[serde(skip_serializing_if = "is_empty_slice")]
    photo_fields: &'a [String],
    #[serde(skip_serializing_if = "is_empty_map")]
    filters: &'a BTreeMap<String, Predicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<&'a Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<&'a str>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_empty_slice(value: &&[String]) -> bool {
    value.is_empty()
}

fn is_empty_map(value: &&BTreeMap<String, Predicate>) -> bool {
    value.is_empty()
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn all_fields(mut self) -> Self {
        self.query.fields = None;
        self
    }

    /// Embed media records, restricted to `fields`.
    pub fn photos<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.include_photos = true;
        self.query.photo_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.query.filters.insert(field.into(), predicate);
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Predicate::equals(value))
    }

    pub fn one_of<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter(field, Predicate::any_of(values))
    }

    pub fn contains(self, field: impl Into<String>, text: &str) -> Self {
        self.filter(field, Predicate::contains(text))
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.query.bounds = Some(bounds);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.query.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.query.order_by = Some(format!("{field} {direction}"));
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn like_escape_only_touches_percent_signs() {
        for input in ["", "100%", "%", "50% off %20", "12 Main St #4", "a\\b%c_d"] {
            let Predicate::Like(operand) = Predicate::contains(input) else {
                panic!("contains builds a like predicate");
            };
            let inner = &operand[1..operand.len() - 1];
            assert_eq!(inner, input.replace('%', "\\%"));
            assert_eq!(inner.replace("\\%", "%"), input);
            assert!(operand.starts_with('%') && operand.ends_with('%'));
        }
    }

    #[test]
    fn wire_form_omits_empty_parts() {
        let query = Query::builder()
            .fields(["id", "list_price"])
            .eq("city", "Anchorage")
            .one_of("mls_status", ["Active", "Pending"])
            .limit(6)
            .order_by("list_price", SortDirection::Desc)
            .build();

        let body = serde_json::to_value(query.wire()).expect("serializes");
        assert_eq!(
            body,
            json!({
                "fields": ["id", "list_price"],
                "filters": {
                    "city": {"eq": "Anchorage"},
                    "mls_status": {"in": ["Active", "Pending"]}
                },
                "limit": 6,
                "order_by": "list_price DESC"
            })
        );
    }

    #[test]
    fn photo_fields_stay_off_the_wire_without_photos() {
        let query: Query = serde_json::from_value(json!({
            "photo_fields": ["uri_640"],
            "limit": 0
        }))
        .expect("decodes");
        let body = serde_json::to_value(query.wire()).expect("serializes");
        assert_eq!(body, json!({}));
        assert!(query.wants_all_fields());
    }

    #[test]
    fn listing_lookup_requests_all_fields_and_detail_media() {
        let query = Query::by_listing_id("25001234", true);
        assert!(query.wants_all_fields());
        assert!(query.include_photos());
        assert_eq!(query.photo_fields().len(), DETAIL_PHOTO_FIELDS.len());
        assert_eq!(query.filter("listing_id"), Some(&Predicate::equals("25001234")));

        let plain = Query::by_listing_id("25001234", false);
        assert!(!plain.include_photos());
        assert!(plain.photo_fields().is_empty());
    }

    #[test]
    fn caller_body_round_trips_through_the_wire_form() {
        let body = json!({
            "fields": ["listing_id"],
            "include_photos": true,
            "photo_fields": ["uri_thumb"],
            "filters": {"unparsed_address": {"like": "%Bardstown%"}},
            "bounds": {"north": 38.3, "south": 38.1, "east": -85.5, "west": -85.8},
            "offset": 20
        });
        let query: Query = serde_json::from_value(body.clone()).expect("decodes");
        assert_eq!(serde_json::to_value(query.wire()).expect("serializes"), body);
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let result = serde_json::from_value::<Query>(json!({
            "filters": {"list_price": {"gte": 100000}}
        }));
        assert!(result.is_err());
    }
}
