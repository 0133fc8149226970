//! HTTP client for the listings provider.

use std::fmt;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::ACCEPT_ENCODING;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::model::{ListingData, ListingRecord, ListingsPage, RawListing};
use super::query::Query;
use crate::config::ProviderConfig;

pub const PROPERTIES_PATH: &str = "/api/v1/properties";
pub const INITIAL_PROPERTIES_PATH: &str = "/api/v1/properties/initial";
pub const RENTAL_SEARCH_PATH: &str = "/api/v1/properties/rentals/search";

#[derive(Debug, thiserror::Error)]
pub enum ListingsError {
    #[error("failed to build listings HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{operation}: request to {url} failed: {source}")]
    Transport {
        operation: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation}: provider returned status {status} from {url}: {body}")]
    Provider {
        operation: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("{operation}: unable to decode response from {url}: {source}")]
    Decode {
        operation: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bulk listings relay interrupted: {0}")]
    Stream(#[source] reqwest::Error),
}

/// Batch request resolving free-text addresses to the latest matching listing each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSearch {
    pub addresses: Vec<String>,
    pub fields: Option<Vec<String>>,
    pub include_photos: bool,
    pub photo_fields: Vec<String>,
}

impl AddressSearch {
    fn wire(&self) -> AddressSearchBody<'_> {
        AddressSearchBody {
            addresses: &self.addresses,
            fields: self.fields.as_deref(),
            include_photos: self.include_photos.then_some(true),
            photo_fields: if self.include_photos && !self.photo_fields.is_empty() {
                Some(self.photo_fields.as_slice())
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct AddressSearchBody<'a> {
    addresses: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_photos: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_fields: Option<&'a [String]>,
}

pub type ByteStream = BoxStream<'static, Result<Bytes, ListingsError>>;

/// Upstream response for the bulk snapshot, body left compressed and unread.
pub struct BulkStream {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl fmt::Debug for BulkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkStream")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Operations the rest of the crate needs from the listings provider.
#[async_trait]
pub trait ListingsProvider: Send + Sync {
    async fn query(&self, query: &Query) -> Result<ListingsPage, ListingsError>;
    async fn stream_bulk(&self) -> Result<BulkStream, ListingsError>;
    async fn search_by_addresses(
        &self,
        search: &AddressSearch,
    ) -> Result<ListingsPage, ListingsError>;
}

#[derive(Debug, Clone)]
pub struct HttpListingsClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpListingsClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ListingsError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("listings-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ListingsError::Client)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(
        &self,
        operation: &'static str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Bytes, ListingsError> {
        let response = request
            .send()
            .await
            .map_err(|source| transport(operation, url, source))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| transport(operation, url, source))?;

        trace!(%status, bytes = body.len(), "listings provider response");
        if status != StatusCode::OK {
            return Err(ListingsError::Provider {
                operation,
                url: url.to_string(),
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl ListingsProvider for HttpListingsClient {
    #[instrument(skip_all, fields(base_url = %self.config.base_url))]
    async fn query(&self, query: &Query) -> Result<ListingsPage, ListingsError> {
        const OPERATION: &str = "query properties";
        let url = self.url(PROPERTIES_PATH);
        let body = query.wire();
        debug!(%url, all_fields = query.wants_all_fields(), "listings provider request");
        trace!(?body, "request body");

        let request = self
            .client
            .post(&url)
            .timeout(self.config.lookup_timeout)
            .json(&body);
        let bytes = self.send(OPERATION, &url, request).await?;
        decode_page(OPERATION, &url, &bytes, query.wants_all_fields())
    }

    #[instrument(skip_all, fields(base_url = %self.config.base_url))]
    async fn stream_bulk(&self) -> Result<BulkStream, ListingsError> {
        const OPERATION: &str = "stream initial properties";
        let url = self.url(INITIAL_PROPERTIES_PATH);
        debug!(%url, "listings provider bulk request");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT_ENCODING, "gzip")
            .timeout(self.config.bulk_timeout)
            .send()
            .await
            .map_err(|source| transport(OPERATION, &url, source))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => format!("<unreadable body: {err}>"),
            };
            return Err(ListingsError::Provider {
                operation: OPERATION,
                url,
                status,
                body,
            });
        }

        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map_err(ListingsError::Stream)
            .boxed();
        Ok(BulkStream {
            status,
            headers,
            body,
        })
    }

    #[instrument(skip_all, fields(base_url = %self.config.base_url, addresses = search.addresses.len()))]
    async fn search_by_addresses(
        &self,
        search: &AddressSearch,
    ) -> Result<ListingsPage, ListingsError> {
        const OPERATION: &str = "search rentals by address";
        let url = self.url(RENTAL_SEARCH_PATH);
        let body = search.wire();
        debug!(%url, "listings provider rental search");
        trace!(?body, "request body");

        let request = self
            .client
            .post(&url)
            .timeout(self.config.lookup_timeout)
            .json(&body);
        let bytes = self.send(OPERATION, &url, request).await?;
        decode_page(OPERATION, &url, &bytes, search.fields.is_none())
    }
}

fn transport(operation: &'static str, url: &str, source: reqwest::Error) -> ListingsError {
    ListingsError::Transport {
        operation,
        url: url.to_string(),
        source,
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: Option<Vec<T>>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    offset: Option<u64>,
    #[serde(default)]
    total_count: Option<u64>,
}

impl<T> Envelope<T> {
    fn into_page(self, wrap: impl FnOnce(Vec<T>) -> ListingData) -> ListingsPage {
        ListingsPage {
            data: wrap(self.data.unwrap_or_default()),
            count: self.count.unwrap_or_default(),
            limit: self.limit,
            offset: self.offset.filter(|offset| *offset > 0),
            total_count: self.total_count.unwrap_or_default(),
        }
    }
}

/// Decode a provider envelope: generic rows when every field was requested, otherwise the
/// fixed record schema. One response never mixes the two.
pub(crate) fn decode_page(
    operation: &'static str,
    url: &str,
    bytes: &[u8],
    all_fields: bool,
) -> Result<ListingsPage, ListingsError> {
    let decode_error = |source| ListingsError::Decode {
        operation,
        url: url.to_string(),
        source,
    };

    if all_fields {
        let envelope: Envelope<RawListing> =
            serde_json::from_slice(bytes).map_err(decode_error)?;
        Ok(envelope.into_page(ListingData::Raw))
    } else {
        let envelope: Envelope<ListingRecord> =
            serde_json::from_slice(bytes).map_err(decode_error)?;
        Ok(envelope.into_page(ListingData::Records))
    }
}
