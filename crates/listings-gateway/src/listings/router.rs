use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Query as QueryParams, State},
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::client::{BulkStream, ListingsProvider};
use super::query::Query;
use super::rentals::RentalStore;
use super::service::{ListingsService, ServiceError};

/// Headers that describe the upstream connection rather than the payload.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "transfer-encoding"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "upgrade"
    )
}

/// Router exposing the public listing endpoints and the operator-facing query routes.
pub fn listings_router<P, R>(service: Arc<ListingsService<P, R>>) -> Router
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    Router::new()
        .route("/api/featured-properties", get(featured_handler::<P, R>))
        .route(
            "/api/v1/properties",
            get(lookup_handler::<P, R>).post(query_handler::<P, R>),
        )
        .route("/api/v1/properties/initial", get(bulk_handler::<P, R>))
        .route(
            "/api/neighborhoods/:neighborhood",
            get(neighborhood_handler::<P, R>),
        )
        .route(
            "/api/rentals/public/with-properties",
            get(rentals_handler::<P, R>),
        )
        .route("/api/rentals/search", get(candidate_search_handler::<P, R>))
        .with_state(service)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, Json(payload)).into_response()
}

/// Map a failure on a public route. Provider detail stays in the logs.
fn public_failure(error: ServiceError, message: &'static str) -> Response {
    match error {
        ServiceError::NotFound(what) => {
            error_response(StatusCode::NOT_FOUND, format!("{what} not found"))
        }
        ServiceError::InvalidQuery(reason) => error_response(StatusCode::BAD_REQUEST, reason),
        ServiceError::RentalStore(source) => {
            error!(error = %source, "rental store failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        other => {
            error!(error = %other, "listings provider failed");
            error_response(StatusCode::BAD_GATEWAY, message)
        }
    }
}

/// Map a failure on an operator route, forwarding the error text.
fn operator_failure(error: ServiceError) -> Response {
    match error {
        ServiceError::NotFound(what) => {
            error_response(StatusCode::NOT_FOUND, format!("{what} not found"))
        }
        ServiceError::InvalidQuery(reason) => error_response(StatusCode::BAD_REQUEST, reason),
        other => {
            error!(error = %other, "listings provider failed");
            error_response(StatusCode::BAD_GATEWAY, other.to_string())
        }
    }
}

pub(crate) async fn featured_handler<P, R>(
    State(service): State<Arc<ListingsService<P, R>>>,
) -> Response
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    match service.featured_listings().await {
        Ok(listings) => (StatusCode::OK, Json(json!({ "data": listings }))).into_response(),
        Err(error) => public_failure(error, "Failed to fetch featured properties"),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupParams {
    listing_id: Option<String>,
    #[serde(default)]
    include_photos: bool,
}

pub(crate) async fn lookup_handler<P, R>(
    State(service): State<Arc<ListingsService<P, R>>>,
    QueryParams(params): QueryParams<LookupParams>,
) -> Response
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    let listing_id = params.listing_id.unwrap_or_default();
    match service
        .lookup_listing(&listing_id, params.include_photos)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => public_failure(error, "Failed to fetch property"),
    }
}

pub(crate) async fn query_handler<P, R>(
    State(service): State<Arc<ListingsService<P, R>>>,
    body: Result<Json<Query>, JsonRejection>,
) -> Response
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    let Json(query) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match service.query(&query).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => operator_failure(error),
    }
}

pub(crate) async fn bulk_handler<P, R>(
    State(service): State<Arc<ListingsService<P, R>>>,
) -> Response
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    match service.stream_bulk().await {
        Ok(bulk) => relay(bulk),
        Err(error) => public_failure(error, "Failed to fetch properties"),
    }
}

/// Pass the upstream response through untouched: status, payload headers, and the
/// still-compressed body.
fn relay(bulk: BulkStream) -> Response {
    let body = bulk.body.inspect_err(|error| {
        warn!(%error, "bulk relay aborted after headers were sent");
    });

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = bulk.status;
    let headers = response.headers_mut();
    for (name, value) in &bulk.headers {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    response
}

pub(crate) async fn neighborhood_handler<P, R>(
    State(service): State<Arc<ListingsService<P, R>>>,
    Path(slug): Path<String>,
) -> Response
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    match service.neighborhood(&slug).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => public_failure(error, "Failed to fetch neighborhood properties"),
    }
}

pub(crate) async fn rentals_handler<P, R>(
    State(service): State<Arc<ListingsService<P, R>>>,
) -> Response
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    match service.rentals_with_listings().await {
        Ok(rentals) => (StatusCode::OK, Json(rentals)).into_response(),
        Err(error) => public_failure(error, "Failed to fetch rental properties"),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    q: String,
}

pub(crate) async fn candidate_search_handler<P, R>(
    State(service): State<Arc<ListingsService<P, R>>>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Response
where
    P: ListingsProvider + 'static,
    R: RentalStore + 'static,
{
    match service.search_rental_candidates(&params.q).await {
        Ok(results) => {
            let payload = json!({
                "count": results.len(),
                "results": results,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => operator_failure(error),
    }
}
