use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::de::DeserializeOwned;

use super::models::{PageWindow, ReviewFilter, SearchParameters};
use super::query::QueryService;
use crate::errors::ReviewError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub query: QueryService,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::InvalidArgument { .. } => ApiError::BadRequest(err.to_string()),
            other => {
                tracing::error!(error = %other, "query failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Extractors ────────────────────────────────────────────────────────

/// `Query` whose rejection is reported as a JSON `ApiError`.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
    }
}

/// `Path` whose rejection is reported as a JSON `ApiError`.
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/reviews", get(list_reviews))
        .route("/api/reviews/{id}", get(get_review))
        .route("/api/products/{product_id}/reviews", get(list_reviews_by_product))
        .route(
            "/api/products/{product_id}/average-rating",
            get(average_rating_by_product),
        )
        .route(
            "/api/products/{product_id}/total-reviews",
            get(total_reviews_by_product),
        )
        .route("/api/shoppers/{shopper_id}/reviews", get(list_reviews_by_shopper))
        .route(
            "/api/shoppers/{shopper_id}/products/{product_id}/reviewed",
            get(has_shopper_reviewed),
        )
        .route("/api/settings", get(app_settings))
        .route("/health", get(health_check))
}

// ── Helpers ───────────────────────────────────────────────────────────

/// Resolve the raw query string into engine types once, at the boundary.
fn parse_search(params: SearchParameters) -> Result<(ReviewFilter, PageWindow), ApiError> {
    params.into_filter().map_err(ApiError::from)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_review(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let review = state.query.review(id).await?;
    Ok(Json(review))
}

async fn list_reviews(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<SearchParameters>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, window) = parse_search(params)?;
    let response = state.query.reviews(&filter, &window).await?;
    Ok(Json(response))
}

async fn list_reviews_by_product(
    State(state): State<SharedState>,
    ApiPath(product_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<SearchParameters>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, window) = parse_search(params)?;
    let response = state
        .query
        .reviews_by_product_id(&product_id, &filter, &window)
        .await?;
    Ok(Json(response))
}

async fn list_reviews_by_shopper(
    State(state): State<SharedState>,
    ApiPath(shopper_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<SearchParameters>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, window) = parse_search(params)?;
    let response = state
        .query
        .reviews_by_shopper_id(&shopper_id, &filter, &window)
        .await?;
    Ok(Json(response))
}

async fn average_rating_by_product(
    State(state): State<SharedState>,
    ApiPath(product_id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let average = state.query.average_rating_by_product_id(&product_id).await?;
    Ok(Json(average))
}

async fn total_reviews_by_product(
    State(state): State<SharedState>,
    ApiPath(product_id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let total = state.query.total_reviews_by_product_id(&product_id).await?;
    Ok(Json(total))
}

async fn has_shopper_reviewed(
    State(state): State<SharedState>,
    ApiPath((shopper_id, product_id)): ApiPath<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let reviewed = state
        .query
        .has_shopper_reviewed(&shopper_id, &product_id)
        .await?;
    Ok(Json(reviewed))
}

async fn app_settings(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let settings = state.query.app_settings().await?;
    Ok(Json(settings))
}
