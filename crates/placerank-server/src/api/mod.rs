mod location;
mod search;

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use placerank_core::{ApiEnvelope, ErrorCode, LocationCache};
use placerank_pipeline::{LivePlaceSearch, PipelineError, ValidationError};

use crate::middleware::{request_id, REQUEST_ID_HEADER};

pub const AVAILABLE_ENDPOINTS: [&str; 6] = [
    "/api/health",
    "/api/location/cache",
    "/api/location/save",
    "/api/search",
    "/api/search/simple",
    "/api/rank",
];

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<LivePlaceSearch>,
    pub location_cache: LocationCache,
}

/// An error envelope plus the HTTP status it is sent with.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    envelope: ApiEnvelope<()>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: status_for(code),
            envelope: ApiEnvelope::error(code, message),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.envelope = self.envelope.with_details(details);
        self
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound | ErrorCode::LocationNotFound => StatusCode::NOT_FOUND,
        c if c.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(err.error_code(), err.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let code = err.error_code();
        let message = err.to_string();
        match err {
            PipelineError::Validation(e) => e.into(),
            PipelineError::Search(e) => {
                tracing::error!(error = %e, "place search failed");
                Self::new(code, message).with_details(json!({ "stage": "search" }))
            }
            PipelineError::Ranking { source, summary } => {
                tracing::error!(error = %source, "ranking failed");
                Self::new(code, message).with_details(json!({
                    "stage": "ranking",
                    "search_summary": summary,
                    "raw_response": source.raw_response(),
                }))
            }
        }
    }
}

/// Decodes a JSON request body, reporting an absent or unreadable body as
/// `MISSING_DATA` with `what` in the message.
pub(super) fn parse_body<T: DeserializeOwned>(body: &Bytes, what: &str) -> Result<T, ApiError> {
    let missing = || ApiError::new(ErrorCode::MissingData, format!("{what} required"));
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(missing());
    }
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        ApiError::new(ErrorCode::MissingData, format!("{what} is not valid JSON: {e}"))
    })?;
    if value.is_null() || value.as_object().is_some_and(serde_json::Map::is_empty) {
        return Err(missing());
    }
    serde_json::from_value(value)
        .map_err(|e| ApiError::new(ErrorCode::MissingData, format!("{what} is malformed: {e}")))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/location/cache", get(location::get_cached_location))
        .route("/api/location/save", post(location::save_location))
        .route("/api/search", post(search::search))
        .route("/api/search/simple", post(search::search_simple))
        .route("/api/rank", post(search::rank))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    version: &'static str,
    timestamp: DateTime<Utc>,
}

async fn health() -> Json<ApiEnvelope<HealthData>> {
    Json(ApiEnvelope::success_with_message(
        HealthData {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        },
        "Places API server is running",
    ))
}

/// Turns a handler panic into the standard `SERVER_ERROR` envelope.
#[allow(clippy::needless_pass_by_value)]
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::new(ErrorCode::ServerError, "Internal server error").into_response()
}

async fn not_found() -> ApiError {
    ApiError::new(ErrorCode::NotFound, "Endpoint not found")
        .with_details(json!({ "available_endpoints": AVAILABLE_ENDPOINTS }))
}
