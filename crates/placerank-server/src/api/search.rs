use axum::{body::Bytes, extract::State, Extension, Json};
use serde::Serialize;
use serde_json::json;

use placerank_core::{
    ApiEnvelope, CachedLocation, LocationCache, LocationInput, RankingResponse, SearchEnvelope,
};
use placerank_pipeline::{validate_request, SearchRequest};

use crate::middleware::RequestId;

use super::{parse_body, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub query: String,
    pub location: LocationInput,
    pub search_results: SearchEnvelope,
    pub ranked_results: RankingResponse,
}

/// Full search: both providers, then ranking.
pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiEnvelope<SearchResponse>>, ApiError> {
    let request: SearchRequest = parse_body(&body, "Request data")?;
    let valid = validate_request(&request)?;
    tracing::info!(request_id = %req_id.0, query = %valid.query, "search request");

    remember_location(&state.location_cache, &valid.location);

    let search_results = state.pipeline.search_validated(&valid).await?;
    let ranking = state.pipeline.rank(&search_results).await?;

    let meta = json!({
        "foursquare_count": search_results.foursquare.count,
        "google_count": search_results.google.count,
        "total_ranked": ranking.response.ranked_places.len(),
    });
    let data = SearchResponse {
        query: valid.query,
        location: valid.location,
        search_results,
        ranked_results: ranking.response,
    };
    Ok(Json(ApiEnvelope::success(data).with_meta(meta)))
}

/// Search only; the merged results are returned unranked.
pub(super) async fn search_simple(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiEnvelope<SearchEnvelope>>, ApiError> {
    let request: SearchRequest = parse_body(&body, "Request data")?;
    tracing::info!(request_id = %req_id.0, "simple search request");
    let results = state.pipeline.search(&request).await?;
    Ok(Json(ApiEnvelope::success(results)))
}

/// Ranks a search envelope supplied by the caller.
pub(super) async fn rank(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiEnvelope<RankingResponse>>, ApiError> {
    let envelope: SearchEnvelope = parse_body(&body, "Search results data")?;
    tracing::info!(request_id = %req_id.0, query = %envelope.query, "rank request");
    let ranking = state.pipeline.rank(&envelope).await?;
    Ok(Json(ApiEnvelope::success_with_message(
        ranking.response,
        "Ranking completed successfully",
    )))
}

/// Caches the request location. Failure never fails the search.
fn remember_location(cache: &LocationCache, location: &LocationInput) {
    let Some(cached) = CachedLocation::from_input(location) else {
        return;
    };
    if let Err(e) = cache.save(&cached) {
        tracing::warn!(error = %e, "could not cache request location");
    }
}
