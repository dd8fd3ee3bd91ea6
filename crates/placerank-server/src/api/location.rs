use axum::{body::Bytes, extract::State, Json};
use serde_json::json;

use placerank_core::{
    validate_coordinates, ApiEnvelope, CachedLocation, ErrorCode, LocationCacheError,
    LocationInput,
};

use super::{parse_body, ApiError, AppState};

pub(super) async fn get_cached_location(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<CachedLocation>>, ApiError> {
    state
        .location_cache
        .load()
        .map(|cached| Json(ApiEnvelope::success(cached)))
        .ok_or_else(|| ApiError::new(ErrorCode::LocationNotFound, "No cached location found"))
}

pub(super) async fn save_location(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiEnvelope<serde_json::Value>>, ApiError> {
    let input: LocationInput = parse_body(&body, "Location data")?;

    let cached = CachedLocation::from_input(&input).ok_or_else(|| {
        ApiError::new(
            ErrorCode::MissingCoordinates,
            "Latitude and longitude are required",
        )
    })?;
    if !validate_coordinates(cached.latitude, cached.longitude) {
        return Err(ApiError::new(
            ErrorCode::InvalidCoordinates,
            "Invalid coordinates provided",
        ));
    }

    state.location_cache.save(&cached).map_err(|e| match e {
        LocationCacheError::InvalidCoordinates { .. } => {
            ApiError::new(ErrorCode::InvalidCoordinates, "Invalid coordinates provided")
        }
        other => {
            tracing::error!(error = %other, "failed to save location");
            ApiError::new(ErrorCode::SaveFailed, "Failed to save location")
        }
    })?;

    Ok(Json(ApiEnvelope::success_with_message(
        json!({}),
        "Location saved successfully",
    )))
}
