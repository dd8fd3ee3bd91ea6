use serde::{Deserialize, Serialize};

use placerank_core::{validate_coordinates, Coordinates, LocationInput};

use crate::error::ValidationError;

/// A search request as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub location: Option<LocationInput>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, location: LocationInput) -> Self {
        Self {
            query: Some(query.into()),
            location: Some(location),
        }
    }
}

/// A request that passed validation: trimmed query, in-range coordinates.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub query: String,
    pub location: LocationInput,
    pub coordinates: Coordinates,
}

/// Checks, in order: a non-blank query, a location, then both coordinates
/// present and in range.
///
/// # Errors
///
/// The first [`ValidationError`] found.
pub fn validate_request(request: &SearchRequest) -> Result<ValidatedRequest, ValidationError> {
    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ValidationError::MissingQuery)?;

    let location = request
        .location
        .as_ref()
        .ok_or(ValidationError::MissingLocation)?;

    let coordinates = location
        .coordinates()
        .filter(|c| validate_coordinates(c.latitude, c.longitude))
        .ok_or(ValidationError::InvalidCoordinates {
            latitude: location.latitude,
            longitude: location.longitude,
        })?;

    Ok(ValidatedRequest {
        query: query.to_string(),
        location: location.clone(),
        coordinates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(latitude: Option<f64>, longitude: Option<f64>) -> LocationInput {
        LocationInput {
            latitude,
            longitude,
            ..LocationInput::default()
        }
    }

    #[test]
    fn valid_request_is_trimmed() {
        let request = SearchRequest::new("  coffee shops ", at(Some(28.6), Some(77.2)));
        let valid = validate_request(&request).expect("valid");
        assert_eq!(valid.query, "coffee shops");
        assert!((valid.coordinates.latitude - 28.6).abs() < f64::EPSILON);
    }

    #[test]
    fn blank_query_is_rejected_first() {
        let request = SearchRequest {
            query: Some("   ".to_string()),
            location: None,
        };
        assert_eq!(validate_request(&request).unwrap_err(), ValidationError::MissingQuery);
        assert_eq!(
            validate_request(&SearchRequest::default()).unwrap_err(),
            ValidationError::MissingQuery
        );
    }

    #[test]
    fn missing_location_is_rejected() {
        let request = SearchRequest {
            query: Some("coffee".to_string()),
            location: None,
        };
        assert_eq!(validate_request(&request).unwrap_err(), ValidationError::MissingLocation);
    }

    #[test]
    fn partial_or_out_of_range_coordinates_are_rejected() {
        for location in [
            at(Some(28.6), None),
            at(None, None),
            at(Some(90.5), Some(0.0)),
            at(Some(0.0), Some(-180.1)),
            at(Some(f64::NAN), Some(0.0)),
        ] {
            let request = SearchRequest::new("coffee", location);
            assert!(matches!(
                validate_request(&request),
                Err(ValidationError::InvalidCoordinates { .. })
            ));
        }
    }

    #[test]
    fn request_deserializes_from_api_body() {
        let request: SearchRequest = serde_json::from_value(serde_json::json!({
            "query": "coffee",
            "location": { "latitude": 12.97, "longitude": 77.59, "timezone": "Asia/Kolkata" }
        }))
        .expect("parse");
        let valid = validate_request(&request).expect("valid");
        assert_eq!(valid.location.timezone.as_deref(), Some("Asia/Kolkata"));
    }
}
