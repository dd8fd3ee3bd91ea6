//! Single-document JSON cache of the user's last known location.
//!
//! The file is always replaced as a whole (write to a sibling temp file, then
//! rename), so concurrent savers never interleave; the last writer wins.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::LocationInput;
use crate::error::LocationCacheError;

/// Returns `true` when both values are finite and within WGS84 bounds.
#[must_use]
pub fn validate_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub captured_at: Option<String>,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

fn default_source() -> String {
    crate::context::FRONTEND_SOURCE.to_string()
}

impl CachedLocation {
    /// The document to cache for client-supplied location data.
    ///
    /// Returns `None` unless both coordinates are present. A missing
    /// `captured_at` is stamped with the current UTC time.
    #[must_use]
    pub fn from_input(input: &LocationInput) -> Option<Self> {
        let coords = input.coordinates()?;
        Some(Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            timezone: input.timezone.clone(),
            captured_at: input
                .captured_at
                .clone()
                .or_else(|| Some(chrono::Utc::now().to_rfc3339())),
            source: default_source(),
            accuracy_m: input.accuracy_m,
        })
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        validate_coordinates(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone)]
pub struct LocationCache {
    path: PathBuf,
}

impl LocationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists `location`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns [`LocationCacheError::InvalidCoordinates`] without touching the
    /// existing file when the coordinates are out of range, or an I/O /
    /// serialization error when the write fails.
    pub fn save(&self, location: &CachedLocation) -> Result<(), LocationCacheError> {
        if !location.is_valid() {
            return Err(LocationCacheError::InvalidCoordinates {
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let body = serde_json::to_vec_pretty(location)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, body).map_err(|source| self.io_error(source))?;
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(self.io_error(source));
        }

        tracing::info!(
            path = %self.path.display(),
            latitude = location.latitude,
            longitude = location.longitude,
            "location cached"
        );
        Ok(())
    }

    /// Reads the cached document.
    ///
    /// Returns `None` when the file is absent, unreadable, malformed, or holds
    /// out-of-range coordinates.
    #[must_use]
    pub fn load(&self) -> Option<CachedLocation> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "location cache unreadable");
                return None;
            }
        };

        match serde_json::from_str::<CachedLocation>(&raw) {
            Ok(location) if location.is_valid() => Some(location),
            Ok(location) => {
                tracing::warn!(
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "ignoring cached location with invalid coordinates"
                );
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "location cache malformed");
                None
            }
        }
    }

    /// Removes the cached document. Clearing an absent cache is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`LocationCacheError::Io`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), LocationCacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> LocationCacheError {
        LocationCacheError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> (PathBuf, LocationCache) {
        let dir = std::env::temp_dir().join(format!("placerank-cache-{}", uuid::Uuid::new_v4()));
        let cache = LocationCache::new(dir.join("location_context.json"));
        (dir, cache)
    }

    fn sample() -> CachedLocation {
        CachedLocation {
            latitude: 28.6139,
            longitude: 77.2090,
            timezone: Some("Asia/Kolkata".to_string()),
            captured_at: Some("2025-03-14T09:26:00Z".to_string()),
            source: "frontend_geolocation".to_string(),
            accuracy_m: Some(12.5),
        }
    }

    #[test]
    fn validate_coordinates_bounds() {
        assert!(validate_coordinates(0.0, 0.0));
        assert!(validate_coordinates(90.0, 180.0));
        assert!(validate_coordinates(-90.0, -180.0));
        assert!(!validate_coordinates(90.0001, 0.0));
        assert!(!validate_coordinates(0.0, -180.5));
        assert!(!validate_coordinates(f64::NAN, 0.0));
    }

    #[test]
    fn save_then_load_round_trips() {
        let (dir, cache) = temp_cache();
        cache.save(&sample()).expect("save");
        assert_eq!(cache.load(), Some(sample()));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn invalid_save_leaves_existing_document_unchanged() {
        let (dir, cache) = temp_cache();
        cache.save(&sample()).expect("save");

        let mut bad = sample();
        bad.latitude = 123.0;
        let err = cache.save(&bad).expect_err("should reject");
        assert!(matches!(err, LocationCacheError::InvalidCoordinates { .. }));
        assert_eq!(cache.load(), Some(sample()));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn load_missing_file_is_none() {
        let (_dir, cache) = temp_cache();
        assert!(cache.load().is_none());
    }

    #[test]
    fn load_ignores_out_of_range_document() {
        let (dir, cache) = temp_cache();
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(
            cache.path(),
            r#"{"latitude": 200.0, "longitude": 0.0, "source": "manual"}"#,
        )
        .expect("write");
        assert!(cache.load().is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn from_input_requires_both_coordinates() {
        let input = LocationInput {
            latitude: Some(12.97),
            longitude: Some(77.59),
            timezone: Some("Asia/Kolkata".to_string()),
            accuracy_m: Some(30.0),
            ..LocationInput::default()
        };
        let cached = CachedLocation::from_input(&input).expect("both coordinates");
        assert_eq!(cached.source, "frontend_geolocation");
        assert_eq!(cached.accuracy_m, Some(30.0));
        assert!(cached.captured_at.is_some());

        let half = LocationInput {
            latitude: Some(12.97),
            ..LocationInput::default()
        };
        assert!(CachedLocation::from_input(&half).is_none());
    }

    #[test]
    fn clear_removes_document_and_tolerates_absence() {
        let (dir, cache) = temp_cache();
        cache.save(&sample()).expect("save");
        cache.clear().expect("clear");
        assert!(cache.load().is_none());
        cache.clear().expect("second clear");
        let _ = std::fs::remove_dir_all(dir);
    }
}
