//! Per-request user context.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::app_config::AppConfig;
use crate::distance::Coordinates;

/// Provenance tag for contexts built from client-supplied location data.
pub const FRONTEND_SOURCE: &str = "frontend_geolocation";

/// Location data as supplied by a client (browser geolocation, CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    /// RFC 3339 capture timestamp; a trailing `Z` is accepted.
    #[serde(default)]
    pub captured_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl LocationInput {
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}

/// Fallbacks applied when the client omits coordinates or timezone.
#[derive(Debug, Clone)]
pub struct ContextDefaults {
    pub ll: String,
    pub timezone: String,
}

impl From<&AppConfig> for ContextDefaults {
    fn from(config: &AppConfig) -> Self {
        Self {
            ll: config.default_ll(),
            timezone: config.default_timezone.clone(),
        }
    }
}

/// Everything the planner and providers know about where and when the user is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// `"lat,lon"`; the configured default anchor when coordinates are absent.
    pub ll: String,
    pub timezone: String,
    /// Local wall-clock time as `YYYY-MM-DD HH:MM`.
    pub current_time: String,
    #[serde(default)]
    pub text_location: Option<String>,
    pub source: String,
    #[serde(default)]
    pub captured_at: Option<String>,
}

impl UserContext {
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}

/// Builds the context for one search request.
///
/// `text_location` is the reverse-geocoded label for the coordinates, if any.
/// `now` is used for `current_time` unless `captured_at` parses. Either way
/// `current_time` is rendered in the server's local zone; `timezone` is only
/// carried through as a label.
#[must_use]
pub fn build_user_context(
    input: &LocationInput,
    text_location: Option<String>,
    defaults: &ContextDefaults,
    now: DateTime<Local>,
) -> UserContext {
    let coords = input.coordinates();

    let captured_local = input
        .captured_at
        .as_deref()
        .and_then(parse_captured_at)
        .unwrap_or(now);

    let ll = coords.map_or_else(
        || defaults.ll.clone(),
        |c| format!("{},{}", c.latitude, c.longitude),
    );

    UserContext {
        latitude: coords.map(|c| c.latitude),
        longitude: coords.map(|c| c.longitude),
        ll,
        timezone: input
            .timezone
            .clone()
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| defaults.timezone.clone()),
        current_time: captured_local.format("%Y-%m-%d %H:%M").to_string(),
        text_location: coords.and(text_location),
        source: FRONTEND_SOURCE.to_string(),
        captured_at: input.captured_at.clone(),
    }
}

fn parse_captured_at(raw: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}
