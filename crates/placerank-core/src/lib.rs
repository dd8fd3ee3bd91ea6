//! Shared domain types, configuration, and small pure helpers for placerank.

pub mod app_config;
pub mod config;
pub mod context;
pub mod distance;
pub mod envelope;
pub mod error;
pub mod location_cache;
pub mod params;
pub mod types;

pub use app_config::{AppConfig, Environment, HttpOptions};
pub use config::{
    load_app_config, load_app_config_from_env, location_cache_path_from_env, REQUIRED_API_KEY_VARS,
};
pub use context::{build_user_context, ContextDefaults, LocationInput, UserContext};
pub use distance::{distance_km, haversine_km, Coordinates, EARTH_RADIUS_KM};
pub use envelope::{ApiEnvelope, ErrorCode};
pub use error::{ConfigError, LocationCacheError};
pub use location_cache::{validate_coordinates, CachedLocation, LocationCache};
pub use params::{DirectorySearchParams, LocalSearchParams};
pub use types::{
    PlaceRecord, Provider, ProviderResults, QueryAnalysis, RankedPlace, RankingResponse,
    ReviewSnippet, SearchEnvelope, SearchResult,
};
