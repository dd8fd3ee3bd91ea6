use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Environment variables that must be set for any provider call.
pub const REQUIRED_API_KEY_VARS: [&str; 3] = ["FOURSQUARE_API_KEY", "SERPAPI_KEY", "GROQ_API_KEY"];

const LOCATION_CACHE_PATH_VAR: &str = "PLACERANK_LOCATION_CACHE_PATH";
const DEFAULT_LOCATION_CACHE_PATH: &str = "./data/location_context.json";

/// The location cache path alone, for callers that need no API keys.
#[must_use]
pub fn location_cache_path_from_env() -> PathBuf {
    PathBuf::from(
        std::env::var(LOCATION_CACHE_PATH_VAR)
            .unwrap_or_else(|_| DEFAULT_LOCATION_CACHE_PATH.to_string()),
    )
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_coord = |var: &str, default: &str, bound: f64| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if !value.is_finite() || value.abs() > bound {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be within -{bound}..={bound}"),
            });
        }
        Ok(value)
    };

    let [foursquare_key_var, serpapi_key_var, llm_key_var] = REQUIRED_API_KEY_VARS;
    let foursquare_api_key = require(foursquare_key_var)?;
    let serpapi_key = require(serpapi_key_var)?;
    let llm_api_key = require(llm_key_var)?;

    let env = parse_environment(&or_default("PLACERANK_ENV", "development"));
    let bind_addr = parse_addr("PLACERANK_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("PLACERANK_LOG_LEVEL", "info");

    let foursquare_base_url = or_default(
        "FOURSQUARE_BASE_URL",
        "https://places-api.foursquare.com",
    );
    let foursquare_api_version = or_default("FOURSQUARE_API_VERSION", "2025-06-17");
    let serpapi_base_url = or_default("SERPAPI_BASE_URL", "https://serpapi.com");
    let llm_base_url = or_default("GROQ_BASE_URL", "https://api.groq.com/openai/v1");
    let llm_model = or_default("GROQ_MODEL", "openai/gpt-oss-120b");
    let geocoder_base_url = or_default(
        "NOMINATIM_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );

    let default_latitude = parse_coord("DEFAULT_LATITUDE", "28.6304", 90.0)?;
    let default_longitude = parse_coord("DEFAULT_LONGITUDE", "77.2177", 180.0)?;
    let default_timezone = or_default("DEFAULT_TIMEZONE", "UTC");

    let request_timeout_secs = parse_u64("PLACERANK_REQUEST_TIMEOUT_SECS", "120")?;
    let user_agent = or_default("PLACERANK_USER_AGENT", "placerank/0.1 (local-geo-context)");
    let location_cache_path = PathBuf::from(or_default(
        LOCATION_CACHE_PATH_VAR,
        DEFAULT_LOCATION_CACHE_PATH,
    ));

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        foursquare_api_key,
        foursquare_base_url,
        foursquare_api_version,
        serpapi_key,
        serpapi_base_url,
        llm_api_key,
        llm_base_url,
        llm_model,
        geocoder_base_url,
        default_latitude,
        default_longitude,
        default_timezone,
        request_timeout_secs,
        user_agent,
        location_cache_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
