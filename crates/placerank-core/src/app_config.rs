use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, built once at startup and handed to every client.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub foursquare_api_key: String,
    pub foursquare_base_url: String,
    pub foursquare_api_version: String,
    pub serpapi_key: String,
    pub serpapi_base_url: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub geocoder_base_url: String,
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_timezone: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub location_cache_path: PathBuf,
}

impl AppConfig {
    /// The `"lat,lon"` anchor used when a request carries no coordinates.
    #[must_use]
    pub fn default_ll(&self) -> String {
        format!("{},{}", self.default_latitude, self.default_longitude)
    }

    #[must_use]
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout_secs: self.request_timeout_secs,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Timeout and `User-Agent` applied to every outbound HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            user_agent: "placerank/0.1 (local-geo-context)".to_string(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("foursquare_api_key", &"[redacted]")
            .field("foursquare_base_url", &self.foursquare_base_url)
            .field("foursquare_api_version", &self.foursquare_api_version)
            .field("serpapi_key", &"[redacted]")
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("llm_api_key", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("default_latitude", &self.default_latitude)
            .field("default_longitude", &self.default_longitude)
            .field("default_timezone", &self.default_timezone)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("location_cache_path", &self.location_cache_path)
            .finish()
    }
}
