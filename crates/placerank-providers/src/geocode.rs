//! Reverse geocoding against a Nominatim-compatible `/reverse` endpoint.

use reqwest::{Client, Url};
use serde::Deserialize;

use placerank_core::{AppConfig, Coordinates, HttpOptions};

use crate::error::ProviderError;
use crate::http::{build_client, endpoint, parse_base_url, send_json};

const REVERSE_ZOOM: &str = "10";

#[derive(Debug, Default, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<ReverseAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReverseAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

pub struct NominatimClient {
    client: Client,
    base_url: Url,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(options: &HttpOptions, base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(options)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// # Errors
    ///
    /// See [`NominatimClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(&config.http_options(), &config.geocoder_base_url)
    }

    /// A short label such as `"New Delhi, Delhi"` for `coords`.
    ///
    /// Any failure is logged and yields `None`.
    pub async fn reverse(&self, coords: Coordinates) -> Option<String> {
        match self.reverse_raw(coords).await {
            Ok(response) => reverse_label(&response),
            Err(e) => {
                tracing::warn!(
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    error = %e,
                    "reverse geocoding failed"
                );
                None
            }
        }
    }

    /// # Errors
    ///
    /// Any transport, status, or decode failure from the request.
    pub async fn reverse_raw(&self, coords: Coordinates) -> Result<ReverseResponse, ProviderError> {
        let url = endpoint(&self.base_url, &["reverse"])?;
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();
        let request = self.client.get(url).query(&[
            ("format", "jsonv2"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("zoom", REVERSE_ZOOM),
            ("addressdetails", "1"),
        ]);
        send_json(request, "reverse").await
    }
}

/// Label precedence: `"{city}, {state}"`, `"{city}, {country}"`,
/// `"{state}, {country}"`, then `display_name`. City is the first of
/// `city`, `town`, `village`.
#[must_use]
pub fn reverse_label(response: &ReverseResponse) -> Option<String> {
    if let Some(address) = &response.address {
        let city = present(address.city.as_deref())
            .or_else(|| present(address.town.as_deref()))
            .or_else(|| present(address.village.as_deref()));
        let state = present(address.state.as_deref());
        let country = present(address.country.as_deref());

        let label = match (city, state, country) {
            (Some(city), Some(state), _) => Some(format!("{city}, {state}")),
            (Some(city), None, Some(country)) => Some(format!("{city}, {country}")),
            (None, Some(state), Some(country)) => Some(format!("{state}, {country}")),
            _ => None,
        };
        if label.is_some() {
            return label;
        }
    }
    present(response.display_name.as_deref()).map(ToOwned::to_owned)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
