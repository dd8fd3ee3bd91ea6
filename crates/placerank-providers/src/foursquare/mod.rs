//! Client for the Foursquare Places API.
//!
//! Search returns only ids (`fields=fsq_place_id`); each id is then expanded
//! with a detail lookup and normalized into a [`PlaceRecord`].

mod normalize;
pub mod types;

use reqwest::{Client, Url};

use placerank_core::params::DIRECTORY_RESULT_CAP;
use placerank_core::{distance_km, AppConfig, Coordinates, DirectorySearchParams, HttpOptions, PlaceRecord};

use crate::error::ProviderError;
use crate::http::{build_client, endpoint, parse_base_url, send_json};

pub use normalize::{format_address, normalize_place};
use types::{PlaceDetail, PlaceSearchResponse};

const DEFAULT_API_VERSION: &str = "2025-06-17";
const API_VERSION_HEADER: &str = "X-Places-Api-Version";

pub struct FoursquareClient {
    client: Client,
    api_key: String,
    api_version: String,
    base_url: Url,
}

impl FoursquareClient {
    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        options: &HttpOptions,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(options)?,
            api_key: api_key.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Creates a client from the application config (base URL, key, API version).
    ///
    /// # Errors
    ///
    /// See [`FoursquareClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self::with_base_url(
            &config.foursquare_api_key,
            &config.http_options(),
            &config.foursquare_base_url,
        )?
        .with_api_version(&config.foursquare_api_version))
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_owned();
        self
    }

    /// Runs a place search and returns at most five place ids, in provider order.
    ///
    /// Any `fields` value in `params` is replaced with `fsq_place_id`.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ProviderError::Http`] on network failure or timeout.
    /// - [`ProviderError::Deserialize`] if the body is not the expected shape.
    pub async fn search_ids(
        &self,
        params: &DirectorySearchParams,
    ) -> Result<Vec<String>, ProviderError> {
        let url = endpoint(&self.base_url, &["places", "search"])?;
        let mut query: Vec<(&str, String)> = params
            .query_pairs()
            .into_iter()
            .filter(|(name, _)| *name != "fields")
            .collect();
        query.push(("fields", "fsq_place_id".to_string()));

        let request = self.authorized(self.client.get(url)).query(&query);
        let response: PlaceSearchResponse = send_json(request, "places/search").await?;

        let cap = usize::try_from(DIRECTORY_RESULT_CAP).unwrap_or(usize::MAX);
        Ok(response
            .results
            .into_iter()
            .filter_map(|item| item.fsq_place_id.filter(|id| !id.is_empty()))
            .take(cap)
            .collect())
    }

    /// Fetches the full detail payload for one place id.
    ///
    /// # Errors
    ///
    /// Same as [`FoursquareClient::search_ids`].
    pub async fn place_details(&self, fsq_place_id: &str) -> Result<PlaceDetail, ProviderError> {
        let url = endpoint(&self.base_url, &["places", fsq_place_id])?;
        let request = self.authorized(self.client.get(url));
        send_json(request, &format!("places/{fsq_place_id}")).await
    }

    /// Searches, expands every id with a detail lookup, and annotates distance.
    ///
    /// A failed detail lookup drops that one record; the rest of the batch is kept.
    ///
    /// # Errors
    ///
    /// Returns the search call's error. Detail failures never surface.
    pub async fn fetch_places(
        &self,
        params: &DirectorySearchParams,
        origin: Option<Coordinates>,
    ) -> Result<Vec<PlaceRecord>, ProviderError> {
        let ids = self.search_ids(params).await?;
        tracing::debug!(count = ids.len(), "directory search returned ids");

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.place_details(id).await {
                Ok(detail) => {
                    let mut record = normalize_place(detail);
                    if record.fsq_place_id.is_none() {
                        record.fsq_place_id = Some(id.clone());
                    }
                    record.distance_km = distance_km(origin, record.latitude, record.longitude);
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(fsq_place_id = %id, error = %e, "dropping place: detail lookup failed");
                }
            }
        }
        Ok(records)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(API_VERSION_HEADER, &self.api_version)
    }
}
