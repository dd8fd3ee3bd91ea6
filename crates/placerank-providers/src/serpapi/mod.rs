//! Client for SerpApi's Google engines (`google_local`, `google_maps`,
//! `google_maps_reviews`), all served from `GET /search.json`.

mod ladder;
mod normalize;
mod reviews;
pub mod types;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use placerank_core::{
    distance_km, AppConfig, Coordinates, HttpOptions, LocalSearchParams, PlaceRecord,
};

use crate::error::ProviderError;
use crate::http::{build_client, endpoint, parse_base_url, send_json};

pub use ladder::{aggressive_location, simplify_location, LadderStep, LocationLadder};
pub use normalize::{id_string, normalize_local_results, normalize_reviews, LOCAL_RESULT_CAP};
pub use reviews::{ReviewIdentifier, MAX_REVIEWS};
use types::LocalSearchResponse;

const SEARCH_PATH: &str = "search.json";

pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl SerpApiClient {
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
            base_url: parse_base_url(base_url)?,
        })
    }

    /// # Errors
    ///
    /// See [`SerpApiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(
            &config.serpapi_key,
            &config.http_options(),
            &config.serpapi_base_url,
        )
    }

    /// One `google_local` request with exactly the given parameters.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::UnexpectedStatus`] on a non-2xx response (400 is a
    ///   parameter rejection).
    /// - [`ProviderError::Http`] on network failure or timeout.
    /// - [`ProviderError::Deserialize`] if the body is not a JSON object.
    pub async fn local_search(
        &self,
        params: &LocalSearchParams,
    ) -> Result<LocalSearchResponse, ProviderError> {
        let num = params.num.to_string();
        let mut pairs: Vec<(&str, &str)> = vec![
            ("engine", LocalSearchParams::ENGINE),
            ("q", params.q.as_str()),
            ("hl", params.hl.as_str()),
            ("gl", params.gl.as_str()),
            ("num", num.as_str()),
        ];
        if let Some(location) = params.location.as_deref().filter(|l| !l.is_empty()) {
            pairs.push(("location", location));
        }
        self.get_json(&pairs, LocalSearchParams::ENGINE).await
    }

    /// Runs `google_local` through the location ladder.
    ///
    /// Returns `None` when every permitted attempt failed. Only a parameter
    /// rejection moves to the next rung; any other failure ends the ladder.
    pub async fn search_with_ladder(
        &self,
        params: &LocalSearchParams,
    ) -> Option<LocalSearchResponse> {
        let mut ladder = LocationLadder::new(params.location.as_deref());
        loop {
            let step = ladder.step();
            if step == LadderStep::Exhausted {
                tracing::warn!(q = %params.q, "web-local search exhausted; returning no results");
                return None;
            }

            let attempt = LocalSearchParams {
                location: ladder.location().map(ToOwned::to_owned),
                ..params.clone()
            };
            match self.local_search(&attempt).await {
                Ok(payload) => {
                    tracing::debug!(%step, location = ?attempt.location, "web-local search succeeded");
                    return Some(payload);
                }
                Err(e) => {
                    let rejected = e.is_parameter_rejection();
                    tracing::warn!(
                        %step,
                        location = ?attempt.location,
                        rejected,
                        error = %e,
                        "web-local search attempt failed"
                    );
                    ladder.advance(rejected);
                }
            }
        }
    }

    /// Full web-local search: ladder, normalization, distance, and reviews.
    ///
    /// Never fails; an exhausted ladder yields an empty list.
    pub async fn search_local(
        &self,
        params: &LocalSearchParams,
        origin: Option<Coordinates>,
    ) -> Vec<PlaceRecord> {
        let Some(payload) = self.search_with_ladder(params).await else {
            return Vec::new();
        };

        let mut records = normalize_local_results(payload);
        for record in &mut records {
            record.distance_km = distance_km(origin, record.latitude, record.longitude);
            let reviews = self.fetch_reviews(record, &params.hl).await;
            record.recent_reviews = (!reviews.is_empty()).then_some(reviews);
        }
        records
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        pairs: &[(&str, &str)],
        context: &str,
    ) -> Result<T, ProviderError> {
        let url = endpoint(&self.base_url, &[SEARCH_PATH])?;
        let request = self
            .client
            .get(url)
            .query(pairs)
            .query(&[("api_key", self.api_key.as_str())]);
        send_json(request, context).await
    }
}
