//! Best-effort review enrichment for web-local records.

use placerank_core::{PlaceRecord, ReviewSnippet};

use super::normalize::{id_string, normalize_reviews};
use super::types::{MapsSearchResponse, ReviewsResponse};
use super::SerpApiClient;
use crate::error::ProviderError;

/// Snippets attached per record.
pub const MAX_REVIEWS: usize = 3;

const MAPS_ENGINE: &str = "google_maps";
const REVIEWS_ENGINE: &str = "google_maps_reviews";

/// How a place is addressed on the reviews engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewIdentifier {
    /// Hex feature id (`0x…:0x…`).
    DataId(String),
    PlaceId(String),
}

impl ReviewIdentifier {
    /// `0x`-prefixed ids are data ids; anything else is a place id.
    #[must_use]
    pub fn from_raw(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() {
            None
        } else if id.starts_with("0x") {
            Some(Self::DataId(id.to_owned()))
        } else {
            Some(Self::PlaceId(id.to_owned()))
        }
    }

    #[must_use]
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Self::DataId(id) => ("data_id", id),
            Self::PlaceId(id) => ("place_id", id),
        }
    }
}

impl SerpApiClient {
    /// Looks a place up by `"{name} {address}"` on the maps engine.
    ///
    /// Preference: `place_results.data_id`, `place_results.place_id`, then the
    /// first `local_results` entry carrying either. Any failure yields `None`.
    pub async fn resolve_identifier(
        &self,
        name: Option<&str>,
        address: Option<&str>,
        hl: &str,
    ) -> Option<ReviewIdentifier> {
        let q = format!("{} {}", name.unwrap_or_default(), address.unwrap_or_default());
        let q = q.trim();
        if q.is_empty() {
            return None;
        }

        let pairs = [("engine", MAPS_ENGINE), ("q", q), ("hl", hl)];
        let response: MapsSearchResponse = match self.get_json(&pairs, MAPS_ENGINE).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(q, error = %e, "place id resolution failed");
                return None;
            }
        };

        let from_place = response
            .place_results
            .as_ref()
            .and_then(|p| {
                p.data_id
                    .as_ref()
                    .and_then(id_string)
                    .or_else(|| p.place_id.as_ref().and_then(id_string))
            });
        let resolved = from_place.or_else(|| {
            response.local_results.unwrap_or_default().iter().find_map(|item| {
                item.get("data_id")
                    .and_then(id_string)
                    .or_else(|| item.get("place_id").and_then(id_string))
            })
        });
        resolved.as_deref().and_then(ReviewIdentifier::from_raw)
    }

    /// One `google_maps_reviews` request.
    ///
    /// # Errors
    ///
    /// Any transport, status, or decode failure from the request.
    pub async fn review_listing(
        &self,
        id: &ReviewIdentifier,
        hl: &str,
    ) -> Result<Vec<ReviewSnippet>, ProviderError> {
        let (id_name, id_value) = id.query_pair();
        let pairs = [("engine", REVIEWS_ENGINE), ("hl", hl), (id_name, id_value)];
        let response: ReviewsResponse = self.get_json(&pairs, REVIEWS_ENGINE).await?;
        Ok(normalize_reviews(
            response.reviews.unwrap_or_default(),
            MAX_REVIEWS,
        ))
    }

    /// Up to [`MAX_REVIEWS`] recent reviews for `record`. Never fails.
    ///
    /// Uses the record's own id when it has one, otherwise resolves one by
    /// name and address. An empty listing triggers one independent
    /// re-resolution and a single retry.
    pub async fn fetch_reviews(&self, record: &PlaceRecord, hl: &str) -> Vec<ReviewSnippet> {
        let name = record.name.as_deref();
        let address = record.address.as_deref();

        let own_id = record
            .google_place_id
            .as_deref()
            .and_then(ReviewIdentifier::from_raw);
        let id = match own_id {
            Some(id) => id,
            None => match self.resolve_identifier(name, address, hl).await {
                Some(id) => id,
                None => return Vec::new(),
            },
        };

        let reviews = self.listing_or_empty(&id, hl).await;
        if !reviews.is_empty() {
            return reviews;
        }

        match self.resolve_identifier(name, address, hl).await {
            Some(retry_id) => self.listing_or_empty(&retry_id, hl).await,
            None => Vec::new(),
        }
    }

    async fn listing_or_empty(&self, id: &ReviewIdentifier, hl: &str) -> Vec<ReviewSnippet> {
        match self.review_listing(id, hl).await {
            Ok(reviews) => reviews,
            Err(e) => {
                tracing::warn!(id = ?id, error = %e, "review listing failed");
                Vec::new()
            }
        }
    }
}
