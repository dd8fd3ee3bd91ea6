//! Mapping of SerpApi payloads into [`PlaceRecord`]s and [`ReviewSnippet`]s.

use serde::de::DeserializeOwned;
use serde_json::Value;

use placerank_core::{PlaceRecord, Provider, ReviewSnippet};

use super::types::{LocalResultItem, LocalSearchResponse, RawReview};

/// Web-local records kept per search.
pub const LOCAL_RESULT_CAP: usize = 7;

/// Maps `local_results` into records, keeping at most [`LOCAL_RESULT_CAP`].
///
/// Id preference is `data_id`, then `place_id`, then `ludocid`.
#[must_use]
pub fn normalize_local_results(payload: LocalSearchResponse) -> Vec<PlaceRecord> {
    parse_items::<LocalResultItem>(payload.local_results.unwrap_or_default(), "local_results")
        .into_iter()
        .map(normalize_local_item)
        .take(LOCAL_RESULT_CAP)
        .collect()
}

fn normalize_local_item(item: LocalResultItem) -> PlaceRecord {
    let mut record = PlaceRecord::new(Provider::Google);
    record.google_place_id = item
        .data_id
        .as_ref()
        .and_then(id_string)
        .or_else(|| item.place_id.as_ref().and_then(id_string))
        .or_else(|| item.ludocid.as_ref().and_then(id_string));
    record.name = item.title;
    record.address = item.address;
    record.latitude = item.gps_coordinates.and_then(|g| g.latitude);
    record.longitude = item.gps_coordinates.and_then(|g| g.longitude);
    record.rating = item.rating;
    record.reviews_count = item.reviews;
    record.price = item.price;
    record.categories = item
        .place_type
        .filter(|t| !t.trim().is_empty())
        .map(|t| vec![t]);
    record
}

/// Renders an identifier that may arrive as a string or a bare number.
#[must_use]
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Maps raw reviews to snippets, keeping at most `max`.
///
/// Snippet text prefers `extracted_snippet.original` over `snippet`.
#[must_use]
pub fn normalize_reviews(raw: Vec<Value>, max: usize) -> Vec<ReviewSnippet> {
    parse_items::<RawReview>(raw, "reviews")
        .into_iter()
        .take(max)
        .map(|review| ReviewSnippet {
            rating: review.rating,
            date: review.date,
            iso_date: review.iso_date,
            snippet: review
                .extracted_snippet
                .and_then(|e| e.original)
                .filter(|s| !s.is_empty())
                .or(review.snippet),
            user: review.user.and_then(|u| u.name),
            source: review.source,
        })
        .collect()
}

fn parse_items<T: DeserializeOwned>(items: Vec<Value>, context: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(context, error = %e, "skipping malformed item");
                None
            }
        })
        .collect()
}
