//! Raw SerpApi payloads.
//!
//! List items are kept as `serde_json::Value` at the top level and parsed one
//! by one, so a single oddly-shaped item cannot fail the whole response.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct LocalSearchResponse {
    #[serde(default)]
    pub local_results: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct LocalResultItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gps_coordinates: Option<GpsCoordinates>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u64>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, rename = "type")]
    pub place_type: Option<String>,
    #[serde(default)]
    pub data_id: Option<Value>,
    #[serde(default)]
    pub place_id: Option<Value>,
    #[serde(default)]
    pub ludocid: Option<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GpsCoordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapsSearchResponse {
    #[serde(default)]
    pub place_results: Option<MapsPlace>,
    #[serde(default)]
    pub local_results: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapsPlace {
    #[serde(default)]
    pub data_id: Option<Value>,
    #[serde(default)]
    pub place_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewsResponse {
    #[serde(default)]
    pub reviews: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct RawReview {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub iso_date: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub extracted_snippet: Option<ExtractedSnippet>,
    #[serde(default)]
    pub user: Option<ReviewUser>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractedSnippet {
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewUser {
    #[serde(default)]
    pub name: Option<String>,
}
