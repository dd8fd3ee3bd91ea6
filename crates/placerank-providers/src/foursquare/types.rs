//! Raw Foursquare Places payloads. Only the fields the normalizer reads.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PlaceSearchResponse {
    #[serde(default)]
    pub results: Vec<PlaceSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceSearchItem {
    #[serde(default)]
    pub fsq_place_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetail {
    #[serde(default)]
    pub fsq_place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<PlaceLocation>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub categories: Option<Vec<NamedRef>>,
    #[serde(default)]
    pub chains: Option<Vec<NamedRef>>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceLocation {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// A category or chain reference; only the display name is kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
}
