//! HTTP clients for the place providers and the reverse geocoder.
//!
//! - [`FoursquareClient`]: structured places directory (search + per-id details).
//! - [`SerpApiClient`]: web-local results with a location degradation ladder
//!   and best-effort review enrichment.
//! - [`NominatimClient`]: coordinates to a short human-readable label.

pub mod error;
pub mod foursquare;
pub mod geocode;
mod http;
pub mod serpapi;

pub use error::ProviderError;
pub use foursquare::FoursquareClient;
pub use geocode::NominatimClient;
pub use placerank_core::HttpOptions;
pub use serpapi::{
    aggressive_location, simplify_location, LadderStep, LocationLadder, ReviewIdentifier,
    SerpApiClient,
};
