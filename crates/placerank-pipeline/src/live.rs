use placerank_core::{AppConfig, ContextDefaults};
use placerank_llm::{ChatClient, QueryPlanner, RankingGateway};
use placerank_providers::{FoursquareClient, NominatimClient, SerpApiClient};

use crate::error::ClientBuildError;
use crate::search::PlaceSearch;

/// The pipeline wired to the real HTTP clients.
pub type LivePlaceSearch =
    PlaceSearch<QueryPlanner, FoursquareClient, SerpApiClient, RankingGateway, NominatimClient>;

/// Builds every client from `config`. The planner and ranker share one
/// chat client.
///
/// # Errors
///
/// Returns [`ClientBuildError`] if any HTTP client cannot be constructed.
pub fn build_live_pipeline(config: &AppConfig) -> Result<LivePlaceSearch, ClientBuildError> {
    let chat = ChatClient::from_config(config)?;
    Ok(PlaceSearch::new(
        QueryPlanner::new(chat.clone()),
        FoursquareClient::from_config(config)?,
        SerpApiClient::from_config(config)?,
        RankingGateway::new(chat),
        NominatimClient::from_config(config)?,
        ContextDefaults::from(config),
    ))
}
