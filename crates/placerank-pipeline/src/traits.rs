//! Seams between the pipeline and its collaborators.
//!
//! Each trait covers one call the pipeline makes. The concrete HTTP clients
//! implement them by delegating to their inherent methods.

use placerank_core::{
    Coordinates, DirectorySearchParams, LocalSearchParams, PlaceRecord, SearchEnvelope,
    UserContext,
};
use placerank_llm::{QueryPlanner, RankingError, RankingGateway, RankingOutcome};
use placerank_providers::{FoursquareClient, NominatimClient, ProviderError, SerpApiClient};

/// Turns free text plus context into provider search parameters. Never fails.
pub trait PlanQuery: Send + Sync {
    fn plan_directory(
        &self,
        query: &str,
        ctx: &UserContext,
    ) -> impl std::future::Future<Output = DirectorySearchParams> + Send;

    fn plan_local(
        &self,
        query: &str,
        ctx: &UserContext,
    ) -> impl std::future::Future<Output = LocalSearchParams> + Send;
}

/// The structured directory. Its search failure is a hard failure.
pub trait FetchDirectory: Send + Sync {
    fn fetch_places(
        &self,
        params: &DirectorySearchParams,
        origin: Option<Coordinates>,
    ) -> impl std::future::Future<Output = Result<Vec<PlaceRecord>, ProviderError>> + Send;
}

/// The web-local provider. Degrades to an empty list instead of failing.
pub trait FetchLocal: Send + Sync {
    fn search_local(
        &self,
        params: &LocalSearchParams,
        origin: Option<Coordinates>,
    ) -> impl std::future::Future<Output = Vec<PlaceRecord>> + Send;
}

pub trait RankPlaces: Send + Sync {
    fn rank(
        &self,
        envelope: &SearchEnvelope,
    ) -> impl std::future::Future<Output = Result<RankingOutcome, RankingError>> + Send;
}

pub trait ReverseGeocode: Send + Sync {
    fn reverse(
        &self,
        coords: Coordinates,
    ) -> impl std::future::Future<Output = Option<String>> + Send;
}

impl PlanQuery for QueryPlanner {
    async fn plan_directory(&self, query: &str, ctx: &UserContext) -> DirectorySearchParams {
        QueryPlanner::plan_directory(self, query, ctx).await
    }

    async fn plan_local(&self, query: &str, ctx: &UserContext) -> LocalSearchParams {
        QueryPlanner::plan_local(self, query, ctx).await
    }
}

impl FetchDirectory for FoursquareClient {
    async fn fetch_places(
        &self,
        params: &DirectorySearchParams,
        origin: Option<Coordinates>,
    ) -> Result<Vec<PlaceRecord>, ProviderError> {
        FoursquareClient::fetch_places(self, params, origin).await
    }
}

impl FetchLocal for SerpApiClient {
    async fn search_local(
        &self,
        params: &LocalSearchParams,
        origin: Option<Coordinates>,
    ) -> Vec<PlaceRecord> {
        SerpApiClient::search_local(self, params, origin).await
    }
}

impl RankPlaces for RankingGateway {
    async fn rank(&self, envelope: &SearchEnvelope) -> Result<RankingOutcome, RankingError> {
        RankingGateway::rank(self, envelope).await
    }
}

impl ReverseGeocode for NominatimClient {
    async fn reverse(&self, coords: Coordinates) -> Option<String> {
        NominatimClient::reverse(self, coords).await
    }
}
