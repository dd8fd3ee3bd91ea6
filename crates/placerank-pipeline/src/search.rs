//! The search-then-rank orchestrator.

use chrono::Local;
use serde::{Deserialize, Serialize};

use placerank_core::{
    build_user_context, ContextDefaults, SearchEnvelope, SearchResult, UserContext,
};
use placerank_llm::RankingOutcome;

use crate::error::PipelineError;
use crate::traits::{FetchDirectory, FetchLocal, PlanQuery, RankPlaces, ReverseGeocode};
use crate::validate::{validate_request, SearchRequest, ValidatedRequest};

/// Counts describing a finished search, small enough for error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub query: String,
    pub foursquare_count: usize,
    pub google_count: usize,
}

impl From<&SearchEnvelope> for SearchSummary {
    fn from(envelope: &SearchEnvelope) -> Self {
        Self {
            query: envelope.query.clone(),
            foursquare_count: envelope.foursquare.count,
            google_count: envelope.google.count,
        }
    }
}

/// A search together with its ranking.
#[derive(Debug, Clone)]
pub struct RankedSearch {
    pub search: SearchEnvelope,
    pub ranking: RankingOutcome,
}

/// Runs one request through planning, both providers, and the ranker.
///
/// Stages run strictly in sequence. Only the directory search and the
/// ranking call can fail the run; every other stage has a fallback inside
/// its collaborator.
pub struct PlaceSearch<P, D, L, R, G> {
    planner: P,
    directory: D,
    local: L,
    ranker: R,
    geocoder: G,
    defaults: ContextDefaults,
}

impl<P, D, L, R, G> PlaceSearch<P, D, L, R, G>
where
    P: PlanQuery,
    D: FetchDirectory,
    L: FetchLocal,
    R: RankPlaces,
    G: ReverseGeocode,
{
    #[must_use]
    pub fn new(
        planner: P,
        directory: D,
        local: L,
        ranker: R,
        geocoder: G,
        defaults: ContextDefaults,
    ) -> Self {
        Self {
            planner,
            directory,
            local,
            ranker,
            geocoder,
            defaults,
        }
    }

    /// Validates `request` and searches both providers.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] before any network call.
    /// - [`PipelineError::Search`] if the directory search fails.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchEnvelope, PipelineError> {
        let valid = validate_request(request)?;
        self.search_validated(&valid).await
    }

    /// Searches both providers for an already validated request.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Search`] if the directory search fails.
    pub async fn search_validated(
        &self,
        request: &ValidatedRequest,
    ) -> Result<SearchEnvelope, PipelineError> {
        let ctx = self.context_for(request).await;
        let origin = ctx.coordinates();
        tracing::info!(
            query = %request.query,
            ll = %ctx.ll,
            text_location = ?ctx.text_location,
            "starting place search"
        );

        let directory_params = self.planner.plan_directory(&request.query, &ctx).await;
        tracing::debug!(?directory_params, "directory plan");
        let foursquare = self
            .directory
            .fetch_places(&directory_params, origin)
            .await
            .map_err(PipelineError::Search)?;

        let local_params = self.planner.plan_local(&request.query, &ctx).await;
        tracing::debug!(?local_params, "web-local plan");
        let google = self.local.search_local(&local_params, origin).await;

        let foursquare = SearchResult::new(ctx.clone(), request.query.as_str(), foursquare);
        let google = SearchResult::new(ctx, request.query.as_str(), google);
        tracing::info!(
            foursquare = foursquare.count,
            google = google.count,
            "place search complete"
        );

        Ok(SearchEnvelope::from_results(foursquare, google))
    }

    /// Ranks a previously produced search envelope.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Ranking`] carrying the ranker's error.
    pub async fn rank(&self, envelope: &SearchEnvelope) -> Result<RankingOutcome, PipelineError> {
        self.ranker
            .rank(envelope)
            .await
            .map_err(|source| PipelineError::Ranking {
                source,
                summary: SearchSummary::from(envelope),
            })
    }

    /// [`search`](Self::search) followed by [`rank`](Self::rank).
    ///
    /// # Errors
    ///
    /// Any error from either stage.
    pub async fn search_and_rank(
        &self,
        request: &SearchRequest,
    ) -> Result<RankedSearch, PipelineError> {
        let search = self.search(request).await?;
        let ranking = self.rank(&search).await?;
        Ok(RankedSearch { search, ranking })
    }

    async fn context_for(&self, request: &ValidatedRequest) -> UserContext {
        let text_location = self.geocoder.reverse(request.coordinates).await;
        build_user_context(&request.location, text_location, &self.defaults, Local::now())
    }
}
