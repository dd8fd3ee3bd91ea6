use thiserror::Error;

use placerank_core::ErrorCode;
use placerank_llm::{LlmError, RankingError};
use placerank_providers::ProviderError;

use crate::search::SearchSummary;

/// Request problems caught before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Search query is required")]
    MissingQuery,

    #[error("Location data is required")]
    MissingLocation,

    #[error("Valid location coordinates are required")]
    InvalidCoordinates {
        latitude: Option<f64>,
        longitude: Option<f64>,
    },
}

impl ValidationError {
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingQuery => ErrorCode::MissingQuery,
            Self::MissingLocation => ErrorCode::MissingLocation,
            Self::InvalidCoordinates { .. } => ErrorCode::InvalidCoordinates,
        }
    }
}

/// Failures that have no fallback and end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The directory search call failed.
    #[error("Search failed: {0}")]
    Search(#[source] ProviderError),

    /// Ranking failed after a successful search; `summary` describes what
    /// was searched so callers can report it without the full payload.
    #[error("Ranking failed: {source}")]
    Ranking {
        #[source]
        source: RankingError,
        summary: SearchSummary,
    },
}

impl PipelineError {
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::Search(_) => ErrorCode::SearchError,
            Self::Ranking { .. } => ErrorCode::RankingError,
        }
    }

    /// The pipeline stage that failed, as reported in error details.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Search(_) => "search",
            Self::Ranking { .. } => "ranking",
        }
    }
}

/// Errors constructing the live HTTP clients from configuration.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("provider client: {0}")]
    Provider(#[from] ProviderError),

    #[error("LLM client: {0}")]
    Llm(#[from] LlmError),
}
