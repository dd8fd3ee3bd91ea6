//! Language-model stages of the pipeline: query planning and ranking, both
//! over an OpenAI-compatible chat-completions endpoint.

pub mod chat;
pub mod error;
pub mod planner;
pub mod ranking;

pub use chat::{ChatClient, ChatRequest};
pub use error::{LlmError, RankingError};
pub use planner::QueryPlanner;
pub use ranking::{RankingGateway, RankingOutcome};
