use thiserror::Error;

/// Errors from a single chat-completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM endpoint returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion carried no `choices[0].message.content` text.
    #[error("LLM response has no message content")]
    MissingContent,

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Errors from the ranking stage.
///
/// Variants that follow a completed model call keep the raw reply text.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("ranking request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("could not encode search results for ranking: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid JSON response from AI: {message}")]
    InvalidJson {
        message: String,
        raw_response: String,
    },

    #[error("ranking response violates the output schema: {reason}")]
    SchemaViolation {
        reason: String,
        raw_response: String,
    },
}

impl RankingError {
    /// The model's raw reply, when one was received.
    #[must_use]
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::InvalidJson { raw_response, .. } | Self::SchemaViolation { raw_response, .. } => {
                Some(raw_response)
            }
            Self::Llm(_) | Self::Encode(_) => None,
        }
    }
}
