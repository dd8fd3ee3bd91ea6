//! The JSON response envelope shared by the HTTP server and the CLI.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingData,
    MissingQuery,
    MissingLocation,
    MissingCoordinates,
    InvalidCoordinates,
    LocationNotFound,
    SaveFailed,
    SearchError,
    RankingError,
    ServerError,
    NotFound,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingData => "MISSING_DATA",
            Self::MissingQuery => "MISSING_QUERY",
            Self::MissingLocation => "MISSING_LOCATION",
            Self::MissingCoordinates => "MISSING_COORDINATES",
            Self::InvalidCoordinates => "INVALID_COORDINATES",
            Self::LocationNotFound => "LOCATION_NOT_FOUND",
            Self::SaveFailed => "SAVE_FAILED",
            Self::SearchError => "SEARCH_ERROR",
            Self::RankingError => "RANKING_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::NotFound => "NOT_FOUND",
        }
    }

    /// Whether the code describes a problem with the caller's input.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::MissingData
                | Self::MissingQuery
                | Self::MissingLocation
                | Self::MissingCoordinates
                | Self::InvalidCoordinates
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{success, data?, error?, error_code?, details?, message?, meta?}`.
///
/// Absent fields are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
            details: None,
            message: None,
            meta: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn error(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            error_code: Some(code),
            details: None,
            message: None,
            meta: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_screaming_snake() {
        let json = serde_json::to_value(ErrorCode::InvalidCoordinates).expect("serialize");
        assert_eq!(json, "INVALID_COORDINATES");
        assert_eq!(ErrorCode::RankingError.as_str(), "RANKING_ERROR");
        assert_eq!(ErrorCode::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn success_omits_error_fields() {
        let env = ApiEnvelope::success(serde_json::json!({"ok": true}))
            .with_meta(serde_json::json!({"total_ranked": 3}));
        let json = serde_json::to_value(&env).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["meta"]["total_ranked"], 3);
        assert!(json.get("error").is_none());
        assert!(json.get("error_code").is_none());
    }

    #[test]
    fn error_envelope_carries_code_and_details() {
        let env: ApiEnvelope<()> = ApiEnvelope::error(ErrorCode::RankingError, "ranking failed")
            .with_details(serde_json::json!({"stage": "ranking"}));
        let json = serde_json::to_value(&env).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], "RANKING_ERROR");
        assert_eq!(json["details"]["stage"], "ranking");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn success_with_message_sets_message() {
        let env = ApiEnvelope::success_with_message(1_u8, "saved");
        assert_eq!(env.message.as_deref(), Some("saved"));
        assert!(env.success);
    }

    #[test]
    fn client_error_codes() {
        assert!(ErrorCode::MissingQuery.is_client_error());
        assert!(!ErrorCode::SearchError.is_client_error());
    }
}
