//! Shared `reqwest` plumbing for every provider client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use placerank_core::HttpOptions;

use crate::error::ProviderError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn build_client(options: &HttpOptions) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(options.timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(options.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Parses `base_url`, normalising it to end with exactly one slash so that
/// joined paths extend the base rather than replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ProviderError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ProviderError::InvalidBaseUrl {
            base_url: base.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends `request`, asserts a 2xx status, and parses the body as JSON.
///
/// URLs are stripped of their query strings before they reach an error, since
/// some providers take the credential as a query parameter.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &str,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|e| e.without_url())?;
    let status = response.status();
    if !status.is_success() {
        let mut url = response.url().clone();
        url.set_query(None);
        return Err(ProviderError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.text().await.map_err(|e| e.without_url())?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base_url_adds_single_trailing_slash() {
        let url = parse_base_url("https://api.example.com/v1//").expect("valid");
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
    }

    #[test]
    fn parse_base_url_rejects_garbage() {
        let err = parse_base_url("not a url").expect_err("invalid");
        assert!(matches!(err, ProviderError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn endpoint_extends_base_path() {
        let base = parse_base_url("https://api.example.com/openai/v1").expect("valid");
        let url = endpoint(&base, &["chat", "completions"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://api.example.com/openai/v1/chat/completions");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let base = parse_base_url("https://api.example.com").expect("valid");
        let url = endpoint(&base, &["places", "a/b c"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://api.example.com/places/a%2Fb%20c");
    }
}
