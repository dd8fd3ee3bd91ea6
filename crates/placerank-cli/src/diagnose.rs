//! `diagnose`: local configuration checks plus probes against a running server.

use std::time::Duration;

use serde_json::{json, Value};

use placerank_core::REQUIRED_API_KEY_VARS;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub(crate) struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.status {
            CheckStatus::Pass => "ok  ",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "FAIL",
        };
        write!(f, "[{tag}] {}: {}", self.name, self.detail)
    }
}

/// Runs every check, prints them, and returns whether none failed.
///
/// # Errors
///
/// Returns an error only if the probe HTTP client cannot be built.
pub(crate) async fn run_diagnose(server: &str, with_search: bool) -> anyhow::Result<bool> {
    let mut checks = env_checks(|var| std::env::var(var).ok());
    let client = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
    checks.extend(server_checks(&client, server, with_search).await);

    for check in &checks {
        println!("{check}");
    }
    Ok(checks.iter().all(|c| c.status != CheckStatus::Fail))
}

pub(crate) fn env_checks(lookup: impl Fn(&str) -> Option<String>) -> Vec<Check> {
    REQUIRED_API_KEY_VARS
        .iter()
        .map(|var| match lookup(var).filter(|v| !v.trim().is_empty()) {
            Some(_) => Check::new(*var, CheckStatus::Pass, "set"),
            None => Check::new(*var, CheckStatus::Fail, "missing"),
        })
        .collect()
}

pub(crate) async fn server_checks(
    client: &reqwest::Client,
    server: &str,
    with_search: bool,
) -> Vec<Check> {
    let base = server.trim_end_matches('/');
    let mut checks = Vec::new();

    let health = match client.get(format!("{base}/api/health")).send().await {
        Ok(resp) if resp.status().is_success() => {
            let message = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v["message"].as_str().map(ToOwned::to_owned))
                .unwrap_or_else(|| "OK".to_string());
            Check::new("server", CheckStatus::Pass, message)
        }
        Ok(resp) => Check::new(
            "server",
            CheckStatus::Fail,
            format!("health returned HTTP {}", resp.status()),
        ),
        Err(e) => Check::new(
            "server",
            CheckStatus::Fail,
            format!("cannot reach {base}: {}", e.without_url()),
        ),
    };
    let reachable = health.status == CheckStatus::Pass;
    checks.push(health);
    if !reachable {
        return checks;
    }

    let cache = match client.get(format!("{base}/api/location/cache")).send().await {
        Ok(resp) if resp.status().is_success() => {
            Check::new("location cache", CheckStatus::Pass, "cached location available")
        }
        Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => {
            Check::new("location cache", CheckStatus::Warn, "no cached location yet")
        }
        Ok(resp) => Check::new(
            "location cache",
            CheckStatus::Fail,
            format!("HTTP {}", resp.status()),
        ),
        Err(e) => Check::new("location cache", CheckStatus::Fail, e.without_url().to_string()),
    };
    checks.push(cache);

    if with_search {
        checks.push(search_probe(client, base).await);
    }
    checks
}

async fn search_probe(client: &reqwest::Client, base: &str) -> Check {
    let payload = json!({
        "query": "coffee",
        "location": { "latitude": 28.6139, "longitude": 77.2090, "timezone": "Asia/Kolkata" }
    });
    let response = client
        .post(format!("{base}/api/search/simple"))
        .timeout(SEARCH_PROBE_TIMEOUT)
        .json(&payload)
        .send()
        .await;
    match response {
        Ok(resp) => {
            let status = resp.status();
            let body = resp.json::<Value>().await.unwrap_or(Value::Null);
            if status.is_success() && body["success"] == true {
                let fsq = body["data"]["foursquare"]["count"].as_u64().unwrap_or(0);
                let google = body["data"]["google"]["count"].as_u64().unwrap_or(0);
                Check::new(
                    "search",
                    CheckStatus::Pass,
                    format!("{fsq} Foursquare + {google} Google results"),
                )
            } else {
                let error = body["error"].as_str().unwrap_or("no details");
                Check::new("search", CheckStatus::Fail, format!("HTTP {status}: {error}"))
            }
        }
        Err(e) if e.is_timeout() => Check::new("search", CheckStatus::Fail, "timed out"),
        Err(e) => Check::new("search", CheckStatus::Fail, e.without_url().to_string()),
    }
}
