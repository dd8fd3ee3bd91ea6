//! Provider-specific structured search parameters produced by query planning.

use serde::{Deserialize, Serialize};

/// Upper bound on directory results requested per search.
pub const DIRECTORY_RESULT_CAP: u32 = 5;

/// Bounds on the web-local `num` parameter.
pub const LOCAL_NUM_MIN: u32 = 1;
pub const LOCAL_NUM_MAX: u32 = 20;
pub const LOCAL_NUM_DEFAULT: u32 = 10;

/// Query parameters for the directory provider's `places/search` endpoint.
///
/// Every field is optional; `None` fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ll: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

impl DirectorySearchParams {
    /// Flattens the set fields into `(name, value)` query pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                pairs.push((name, v));
            }
        };
        push("ll", self.ll.clone());
        push("near", self.near.clone());
        push("radius", self.radius.map(|r| r.to_string()));
        push("query", self.query.clone());
        push("categories", self.categories.clone());
        push("chains", self.chains.clone());
        push("open_now", self.open_now.map(|b| b.to_string()));
        push("open_at", self.open_at.clone());
        push("min_price", self.min_price.map(|p| p.to_string()));
        push("max_price", self.max_price.map(|p| p.to_string()));
        push("sort", self.sort.clone());
        push("limit", self.limit.map(|l| l.to_string()));
        push("fields", self.fields.clone());
        pairs
    }
}

/// Query parameters for the web-local provider's `google_local` engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSearchParams {
    pub engine: String,
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub hl: String,
    pub gl: String,
    pub num: u32,
}

impl LocalSearchParams {
    pub const ENGINE: &'static str = "google_local";
}
