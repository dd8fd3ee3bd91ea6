//! Provider-agnostic place records and the envelopes that carry them
//! between search, ranking, and the HTTP layer.

use serde::{Deserialize, Serialize};

use crate::context::UserContext;

/// Which upstream produced a [`PlaceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Foursquare,
    Google,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Foursquare => write!(f, "foursquare"),
            Provider::Google => write!(f, "google"),
        }
    }
}

/// A recent review attached to a web-local record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSnippet {
    pub rating: Option<f64>,
    /// Human-readable date as shown by the provider (e.g. "2 weeks ago").
    pub date: Option<String>,
    pub iso_date: Option<String>,
    pub snippet: Option<String>,
    pub user: Option<String>,
    pub source: Option<String>,
}

/// Unified place record produced by either provider.
///
/// `distance_km` is always serialized (as `null` when unknown) so consumers
/// can tell "not computed" apart from "field missing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsq_place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_reviews: Option<Vec<ReviewSnippet>>,
}

impl PlaceRecord {
    /// An empty record for `provider`; callers fill in what the payload has.
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            fsq_place_id: None,
            google_place_id: None,
            name: None,
            address: None,
            latitude: None,
            longitude: None,
            categories: None,
            chain: None,
            rating: None,
            reviews_count: None,
            price: None,
            tel: None,
            website: None,
            distance_km: None,
            recent_reviews: None,
        }
    }

    /// The provider-scoped identifier, whichever provider produced the record.
    #[must_use]
    pub fn provider_id(&self) -> Option<&str> {
        match self.provider {
            Provider::Foursquare => self.fsq_place_id.as_deref(),
            Provider::Google => self.google_place_id.as_deref(),
        }
    }
}

/// Results from one provider. `count` always equals `results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProviderResults")]
pub struct ProviderResults {
    pub count: usize,
    pub results: Vec<PlaceRecord>,
}

#[derive(Deserialize)]
struct RawProviderResults {
    #[serde(default)]
    results: Vec<PlaceRecord>,
}

impl From<RawProviderResults> for ProviderResults {
    fn from(raw: RawProviderResults) -> Self {
        Self::new(raw.results)
    }
}

impl ProviderResults {
    #[must_use]
    pub fn new(results: Vec<PlaceRecord>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Per-provider search output: the request context, the query, and the records.
/// `count` always equals `results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub context: UserContext,
    pub query: String,
    pub count: usize,
    pub results: Vec<PlaceRecord>,
}

impl SearchResult {
    #[must_use]
    pub fn new(context: UserContext, query: impl Into<String>, results: Vec<PlaceRecord>) -> Self {
        Self {
            context,
            query: query.into(),
            count: results.len(),
            results,
        }
    }

    #[must_use]
    pub fn into_provider_results(self) -> ProviderResults {
        ProviderResults::new(self.results)
    }
}

/// The merged payload handed to the ranker.
///
/// On input the list a record sits under decides its provider, so saved
/// results without per-record `provider` tags still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchEnvelope")]
pub struct SearchEnvelope {
    pub query: String,
    pub context: UserContext,
    pub foursquare: ProviderResults,
    pub google: ProviderResults,
}

#[derive(Deserialize)]
struct RawSearchEnvelope {
    query: String,
    context: UserContext,
    #[serde(default)]
    foursquare: RawProviderList,
    #[serde(default)]
    google: RawProviderList,
}

#[derive(Default, Deserialize)]
struct RawProviderList {
    #[serde(default)]
    results: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl RawProviderList {
    fn tagged(self, provider: Provider) -> Result<ProviderResults, serde_json::Error> {
        let tag = serde_json::to_value(provider)?;
        let results = self
            .results
            .into_iter()
            .map(|mut record| {
                record.insert("provider".to_string(), tag.clone());
                serde_json::from_value(serde_json::Value::Object(record))
            })
            .collect::<Result<Vec<PlaceRecord>, _>>()?;
        Ok(ProviderResults::new(results))
    }
}

impl TryFrom<RawSearchEnvelope> for SearchEnvelope {
    type Error = serde_json::Error;

    fn try_from(raw: RawSearchEnvelope) -> Result<Self, Self::Error> {
        Ok(Self {
            query: raw.query,
            context: raw.context,
            foursquare: raw.foursquare.tagged(Provider::Foursquare)?,
            google: raw.google.tagged(Provider::Google)?,
        })
    }
}

impl SearchEnvelope {
    /// Merges the two per-provider outputs of one request. Query and context
    /// are taken from the directory result.
    #[must_use]
    pub fn from_results(foursquare: SearchResult, google: SearchResult) -> Self {
        Self {
            query: foursquare.query.clone(),
            context: foursquare.context.clone(),
            foursquare: foursquare.into_provider_results(),
            google: google.into_provider_results(),
        }
    }

    /// Looks up the input record a ranked place refers to, by either id.
    #[must_use]
    pub fn find_record(
        &self,
        place_id: Option<&str>,
        google_place_id: Option<&str>,
    ) -> Option<&PlaceRecord> {
        let all = self
            .foursquare
            .results
            .iter()
            .chain(self.google.results.iter());
        for record in all {
            let fsq = record.fsq_place_id.as_deref();
            let google = record.google_place_id.as_deref();
            let matches_place = place_id.is_some() && (fsq == place_id || google == place_id);
            let matches_google = google_place_id.is_some() && google == google_place_id;
            if matches_place || matches_google {
                return Some(record);
            }
        }
        None
    }
}

/// The ranker's reading of the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    #[serde(default)]
    pub interpreted_intent: String,
    #[serde(default)]
    pub context_used: String,
    #[serde(default)]
    pub needs_inferred: Vec<String>,
    #[serde(default)]
    pub not_wanted_inferred: Vec<String>,
    #[serde(default)]
    pub ranking_approach: String,
}

/// One entry of the ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlace {
    pub rank: u32,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub google_place_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u64>,
    #[serde(default)]
    pub review_summary: String,
    #[serde(default)]
    pub location_summary: String,
}

/// The full ranker output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    #[serde(default)]
    pub query_analysis: QueryAnalysis,
    #[serde(default)]
    pub ranked_places: Vec<RankedPlace>,
}
