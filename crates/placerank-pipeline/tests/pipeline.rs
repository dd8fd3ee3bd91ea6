//! End-to-end pipeline runs against in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use placerank_core::{
    distance_km, Coordinates, ContextDefaults, DirectorySearchParams, ErrorCode, LocalSearchParams,
    LocationInput, PlaceRecord, Provider, QueryAnalysis, RankedPlace, RankingResponse,
    SearchEnvelope, UserContext,
};
use placerank_llm::{RankingError, RankingOutcome};
use placerank_pipeline::{
    FetchDirectory, FetchLocal, PipelineError, PlaceSearch, PlanQuery, RankPlaces,
    ReverseGeocode, SearchRequest, ValidationError,
};
use placerank_providers::ProviderError;

/// Shared by every fake: a call counter and the last web-local `location`.
#[derive(Clone, Default)]
struct Calls {
    count: Arc<AtomicUsize>,
    local_location: Arc<Mutex<Option<String>>>,
}

impl Calls {
    fn hit(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn local_location(&self) -> Option<String> {
        self.local_location.lock().ok().and_then(|seen| seen.clone())
    }
}

struct FakePlanner {
    calls: Calls,
}

impl PlanQuery for FakePlanner {
    async fn plan_directory(&self, query: &str, ctx: &UserContext) -> DirectorySearchParams {
        self.calls.hit();
        DirectorySearchParams {
            ll: Some(ctx.ll.clone()),
            query: Some(query.to_string()),
            limit: Some(5),
            ..DirectorySearchParams::default()
        }
    }

    async fn plan_local(&self, query: &str, ctx: &UserContext) -> LocalSearchParams {
        self.calls.hit();
        LocalSearchParams {
            engine: LocalSearchParams::ENGINE.to_string(),
            q: query.to_string(),
            location: ctx.text_location.clone(),
            hl: "en".to_string(),
            gl: "in".to_string(),
            num: 10,
        }
    }
}

fn place(provider: Provider, id: &str, latitude: f64, longitude: f64) -> PlaceRecord {
    let mut record = PlaceRecord::new(provider);
    match provider {
        Provider::Foursquare => record.fsq_place_id = Some(id.to_string()),
        Provider::Google => record.google_place_id = Some(id.to_string()),
    }
    record.name = Some(format!("Cafe {id}"));
    record.latitude = Some(latitude);
    record.longitude = Some(longitude);
    record
}

struct FakeDirectory {
    calls: Calls,
    fail: bool,
}

impl FetchDirectory for FakeDirectory {
    async fn fetch_places(
        &self,
        _params: &DirectorySearchParams,
        origin: Option<Coordinates>,
    ) -> Result<Vec<PlaceRecord>, ProviderError> {
        self.calls.hit();
        if self.fail {
            return Err(ProviderError::UnexpectedStatus {
                status: 401,
                url: "http://directory/places/search".to_string(),
            });
        }
        Ok(["fsq-1", "fsq-2"]
            .iter()
            .map(|id| {
                let mut record = place(Provider::Foursquare, id, 28.6315, 77.2167);
                record.distance_km = distance_km(origin, record.latitude, record.longitude);
                record
            })
            .collect())
    }
}

struct FakeLocal {
    calls: Calls,
}

impl FetchLocal for FakeLocal {
    async fn search_local(
        &self,
        params: &LocalSearchParams,
        origin: Option<Coordinates>,
    ) -> Vec<PlaceRecord> {
        self.calls.hit();
        if let Ok(mut seen) = self.calls.local_location.lock() {
            *seen = params.location.clone();
        }
        (0..4)
            .map(|i| {
                let mut record =
                    place(Provider::Google, &format!("0x{i}:0x1"), 28.62 + f64::from(i) * 0.01, 77.21);
                record.distance_km = distance_km(origin, record.latitude, record.longitude);
                record
            })
            .collect()
    }
}

enum RankerReply {
    Ranked,
    NotJson,
}

struct FakeRanker {
    calls: Calls,
    reply: RankerReply,
}

impl RankPlaces for FakeRanker {
    async fn rank(&self, envelope: &SearchEnvelope) -> Result<RankingOutcome, RankingError> {
        self.calls.hit();
        match self.reply {
            RankerReply::NotJson => Err(RankingError::InvalidJson {
                message: "expected value at line 1 column 1".to_string(),
                raw_response: "Sure! Here are the places.".to_string(),
            }),
            RankerReply::Ranked => {
                let ranked_places = envelope
                    .foursquare
                    .results
                    .iter()
                    .chain(&envelope.google.results)
                    .zip(1_u32..)
                    .map(|(record, rank)| RankedPlace {
                        rank,
                        place_id: record.provider_id().map(ToOwned::to_owned),
                        google_place_id: record.google_place_id.clone(),
                        latitude: record.latitude,
                        longitude: record.longitude,
                        distance: record.distance_km,
                        name: record.name.clone().unwrap_or_default(),
                        address: None,
                        tel: None,
                        website: None,
                        rating: None,
                        review_count: None,
                        review_summary: "No review data available.".to_string(),
                        location_summary: String::new(),
                    })
                    .collect();
                Ok(RankingOutcome {
                    response: RankingResponse {
                        query_analysis: QueryAnalysis::default(),
                        ranked_places,
                    },
                    raw_response: "{}".to_string(),
                })
            }
        }
    }
}

struct FakeGeocoder {
    calls: Calls,
}

impl ReverseGeocode for FakeGeocoder {
    async fn reverse(&self, _coords: Coordinates) -> Option<String> {
        self.calls.hit();
        Some("New Delhi, Delhi".to_string())
    }
}

type FakeSearch = PlaceSearch<FakePlanner, FakeDirectory, FakeLocal, FakeRanker, FakeGeocoder>;

fn pipeline(calls: &Calls, directory_fails: bool, reply: RankerReply) -> FakeSearch {
    PlaceSearch::new(
        FakePlanner {
            calls: calls.clone(),
        },
        FakeDirectory {
            calls: calls.clone(),
            fail: directory_fails,
        },
        FakeLocal {
            calls: calls.clone(),
        },
        FakeRanker {
            calls: calls.clone(),
            reply,
        },
        FakeGeocoder {
            calls: calls.clone(),
        },
        ContextDefaults {
            ll: "28.6304,77.2177".to_string(),
            timezone: "UTC".to_string(),
        },
    )
}

fn delhi_request(query: &str) -> SearchRequest {
    SearchRequest::new(
        query,
        LocationInput {
            latitude: Some(28.6139),
            longitude: Some(77.2090),
            timezone: Some("Asia/Kolkata".to_string()),
            ..LocationInput::default()
        },
    )
}

#[tokio::test]
async fn coffee_shops_search_merges_both_providers() {
    let calls = Calls::default();
    let search = pipeline(&calls, false, RankerReply::Ranked);

    let envelope = search
        .search(&delhi_request("coffee shops"))
        .await
        .expect("search succeeds");

    assert_eq!(envelope.query, "coffee shops");
    assert_eq!(envelope.foursquare.count, 2);
    assert_eq!(envelope.google.count, 4);
    assert_eq!(envelope.foursquare.count, envelope.foursquare.results.len());
    assert_eq!(envelope.google.count, envelope.google.results.len());
    assert!(envelope
        .foursquare
        .results
        .iter()
        .all(|r| r.provider == Provider::Foursquare));
    assert!(envelope.google.results.iter().all(|r| r.provider == Provider::Google));
    assert_eq!(envelope.context.text_location.as_deref(), Some("New Delhi, Delhi"));
    assert_eq!(envelope.context.timezone, "Asia/Kolkata");
    assert!(envelope
        .foursquare
        .results
        .iter()
        .chain(&envelope.google.results)
        .all(|r| r.distance_km.is_some_and(|d| d >= 0.0)));
}

#[tokio::test]
async fn reverse_geocoded_label_anchors_local_search() {
    let calls = Calls::default();
    let search = pipeline(&calls, false, RankerReply::Ranked);
    search
        .search(&delhi_request("coffee"))
        .await
        .expect("search succeeds");

    assert_eq!(calls.local_location().as_deref(), Some("New Delhi, Delhi"));
}

#[tokio::test]
async fn search_and_rank_returns_contiguous_ranks() {
    let calls = Calls::default();
    let search = pipeline(&calls, false, RankerReply::Ranked);

    let ranked = search
        .search_and_rank(&delhi_request("coffee shops"))
        .await
        .expect("ranking succeeds");

    let ranks: Vec<u32> = ranked
        .ranking
        .response
        .ranked_places
        .iter()
        .map(|p| p.rank)
        .collect();
    assert_eq!(ranks, (1..=6).collect::<Vec<_>>());
}

#[tokio::test]
async fn non_json_ranking_reports_ranking_error_with_summary() {
    let calls = Calls::default();
    let search = pipeline(&calls, false, RankerReply::NotJson);

    let err = search
        .search_and_rank(&delhi_request("coffee shops"))
        .await
        .expect_err("ranking fails");

    assert_eq!(err.error_code(), ErrorCode::RankingError);
    assert_eq!(err.stage(), "ranking");
    assert!(err.to_string().contains("Invalid JSON response from AI"));
    let PipelineError::Ranking { source, summary } = err else {
        panic!("expected a ranking error");
    };
    assert_eq!(source.raw_response(), Some("Sure! Here are the places."));
    assert_eq!(summary.query, "coffee shops");
    assert_eq!(summary.foursquare_count, 2);
    assert_eq!(summary.google_count, 4);
}

#[tokio::test]
async fn directory_failure_is_a_search_error_and_skips_the_rest() {
    let calls = Calls::default();
    let search = pipeline(&calls, true, RankerReply::Ranked);

    let err = search
        .search_and_rank(&delhi_request("coffee"))
        .await
        .expect_err("directory fails");

    assert_eq!(err.error_code(), ErrorCode::SearchError);
    // geocoder + directory plan + directory fetch; no local search, no ranking
    assert_eq!(calls.count(), 3);
}

#[tokio::test]
async fn validation_fails_before_any_call() {
    let calls = Calls::default();
    let search = pipeline(&calls, false, RankerReply::Ranked);

    let cases = [
        (
            SearchRequest {
                query: Some("  ".to_string()),
                location: None,
            },
            ValidationError::MissingQuery,
        ),
        (
            SearchRequest {
                query: Some("coffee".to_string()),
                location: None,
            },
            ValidationError::MissingLocation,
        ),
    ];
    for (request, expected) in cases {
        let err = search.search_and_rank(&request).await.expect_err("invalid");
        assert!(matches!(err, PipelineError::Validation(ref e) if *e == expected));
    }

    let out_of_range = SearchRequest::new(
        "coffee",
        LocationInput {
            latitude: Some(123.0),
            longitude: Some(77.0),
            ..LocationInput::default()
        },
    );
    let err = search.search(&out_of_range).await.expect_err("invalid");
    assert_eq!(err.error_code(), ErrorCode::InvalidCoordinates);

    assert_eq!(calls.count(), 0);
}
