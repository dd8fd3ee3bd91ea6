//! Integration tests for `SerpApiClient`: the location ladder and review enrichment.

use std::time::Duration;

use placerank_core::{Coordinates, HttpOptions, LocalSearchParams, PlaceRecord, Provider};
use placerank_providers::SerpApiClient;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: Coordinates = Coordinates {
    latitude: 28.6139,
    longitude: 77.2090,
};

fn test_client(base_url: &str) -> SerpApiClient {
    SerpApiClient::with_base_url("serp-key", &HttpOptions::default(), base_url)
        .expect("client construction should not fail")
}

fn params(location: Option<&str>) -> LocalSearchParams {
    LocalSearchParams {
        engine: LocalSearchParams::ENGINE.to_string(),
        q: "coffee shops".to_string(),
        location: location.map(ToOwned::to_owned),
        hl: "en".to_string(),
        gl: "in".to_string(),
        num: 10,
    }
}

fn local_payload(count: usize) -> serde_json::Value {
    let items: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "title": format!("Cafe {i}"),
                "address": "Connaught Place, New Delhi",
                "data_id": format!("0x{i:x}:0x1"),
                "gps_coordinates": { "latitude": 28.63, "longitude": 77.21 },
                "rating": 4.5,
                "reviews": 120
            })
        })
        .collect();
    serde_json::json!({ "local_results": items })
}

fn reviews_payload(count: usize) -> serde_json::Value {
    let reviews: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "rating": 5,
                "date": "a week ago",
                "snippet": format!("Review {i}"),
                "user": { "name": format!("User {i}") },
                "source": "Google"
            })
        })
        .collect();
    serde_json::json!({ "reviews": reviews })
}

async fn mount_reviews(server: &MockServer, count: usize) {
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps_reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_payload(count)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn aggressive_retry_recovers_from_parameter_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_local"))
        .and(query_param("location", "Delhi, Delhi"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Unsupported `location` parameter."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_local"))
        .and(query_param("location", "Delhi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(local_payload(3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_local"))
        .and(query_param_is_missing("location"))
        .respond_with(ResponseTemplate::new(200).set_body_json(local_payload(1)))
        .expect(0)
        .mount(&server)
        .await;
    mount_reviews(&server, 2).await;

    let records = test_client(&server.uri())
        .search_local(
            &params(Some("Delhi Municipal Corporation, Delhi, India")),
            Some(ORIGIN),
        )
        .await;

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.provider == Provider::Google));
    assert!(records.iter().all(|r| r.distance_km.is_some_and(|d| d >= 0.0)));
    assert!(records
        .iter()
        .all(|r| r.recent_reviews.as_ref().is_some_and(|v| v.len() == 2)));
}

#[tokio::test]
async fn repeated_rejection_makes_at_most_three_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_local"))
        .respond_with(ResponseTemplate::new(400))
        .expect(3)
        .mount(&server)
        .await;

    let records = test_client(&server.uri())
        .search_local(&params(Some("Connaught Place, New Delhi, India")), Some(ORIGIN))
        .await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn server_error_does_not_escalate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_local"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let records = test_client(&server.uri())
        .search_local(&params(Some("New Delhi, Delhi")), Some(ORIGIN))
        .await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn timeout_does_not_escalate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_local"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(local_payload(1))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let options = HttpOptions {
        timeout_secs: 1,
        ..HttpOptions::default()
    };
    let client = SerpApiClient::with_base_url("serp-key", &options, &server.uri())
        .expect("client construction should not fail");
    let records = client
        .search_local(&params(Some("New Delhi, Delhi")), Some(ORIGIN))
        .await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn results_are_capped_at_seven_with_at_most_three_reviews() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_local"))
        .and(query_param("api_key", "serp-key"))
        .and(query_param("hl", "en"))
        .and(query_param("gl", "in"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(local_payload(10)))
        .expect(1)
        .mount(&server)
        .await;
    mount_reviews(&server, 6).await;

    let records = test_client(&server.uri())
        .search_local(&params(None), None)
        .await;
    assert_eq!(records.len(), 7);
    for record in &records {
        assert!(record.distance_km.is_none());
        let reviews = record.recent_reviews.as_ref().expect("reviews attached");
        assert_eq!(reviews.len(), 3);
    }
}

#[tokio::test]
async fn empty_listing_triggers_one_reresolution() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps_reviews"))
        .and(query_param("data_id", "0xdead:0xbeef"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "reviews": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps"))
        .and(query_param("q", "Blue Tokai Connaught Place"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "place_results": { "place_id": "ChIJresolved" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps_reviews"))
        .and(query_param("place_id", "ChIJresolved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "reviews": [{
                "rating": 4,
                "snippet": "fallback text",
                "extracted_snippet": { "original": "Lovely pour-over" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut record = PlaceRecord::new(Provider::Google);
    record.google_place_id = Some("0xdead:0xbeef".to_string());
    record.name = Some("Blue Tokai".to_string());
    record.address = Some("Connaught Place".to_string());

    let reviews = test_client(&server.uri()).fetch_reviews(&record, "en").await;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].snippet.as_deref(), Some("Lovely pour-over"));
}

#[tokio::test]
async fn record_without_id_resolves_through_local_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "local_results": [
                { "title": "no ids here" },
                { "title": "Perch", "data_id": "0xabc:0xdef" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps_reviews"))
        .and(query_param("data_id", "0xabc:0xdef"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_payload(2)))
        .expect(1)
        .mount(&server)
        .await;

    let mut record = PlaceRecord::new(Provider::Google);
    record.name = Some("Perch".to_string());

    let reviews = test_client(&server.uri()).fetch_reviews(&record, "en").await;
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[1].user.as_deref(), Some("User 1"));
}

#[tokio::test]
async fn unresolvable_record_gets_no_reviews_without_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_maps_reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_payload(3)))
        .expect(0)
        .mount(&server)
        .await;

    let mut record = PlaceRecord::new(Provider::Google);
    record.name = Some("Nameless Cafe".to_string());

    let reviews = test_client(&server.uri()).fetch_reviews(&record, "en").await;
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn record_with_no_name_address_or_id_makes_no_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let record = PlaceRecord::new(Provider::Google);
    let reviews = test_client(&server.uri()).fetch_reviews(&record, "en").await;
    assert!(reviews.is_empty());
}
