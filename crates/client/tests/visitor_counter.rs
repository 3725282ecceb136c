//! Integration tests for VisitorCounter against a mock PostgREST endpoint.

use std::time::Duration;

use kiteshell_client::{StoreClient, StoreConfig, StoreError, VisitorCount, VisitorCounter};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE: &str = "/rest/v1/visitor_count";

fn create_test_counter(mock_server: &MockServer) -> VisitorCounter {
    let store = StoreClient::new(StoreConfig {
        base_url: mock_server.uri(),
        api_key: "anon-key".into(),
        timeout: Duration::from_secs(5),
        user_agent: "kiteshell-test".into(),
    })
    .expect("failed to create client");
    VisitorCounter::new(store)
}

#[tokio::test]
async fn test_track_seeds_empty_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(TABLE))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([{ "count": 1 }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 1, "count": 1 }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let counter = create_test_counter(&mock_server);
    let tracked = counter.track().await.expect("track failed");

    assert_eq!(tracked, VisitorCount { id: 1, count: 1 });
}

#[tokio::test]
async fn test_track_increments_existing_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 5, "count": 41 }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(TABLE))
        .and(query_param("id", "eq.5"))
        .and(body_json(json!({ "count": 42 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 5, "count": 42 }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let counter = create_test_counter(&mock_server);
    let tracked = counter.track().await.expect("track failed");

    assert_eq!(tracked.count, 42);
}

#[tokio::test]
async fn test_track_row_deleted_mid_update_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 5, "count": 41 }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(TABLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let counter = create_test_counter(&mock_server);
    let result = counter.track().await;

    assert!(matches!(result, Err(StoreError::NotFound(5))), "got {result:?}");
}

#[tokio::test]
async fn test_current_reads_without_writing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 5, "count": 41 }])))
        .mount(&mock_server)
        .await;

    let counter = create_test_counter(&mock_server);
    let current = counter.current().await.expect("read failed");

    assert_eq!(current, Some(VisitorCount { id: 5, count: 41 }));
    let requests = mock_server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
}
