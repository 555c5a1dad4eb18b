//! Integration tests for SearchFetcher using wiremock
//!
//! These tests validate the continuous-request policy against mock servers:
//! fault-driven retry with backoff, immediate aborts, and request building.

use gale::crawler::fetcher::SearchFetcher;
use gale::utils::error::FetchError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/search/v2/articlesearch.json";

fn fault_body() -> serde_json::Value {
    json!({
        "fault": {
            "faultstring": "Rate limit quota violation. Quota limit exceeded.",
            "detail": {"errorcode": "policies.ratelimit.QuotaViolation"}
        }
    })
}

fn page_body(docs: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "status": "OK",
        "response": {"docs": docs}
    })
}

/// Build a fetcher against a mock server with a millisecond backoff
fn test_fetcher(server: &MockServer, retry_limit: u32) -> SearchFetcher {
    SearchFetcher::with_config_and_base_url(
        &server.uri(),
        "test-key",
        600,
        retry_limit,
        Duration::from_millis(2),
        Duration::from_secs(5),
    )
    .unwrap()
}

/// Test successful fetch returns the document list
#[tokio::test]
async fn test_fetch_page_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![json!({
            "_id": "nyt://article/84e7a531-986a-5293-b7a7-c343466738a0",
            "snippet": "some snippet"
        })])))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&mock_server, 10);
    let docs = fetcher.fetch_page("House", 0).await.unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(
        docs[0].id.as_deref(),
        Some("nyt://article/84e7a531-986a-5293-b7a7-c343466738a0")
    );
    assert_eq!(docs[0].snippet.as_deref(), Some("some snippet"));
}

/// Test that the query, page, and api-key parameters are sent
#[tokio::test]
async fn test_search_request_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "White House"))
        .and(query_param("page", "3"))
        .and(query_param("api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&mock_server, 10);
    let docs = fetcher.fetch_page("White House", 3).await.unwrap();

    assert!(docs.is_empty());
}

/// Test fault responses are retried until the provider recovers
#[tokio::test]
async fn test_fault_then_success() {
    let mock_server = MockServer::start().await;

    // Reject twice, then succeed
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(fault_body()))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![json!({
            "_id": "nyt://article/abc",
            "snippet": "text"
        })])))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&mock_server, 10);
    let docs = fetcher.fetch_page("House", 0).await.unwrap();

    assert_eq!(docs.len(), 1);
}

/// Test the retry budget: a persistent fault aborts after retry_limit sleeps
#[tokio::test]
async fn test_retry_budget_exhausted() {
    let mock_server = MockServer::start().await;

    // retry_limit = 2 means 3 attempts total before aborting
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(fault_body()))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&mock_server, 2);
    let result = fetcher.fetch_page("House", 0).await;

    match result {
        Err(FetchError::RetryBudgetExhausted { retries }) => assert_eq!(retries, 2),
        other => panic!("Expected retry budget exhaustion, got {other:?}"),
    }
}

/// Test a non-OK status aborts immediately with no retry
#[tokio::test]
async fn test_unexpected_status_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ERROR", "errors": []})),
        )
        .expect(1) // Should only be called once (no retry)
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&mock_server, 10);
    let result = fetcher.fetch_page("House", 0).await;

    match result {
        Err(FetchError::UnexpectedStatus(status)) => assert_eq!(status, "ERROR"),
        other => panic!("Expected unexpected status, got {other:?}"),
    }
}

/// Test a body that is not JSON aborts as a transport-level failure
#[tokio::test]
async fn test_undecodable_body_aborts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&mock_server, 10);
    let result = fetcher.fetch_page("House", 0).await;

    assert!(matches!(result, Err(FetchError::Http(_))));
}

/// Test connection failures abort the page chain immediately
#[tokio::test]
async fn test_connection_refused_aborts() {
    // Nothing is listening on this port
    let fetcher = SearchFetcher::with_config_and_base_url(
        "http://127.0.0.1:1",
        "test-key",
        600,
        10,
        Duration::from_millis(2),
        Duration::from_secs(2),
    )
    .unwrap();

    let result = fetcher.fetch_page("House", 0).await;
    assert!(matches!(result, Err(FetchError::Http(_))));
}

/// Test a fault body on an error status code is still classified as a fault
#[tokio::test]
async fn test_fault_classification_ignores_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(fault_body()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&mock_server, 10);
    let result = fetcher.fetch_page("House", 0).await;

    assert!(result.is_ok(), "fault should be retried, then succeed");
}
