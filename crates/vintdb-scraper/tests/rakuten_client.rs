//! Integration tests for `RakutenClient` against a local `wiremock` server.
//!
//! Covers paging (single, multi, capped, empty) and each upstream failure
//! the client surfaces.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vintdb_core::QueryConfig;
use vintdb_scraper::{RakutenClient, ScraperError};

const KEYWORD: &str = "リーバイス ヴィンテージ パンツ デニム";

/// No retries, no backoff.
fn test_client(server: &MockServer) -> RakutenClient {
    test_client_with_retries(server, 0)
}

fn test_client_with_retries(server: &MockServer, max_retries: u32) -> RakutenClient {
    RakutenClient::with_base_url(
        "test-app-id",
        None,
        5,
        "vintdb-test/0.1",
        max_retries,
        0,
        &format!("{}/search", server.uri()),
    )
    .expect("failed to build test RakutenClient")
}

fn query() -> QueryConfig {
    QueryConfig {
        keyword: KEYWORD.to_owned(),
        min_price: 100,
    }
}

fn listing(code: &str) -> serde_json::Value {
    json!({
        "itemCode": code,
        "itemName": "リーバイス 501 パンツ",
        "itemPrice": 10000,
        "itemCaption": "W32",
        "affiliateUrl": "",
        "mediumImageUrls": []
    })
}

fn page_body(page: u32, page_count: u32, codes: &[&str]) -> serde_json::Value {
    json!({
        "count": page_count * 30,
        "page": page,
        "pageCount": page_count,
        "hits": codes.len(),
        "Items": codes.iter().map(|c| listing(c)).collect::<Vec<_>>()
    })
}

// ---------------------------------------------------------------------------
// request shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_page_sends_expected_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("applicationId", "test-app-id"))
        .and(query_param("formatVersion", "2"))
        .and(query_param("sort", "-itemPrice"))
        .and(query_param("minPrice", "100"))
        .and(query_param("hits", "30"))
        .and(query_param("page", "1"))
        .and(query_param("keyword", KEYWORD))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 1, &["a:1"])))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server).fetch_page(&query(), 1).await.unwrap();
    assert_eq!(response.page_count, 1);
    assert_eq!(response.items.len(), 1);
}

// ---------------------------------------------------------------------------
// paging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_all_walks_every_reported_page_in_order() {
    let server = MockServer::start().await;

    for (page, codes) in [(1u32, ["a:1", "a:2"]), (2, ["a:3", "a:4"]), (3, ["a:5", "a:6"])] {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(page, 3, &codes)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let items = test_client(&server).fetch_all(&query(), 0).await.unwrap();
    let codes: Vec<&str> = items
        .iter()
        .map(|v| v["itemCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["a:1", "a:2", "a:3", "a:4", "a:5", "a:6"]);
}

#[tokio::test]
async fn fetch_all_returns_empty_when_no_hits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 0, "page": 1, "pageCount": 0, "hits": 0, "Items": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = test_client(&server).fetch_all(&query(), 0).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn fetch_all_stops_on_empty_page_before_page_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 5, &["a:1"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(2, 5, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let items = test_client(&server).fetch_all(&query(), 0).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn fetch_all_caps_at_one_hundred_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 250, &["a:1"])))
        .expect(100)
        .mount(&server)
        .await;

    let items = test_client(&server).fetch_all(&query(), 0).await.unwrap();
    assert_eq!(items.len(), 100);
}

#[tokio::test]
async fn fetch_all_discards_partial_results_on_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 2, &["a:1"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = test_client(&server).fetch_all(&query(), 0).await;
    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 503, .. })),
        "got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_error_body_is_surfaced_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "wrong_parameter",
            "error_description": "keyword parameter is not valid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(&server, 3)
        .fetch_page(&query(), 1)
        .await
        .unwrap_err();
    match err {
        ScraperError::Api {
            status,
            error,
            description,
        } => {
            assert_eq!(status, 400);
            assert_eq!(error, "wrong_parameter");
            assert_eq!(description, "keyword parameter is not valid");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_client_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_page(&query(), 1).await.unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 404, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn unexpected_status_url_omits_application_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_page(&query(), 1).await.unwrap_err();
    assert!(!err.to_string().contains("test-app-id"), "leaked: {err}");
}

#[tokio::test]
async fn rate_limited_is_reported_after_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_json(json!({"error": "too_many_requests"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = test_client_with_retries(&server, 2)
        .fetch_page(&query(), 1)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::RateLimited { retry_after_secs: 7 }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 1, &["a:1"])))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client_with_retries(&server, 1)
        .fetch_page(&query(), 1)
        .await
        .unwrap();
    assert_eq!(response.items.len(), 1);
}

#[tokio::test]
async fn malformed_success_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_page(&query(), 1).await.unwrap_err();
    assert!(
        matches!(err, ScraperError::Deserialize { .. }),
        "got: {err:?}"
    );
}
