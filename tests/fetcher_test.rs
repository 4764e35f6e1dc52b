//! Integration tests for CloudflareFetcher using wiremock
//!
//! These tests validate the page fetcher's behavior with mock servers.

mod common;

use common::{fetcher_for, mount_page, zones_body, TEST_TOKEN};
use std::time::Duration;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonedir::directory::{CloudflareFetcher, ZonePageFetcher};
use zonedir::models::RawZone;
use zonedir::utils::error::FetchError;

/// Request carries the pagination parameters and bearer credential
#[tokio::test]
async fn test_fetch_page_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("match", "all"))
        .and(query_param("per_page", "50"))
        .and(query_param("page", "2"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(zones_body(&[("a.com", "active"), ("b.com", "pending")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server);
    let page = fetcher.fetch_page(2).await.unwrap();

    assert!(page.had_success);
    assert_eq!(page.page, 2);
    assert_eq!(
        page.records,
        vec![RawZone::new("a.com", "active"), RawZone::new("b.com", "pending")]
    );
}

/// Non-2xx status is reported as a Status error
#[tokio::test]
async fn test_fetch_page_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = fetcher_for(&mock_server).fetch_page(1).await;
    assert!(matches!(result, Err(FetchError::Status(500))));
}

/// Auth failures come back as 4xx
#[tokio::test]
async fn test_fetch_page_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "success": false,
            "errors": [{"code": 9109, "message": "Invalid access token"}],
            "result": null
        })))
        .mount(&mock_server)
        .await;

    let result = fetcher_for(&mock_server).fetch_page(1).await;
    assert!(matches!(result, Err(FetchError::Status(403))));
}

/// 2xx with an unparseable body is a protocol error
#[tokio::test]
async fn test_fetch_page_malformed_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let result = fetcher_for(&mock_server).fetch_page(1).await;
    assert!(matches!(result, Err(FetchError::Protocol(_))));
}

/// `success: false` in a 2xx payload is reported on the page, not as Err
#[tokio::test]
async fn test_fetch_page_unsuccessful_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "errors": [{"code": 1000, "message": "Temporary failure"}],
            "messages": [],
            "result": []
        })))
        .mount(&mock_server)
        .await;

    let page = fetcher_for(&mock_server).fetch_page(1).await.unwrap();
    assert!(!page.had_success);
    assert!(page.is_empty());
    assert_eq!(page.errors, vec!["1000: Temporary failure".to_string()]);
}

/// String-valued messages and errors do not fail the page
#[tokio::test]
async fn test_fetch_page_string_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "errors": [],
            "messages": ["Zones listed"],
            "result": [{"name": "a.com", "status": "pending"}]
        })))
        .mount(&mock_server)
        .await;

    let page = fetcher_for(&mock_server).fetch_page(1).await.unwrap();
    assert!(page.had_success);
    assert_eq!(page.records, vec![RawZone::new("a.com", "pending")]);

    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "errors": ["Rate limited"],
            "messages": [],
            "result": null
        })))
        .mount(&mock_server)
        .await;

    let page = fetcher_for(&mock_server).fetch_page(1).await.unwrap();
    assert!(!page.had_success);
    assert_eq!(page.errors, vec!["Rate limited".to_string()]);
}

/// Slow responses hit the request timeout
#[tokio::test]
async fn test_fetch_page_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(zones_body(&[("a.com", "active")]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = CloudflareFetcher::with_config(
        &mock_server.uri(),
        TEST_TOKEN,
        50,
        Duration::from_millis(200),
    )
    .unwrap();

    let result = fetcher.fetch_page(1).await;
    assert!(matches!(result, Err(FetchError::Timeout)));
}

/// Empty result list is a successful, empty page
#[tokio::test]
async fn test_fetch_page_empty() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 4, &[]).await;

    let page = fetcher_for(&mock_server).fetch_page(4).await.unwrap();
    assert!(page.had_success);
    assert!(page.is_empty());
}

/// Unreachable endpoint is a transport error
#[tokio::test]
async fn test_fetch_page_connection_refused() {
    let fetcher =
        CloudflareFetcher::with_config("http://127.0.0.1:1", TEST_TOKEN, 50, Duration::from_secs(2))
            .unwrap();

    let result = fetcher.fetch_page(1).await;
    assert!(matches!(
        result,
        Err(FetchError::Transport(_)) | Err(FetchError::Timeout)
    ));
}
