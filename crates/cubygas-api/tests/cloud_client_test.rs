#![allow(clippy::unwrap_used)]
// Integration tests for `CloudClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cubygas_api::{CloudClient, Error, ReadingResponse};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CloudClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api/v2", server.uri())).unwrap();
    let client = CloudClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

// ── URL construction ────────────────────────────────────────────────

#[test]
fn test_endpoint_urls() {
    let client = CloudClient::with_client(
        reqwest::Client::new(),
        Url::parse("https://cuby.cloud/api/v2/").unwrap(),
    );

    assert_eq!(
        client.token_url("me@example.com").unwrap().as_str(),
        "https://cuby.cloud/api/v2/token/me@example.com"
    );
    assert_eq!(
        client.reading_url("AB 12").unwrap().as_str(),
        "https://cuby.cloud/api/v2/history/gas/level/AB%2012"
    );
}

#[test]
fn test_cannot_be_a_base_url_is_rejected() {
    let client =
        CloudClient::with_client(reqwest::Client::new(), Url::parse("mailto:x@y").unwrap());
    assert!(matches!(
        client.token_url("a"),
        Err(Error::InvalidBaseUrl(_))
    ));
}

// ── Token tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_token_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/token/user@example.com"))
        .and(body_json(json!({ "password": "hunter2", "expiration": 3600 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tkn", "expiration": 3600 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = client
        .request_token("user@example.com", &secret("hunter2"), 3600)
        .await
        .unwrap();

    assert_eq!(token.token.as_deref(), Some("tkn"));
    assert_eq!(token.expiration, Some(3600.0));
}

#[tokio::test]
async fn test_request_token_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad password"))
        .mount(&server)
        .await;

    let result = client.request_token("user@example.com", &secret("x"), 3600).await;

    let err = result.unwrap_err();
    assert!(err.is_auth_failure(), "expected auth failure, got: {err:?}");
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Token request failed: 401 - bad password");
}

#[tokio::test]
async fn test_request_token_missing_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expiration": 3600 })))
        .mount(&server)
        .await;

    let result = client.request_token("user@example.com", &secret("x"), 3600).await;
    assert!(
        matches!(result, Err(Error::MissingToken)),
        "expected MissingToken, got: {result:?}"
    );
}

#[tokio::test]
async fn test_request_token_empty_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "" })))
        .mount(&server)
        .await;

    let result = client.request_token("user@example.com", &secret("x"), 3600).await;
    assert!(matches!(result, Err(Error::MissingToken)));
}

#[tokio::test]
async fn test_request_token_timeout() {
    let (server, client) = setup().await;
    let client = client.timeout(Duration::from_millis(200));

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client.request_token("user@example.com", &secret("x"), 3600).await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "expected Timeout, got: {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_request_token_connection_refused() {
    // Grab a free port and release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}/api/v2")).unwrap();

    let client = CloudClient::with_client(reqwest::Client::new(), base_url);
    let result = client.request_token("user@example.com", &secret("x"), 3600).await;

    let err = result.unwrap_err();
    assert!(
        matches!(err, Error::Transport(_)),
        "expected Transport error, got: {err:?}"
    );
    assert_eq!(err.status(), None);
    assert!(err.is_transient());
}

// ── Reading tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_reading_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/history/gas/level/A1"))
        .and(query_param("token", "tkn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "level": 72.5,
            "timestamp": "2024-01-01T00:00:00Z",
            "unit": "%"
        })))
        .mount(&server)
        .await;

    let reading = client.fetch_reading("A1", &secret("tkn")).await.unwrap();

    assert_eq!(
        reading,
        ReadingResponse {
            level: Some(72.5),
            timestamp: Some("2024-01-01T00:00:00Z".into()),
        }
    );
}

#[tokio::test]
async fn test_fetch_reading_missing_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let reading = client.fetch_reading("A1", &secret("tkn")).await.unwrap();
    assert_eq!(reading, ReadingResponse::default());
}

#[tokio::test]
async fn test_fetch_reading_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.fetch_reading("B2", &secret("tkn")).await;
    assert_eq!(result.as_ref().err().and_then(Error::status), Some(500));
    match result {
        Err(Error::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_reading_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let result = client.fetch_reading("A1", &secret("tkn")).await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>nope</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
