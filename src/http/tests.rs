//! Tests for the HTTP transport

use super::client::{decode_envelope, retry_after_seconds};
use super::*;
use crate::config::{BackoffConfig, BackoffType, ClientConfig, RateLimitConfig};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{ResponseEnvelope, StringMap};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig {
        base_url: base_url.to_string(),
        bearer_token: Some("test-token".to_string()),
        ..ClientConfig::default()
    };
    config.http.rate_limit = RateLimitConfig {
        enabled: false,
        ..RateLimitConfig::default()
    };
    config
}

fn params(pairs: &[(&str, &str)]) -> StringMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_calculate_backoff() {
    let mut config = ClientConfig::default();
    config.http.retry_backoff = BackoffConfig {
        backoff_type: BackoffType::Exponential,
        initial_ms: 100,
        max_ms: 1000,
    };
    let transport = HttpTransport::new(config.clone()).unwrap();
    assert_eq!(transport.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(transport.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(transport.calculate_backoff(10), Duration::from_millis(1000));

    config.http.retry_backoff.backoff_type = BackoffType::Linear;
    let transport = HttpTransport::new(config.clone()).unwrap();
    assert_eq!(transport.calculate_backoff(2), Duration::from_millis(300));

    config.http.retry_backoff.backoff_type = BackoffType::Constant;
    let transport = HttpTransport::new(config).unwrap();
    assert_eq!(transport.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_retry_after_prefers_reset_header() {
    let mut headers = HeaderMap::new();
    headers.insert("x-rate-limit-reset", HeaderValue::from_static("1000030"));
    headers.insert("retry-after", HeaderValue::from_static("5"));
    assert_eq!(retry_after_seconds(&headers, 1_000_000), Some(30));
}

#[test]
fn test_retry_after_reset_in_past_clamps_to_zero() {
    let mut headers = HeaderMap::new();
    headers.insert("x-rate-limit-reset", HeaderValue::from_static("999990"));
    assert_eq!(retry_after_seconds(&headers, 1_000_000), Some(0));
}

#[test]
fn test_retry_after_extreme_reset_does_not_overflow() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-rate-limit-reset",
        HeaderValue::from_static("-9223372036854775808"),
    );
    assert_eq!(retry_after_seconds(&headers, 1_000_000), Some(0));

    headers.insert(
        "x-rate-limit-reset",
        HeaderValue::from_static("9223372036854775807"),
    );
    assert_eq!(
        retry_after_seconds(&headers, -1_000_000),
        Some(i64::MAX as u64)
    );
}

#[test]
fn test_retry_after_fallback_and_absent() {
    let mut headers = HeaderMap::new();
    assert_eq!(retry_after_seconds(&headers, 0), None);

    headers.insert("retry-after", HeaderValue::from_static("12"));
    assert_eq!(retry_after_seconds(&headers, 0), Some(12));

    headers.insert("retry-after", HeaderValue::from_static("Wed, 21 Oct 2015"));
    assert_eq!(retry_after_seconds(&headers, 0), None);
}

#[test]
fn test_decode_envelope() {
    assert!(matches!(
        decode_envelope("[]"),
        Ok(ResponseEnvelope::List(items)) if items.is_empty()
    ));
    assert!(matches!(
        decode_envelope(r#"{"ids": []}"#),
        Ok(ResponseEnvelope::Document(_))
    ));
    assert!(matches!(
        decode_envelope(""),
        Err(ApiError::MalformedEnvelope { .. })
    ));
    assert!(matches!(
        decode_envelope("not json"),
        Err(ApiError::MalformedEnvelope { .. })
    ));
    assert!(matches!(
        decode_envelope("42"),
        Err(ApiError::MalformedEnvelope { .. })
    ));
}

#[tokio::test]
async fn test_get_sends_query_and_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("screen_name", "rustlang"))
        .and(query_param("count", "2"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "text": "b"},
            {"id": 1, "text": "a"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(test_config(&mock_server.uri())).unwrap();
    let envelope = transport
        .get(
            "statuses/user_timeline",
            &params(&[("screen_name", "rustlang"), ("count", "2")]),
        )
        .await
        .unwrap();

    assert_eq!(envelope.as_list().map(|items| items.len()), Some(2));
}

#[tokio::test]
async fn test_status_mapping() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/1.1/forbidden.json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("suspended"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/1.1/missing.json"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/1.1/broken.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/1.1/limited.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/1.1/limited_no_reset.json"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(test_config(&mock_server.uri())).unwrap();
    let none = StringMap::new();

    assert!(matches!(
        transport.get("forbidden", &none).await,
        Err(ApiError::Forbidden { body }) if body == "suspended"
    ));
    assert!(matches!(
        transport.get("missing", &none).await,
        Err(ApiError::NotFound { body }) if body == "gone"
    ));
    assert!(matches!(
        transport.get("broken", &none).await,
        Err(ApiError::General { status: 500, .. })
    ));
    assert!(matches!(
        transport.get("limited", &none).await,
        Err(ApiError::RateLimited {
            retry_after_seconds: Some(7)
        })
    ));
    assert!(matches!(
        transport.get("limited_no_reset", &none).await,
        Err(ApiError::RateLimited {
            retry_after_seconds: None
        })
    ));
}

#[tokio::test]
async fn test_non_json_success_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(test_config(&mock_server.uri())).unwrap();
    assert!(matches!(
        transport.get("anything", &StringMap::new()).await,
        Err(ApiError::MalformedEnvelope { .. })
    ));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let mut config = test_config("http://127.0.0.1:1");
    config.http.max_retries = 0;
    let transport = HttpTransport::new(config).unwrap();

    assert!(matches!(
        transport.get("anything", &StringMap::new()).await,
        Err(ApiError::Http(_))
    ));
}

#[test]
fn test_debug_hides_token() {
    let transport = HttpTransport::new(test_config("http://localhost")).unwrap();
    let debug = format!("{transport:?}");
    assert!(debug.contains("has_token: true"));
    assert!(!debug.contains("test-token"));
    assert!(!transport.has_rate_limiter());
}
