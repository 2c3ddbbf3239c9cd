//! Integration tests using mock HTTP server
//!
//! Tests the full flow: config → HttpTransport → iterators → pages

use futures::StreamExt;
use serde_json::json;
use std::io::Write;
use std::time::{Duration, Instant};
use timeline_pager::{
    ApiClient, ApiError, ClientConfig, ExecutionContext, HttpTransport, Item, Transport,
};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: server.uri(),
        bearer_token: Some("test-token".to_string()),
        ..ClientConfig::default()
    }
}

fn tweets(ids: &[i64]) -> serde_json::Value {
    ids.iter()
        .map(|id| json!({"id": id, "id_str": id.to_string(), "text": format!("tweet {id}")}))
        .collect()
}

fn ids_of(items: &[Item]) -> Vec<i64> {
    items.iter().filter_map(Item::id).collect()
}

// ============================================================================
// Transport Integration Tests
// ============================================================================

#[tokio::test]
async fn test_transport_sends_bearer_token_and_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("screen_name", "rustlang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&[3, 2, 1])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(config_for(&mock_server)).unwrap();
    let params = [("screen_name".to_string(), "rustlang".to_string())]
        .into_iter()
        .collect();

    let envelope = transport
        .get("statuses/user_timeline", &params)
        .await
        .unwrap();
    assert_eq!(envelope.as_list().map(<[_]>::len), Some(3));
}

#[tokio::test]
async fn test_transport_reports_rate_limit_reset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(config_for(&mock_server)).unwrap();
    let err = transport
        .get("followers/ids", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::RateLimited {
            retry_after_seconds: Some(7)
        }
    ));
}

// ============================================================================
// Iterator Integration Tests
// ============================================================================

#[tokio::test]
async fn test_timeline_walk_drops_boundary_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("max_id", "103"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&[103, 102, 101])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("max_id", "101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&[101])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param_is_missing("max_id"))
        .and(query_param("since_id", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&[105, 104, 103])))
        .mount(&mock_server)
        .await;

    let client = ApiClient::from_config(config_for(&mock_server), ExecutionContext::Batch).unwrap();
    let walk = client
        .timeline(
            "statuses/user_timeline",
            [("screen_name", "rustlang"), ("since_id", "50")],
        )
        .unwrap();

    let items: Vec<Item> = walk.into_stream().concat().await;

    assert_eq!(ids_of(&items), vec![105, 104, 103, 102, 101]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_cursor_walk_follows_next_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1/followers/ids.json"))
        .and(query_param("cursor", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": [1, 2, 3],
            "next_cursor": 1_500_000_000_000_i64,
            "next_cursor_str": "1500000000000",
            "previous_cursor": 0,
            "previous_cursor_str": "0"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/followers/ids.json"))
        .and(query_param("cursor", "1500000000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": [4],
            "next_cursor": 0,
            "previous_cursor": -1_500_000_000_000_i64
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::from_config(config_for(&mock_server), ExecutionContext::Batch).unwrap();
    let mut walk = client.followers([("screen_name", "rustlang")]).unwrap();

    assert_eq!(walk.next_page().await, Some(vec![1, 2, 3]));
    assert_eq!(walk.key(), 1_500_000_000_000);
    assert_eq!(walk.next_page().await, Some(vec![4]));
    assert_eq!(walk.next_page().await, None);
}

#[tokio::test]
async fn test_search_walk_follows_next_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1/search/tweets.json"))
        .and(query_param("q", "rust"))
        .and(query_param("max_id", "41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statuses": tweets(&[41, 40]),
            "search_metadata": {"max_id_str": "41", "count": 2}
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/search/tweets.json"))
        .and(query_param("q", "rust"))
        .and(query_param_is_missing("max_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statuses": tweets(&[45, 42]),
            "search_metadata": {
                "max_id_str": "45",
                "next_results": "?max_id=41&q=rust&include_entities=1"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::from_config(config_for(&mock_server), ExecutionContext::Batch).unwrap();
    let pages: Vec<Vec<Item>> = client
        .search("rust", [("count", "2")])
        .unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(pages.len(), 2);
    assert_eq!(ids_of(&pages.concat()), vec![45, 42, 41, 40]);
}

#[tokio::test]
async fn test_rate_limit_is_slept_off_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1/friends/ids.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/friends/ids.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": [9, 8],
            "next_cursor": 0,
            "previous_cursor": 0
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::from_config(config_for(&mock_server), ExecutionContext::Batch).unwrap();
    let mut walk = client.friends([("user_id", "12")]).unwrap();

    let started = Instant::now();
    let page = walk.next_page().await;

    assert_eq!(page, Some(vec![9, 8]));
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_request_serving_context_does_not_sleep() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "60"))
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        sleep_on_rate_limit: Some(true),
        ..config_for(&mock_server)
    };
    let client = ApiClient::from_config(config, ExecutionContext::RequestServing).unwrap();
    let mut walk = client.followers([("screen_name", "rustlang")]).unwrap();

    let started = Instant::now();
    assert_eq!(walk.next_page().await, Some(vec![]));
    assert!(started.elapsed() < Duration::from_secs(60));
    assert!(!walk.valid());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_not_found_ends_walk() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::from_config(config_for(&mock_server), ExecutionContext::Batch).unwrap();
    let pages: Vec<_> = client
        .timeline("statuses/user_timeline", [("screen_name", "nobody")])
        .unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(pages, vec![Vec::<Item>::new()]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

// ============================================================================
// Config Integration Tests
// ============================================================================

#[tokio::test]
async fn test_client_from_yaml_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/followers/ids"))
        .and(header("Authorization", "Bearer from-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": [7],
            "next_cursor": 0,
            "previous_cursor": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "base_url: \"{}\"\napi_version: \"2\"\nresult_format: \"\"\nbearer_token: from-file\nhttp:\n  rate_limit:\n    enabled: false",
        mock_server.uri()
    )
    .unwrap();

    let config = ClientConfig::load(file.path()).unwrap();
    let client = ApiClient::from_config(config, ExecutionContext::Batch).unwrap();
    assert!(!client.transport().has_rate_limiter());

    let ids: Vec<i64> = client
        .followers(Vec::<(String, String)>::new())
        .unwrap()
        .into_stream()
        .concat()
        .await;
    assert_eq!(ids, vec![7]);
}
