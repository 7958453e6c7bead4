//! Integration tests for the non-paginated query paths
//!
//! These tests verify:
//! - Gated queries and the single-query escape hatch
//! - Staggered dispatch spacing
//! - The HTTP executor wired up from `Config`

mod helpers;

use gql_pacer::{Config, GateEvent, PaginationOptions, QueryClient, QuerySpec};
use helpers::{spec_for, test_config, ScriptedExecutor};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(start_paused = true)]
async fn test_query_waits_when_window_is_full() {
    let executor = Arc::new(ScriptedExecutor::new(1));
    let config = Config {
        rate_limit_capacity: 1,
        rate_limit_window: Duration::from_millis(500),
        ..test_config()
    };
    let client = QueryClient::new(config, executor.clone());
    let start = Instant::now();

    client.query(&spec_for("first")).await.unwrap();
    client.query(&spec_for("second")).await.unwrap();

    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].at, start);
    assert!(calls[1].at - start >= Duration::from_millis(500));
    assert_eq!(client.stats().get_event_count(GateEvent::Admitted), 1);
    assert_eq!(client.stats().get_event_count(GateEvent::Queued), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_query_sleeps_and_bypasses_the_gate() {
    let executor = Arc::new(ScriptedExecutor::new(1));
    let config = Config {
        rate_limit_capacity: 1,
        rate_limit_window: Duration::from_secs(60),
        single_query_delay: Duration::from_millis(1000),
        ..test_config()
    };
    let client = QueryClient::new(config, executor.clone());
    let start = Instant::now();

    client.single_query(&spec_for("bare")).await.unwrap();
    assert!(Instant::now() - start >= Duration::from_millis(1000));

    // The window slot is still free for a gated query
    assert!(!client.gate().is_delinquent().await);
    let before = Instant::now();
    client.query(&spec_for("gated")).await.unwrap();
    assert_eq!(Instant::now(), before);

    assert_eq!(client.stats().get_event_count(GateEvent::SingleQuery), 1);
    assert_eq!(client.stats().get_event_count(GateEvent::Admitted), 1);
}

#[tokio::test(start_paused = true)]
async fn test_staggered_queries_are_spaced_out() {
    let executor = Arc::new(ScriptedExecutor::new(1));
    let config = Config {
        stagger_delay: Duration::from_millis(200),
        ..test_config()
    };
    let client = QueryClient::new(config, executor.clone());

    let handles: Vec<_> = ["s1", "s2", "s3"]
        .into_iter()
        .map(|op| {
            let client = client.clone();
            tokio::spawn(async move { client.staggered_query(&spec_for(op)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let calls = executor.calls();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert!(pair[1].at - pair[0].at >= Duration::from_millis(200));
    }
    assert_eq!(client.stats().get_event_count(GateEvent::Staggered), 3);
    // Staggered queries still pass the gate
    assert_eq!(client.stats().get_event_count(GateEvent::Admitted), 3);
}

#[tokio::test]
async fn test_staggered_accepts_arbitrary_jobs() {
    let client = QueryClient::new(test_config(), Arc::new(ScriptedExecutor::new(1)));
    let handle = client.staggered(|| async { 21 * 2 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[tokio::test]
async fn test_http_client_runs_paginated_query_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gql"))
        .and(header("authorization", "Bearer secret"))
        .and(body_partial_json(json!({"variables": {"videogameId": 1}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "tournaments": {
                    "pageInfo": {"totalPages": 1},
                    "nodes": [{"id": 1, "name": "Genesis"}]
                }
            }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let config = Config {
        endpoint: format!("{}/gql", server.uri()),
        api_token: Some("secret".to_string()),
        ..test_config()
    };
    let client = QueryClient::from_config(config).unwrap();
    let spec = QuerySpec::new(
        "tournaments",
        "query($videogameId: ID) { tournaments(query: {page: {page}, perPage: {perPage}}) { {pageInfo} nodes { id name } } }",
    )
    .with_variables(json!({"videogameId": 1}));

    let result = client
        .paginated_query(&spec, PaginationOptions::default(), None)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.pages[0].payload["tournaments"]["nodes"][0]["name"],
        "Genesis"
    );
}

#[tokio::test]
async fn test_from_config_rejects_invalid_endpoint() {
    let config = Config {
        endpoint: "not a url".to_string(),
        ..test_config()
    };
    assert!(QueryClient::from_config(config).is_err());
}
