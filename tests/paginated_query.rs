//! Integration tests for paginated queries
//!
//! These tests drive `QueryClient::paginated_query` end to end with a
//! scripted executor and verify:
//! - Probe, calibration and sweep requests
//! - Result ordering, including concurrent runs sharing one gate
//! - All-or-nothing failure behaviour

mod helpers;

use async_trait::async_trait;
use gql_pacer::{
    ErrorKind, ExecutionError, Executor, MergeParams, PaginationOptions, QueryClient, QueryError,
    QuerySpec,
};
use helpers::{node_ids, spec_for, test_config, ScriptedExecutor};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn client_with(executor: Arc<ScriptedExecutor>) -> QueryClient {
    QueryClient::new(test_config(), executor)
}

#[tokio::test]
async fn test_paginated_query_collects_every_item_in_order() {
    let executor = Arc::new(ScriptedExecutor::new(30));
    let client = client_with(executor.clone());

    let result = client
        .paginated_query(&spec_for("sets"), PaginationOptions::default(), None)
        .await
        .expect("paginated query should succeed");

    // Sample complexity 4 over 30 pages -> ceil(1000 / 120) = 9 per page
    assert_eq!(result.per_page, 9);
    assert_eq!(result.total_pages, 4);
    let pages: Vec<u32> = result.pages.iter().map(|p| p.page).collect();
    assert_eq!(pages, vec![1, 2, 3, 4]);

    let ids = node_ids(&result.clone().into_payloads());
    assert_eq!(ids, (0..30).collect::<Vec<u64>>());

    let calls = executor.calls();
    assert_eq!(calls.len(), 5, "sample + calibration + 3 sweep pages");
    assert_eq!((calls[0].page, calls[0].per_page), (1, 1));
    assert!(calls[0].with_page_info);
    assert_eq!((calls[1].page, calls[1].per_page), (1, 9));
    assert!(calls[1].with_page_info);
    assert!(calls[2..].iter().all(|c| !c.with_page_info && c.per_page == 9));
}

#[tokio::test]
async fn test_forced_per_page_skips_calibration() {
    let executor = Arc::new(ScriptedExecutor::new(120));
    let client = client_with(executor.clone());

    let result = client
        .paginated_query(
            &spec_for("entrants"),
            PaginationOptions::default().with_per_page(50),
            None,
        )
        .await
        .unwrap();

    let calls = executor.calls();
    let requested: Vec<(u32, u32)> = calls.iter().map(|c| (c.page, c.per_page)).collect();
    assert_eq!(requested, vec![(1, 50), (2, 50), (3, 50)]);
    assert_eq!(result.len(), 3);
    assert_eq!(node_ids(&result.into_payloads()).len(), 120);
}

#[tokio::test]
async fn test_single_page_result_needs_no_sweep() {
    let executor = Arc::new(ScriptedExecutor::new(4));
    let client = client_with(executor.clone());

    let result = client
        .paginated_query(&spec_for("phases"), PaginationOptions::default(), None)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.total_pages, 1);
    assert_eq!(executor.calls().len(), 2);
    assert_eq!(node_ids(&result.into_payloads()), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_probe_failure_propagates_execution_error() {
    let executor = Arc::new(ScriptedExecutor::new(30).failing_on(1));
    let client = client_with(executor.clone());

    let err = client
        .paginated_query(&spec_for("sets"), PaginationOptions::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QueryError::Execution(ExecutionError::Status { status: 500, .. })
    ));
    assert_eq!(executor.calls().len(), 1);
    assert_eq!(client.stats().get_error_count(ErrorKind::HttpStatus), 1);
}

#[tokio::test]
async fn test_sweep_failure_discards_partial_progress() {
    let executor = Arc::new(ScriptedExecutor::new(30).failing_on(4));
    let client = client_with(executor.clone());

    let result = client
        .paginated_query(&spec_for("sets"), PaginationOptions::default(), None)
        .await;

    assert!(result.is_err());
    // The run stops at the first failure
    assert_eq!(executor.calls().len(), 4);
}

struct NoPageInfoExecutor;

#[async_trait]
impl Executor for NoPageInfoExecutor {
    async fn execute(&self, _query: &str, _variables: &Value) -> Result<Value, ExecutionError> {
        Ok(json!({"event": {"sets": {"nodes": [{"id": 1}]}}}))
    }
}

#[tokio::test]
async fn test_missing_page_info_is_malformed_response() {
    let client = QueryClient::new(test_config(), Arc::new(NoPageInfoExecutor));

    let err = client
        .paginated_query(&spec_for("standings"), PaginationOptions::default(), None)
        .await
        .unwrap_err();

    match &err {
        QueryError::MalformedResponse { operation, .. } => assert_eq!(operation, "standings"),
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
    assert_eq!(client.stats().get_error_count(ErrorKind::MalformedResponse), 1);
}

/// Answers the one-item sample with page totals and every larger page without.
struct TotalsDroppedAfterSample {
    calls: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl Executor for TotalsDroppedAfterSample {
    async fn execute(&self, query: &str, _variables: &Value) -> Result<Value, ExecutionError> {
        self.calls.lock().unwrap().push(query.to_string());
        let mut payload = json!({"event": {"sets": {"nodes": [{"id": 1}]}}});
        if query.contains("perPage=1 ") {
            payload["event"]["sets"]["pageInfo"] = json!({"totalPages": 30});
        }
        Ok(payload)
    }
}

#[tokio::test]
async fn test_calibration_without_page_info_is_malformed_response() {
    let executor = Arc::new(TotalsDroppedAfterSample {
        calls: std::sync::Mutex::new(Vec::new()),
    });
    let client = QueryClient::new(test_config(), executor.clone());

    let result = client
        .paginated_query(&spec_for("brackets"), PaginationOptions::default(), None)
        .await;

    match result {
        Err(QueryError::MalformedResponse { operation, .. }) => assert_eq!(operation, "brackets"),
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
    let calls = executor.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2, "sample and calibration only");
    assert!(!calls[1].contains("perPage=1 "));
    assert_eq!(client.stats().get_error_count(ErrorKind::MalformedResponse), 1);
}

#[tokio::test]
async fn test_additional_params_cannot_override_pagination() {
    let executor = Arc::new(ScriptedExecutor::new(10));
    let client = client_with(executor.clone());

    let mut additional = MergeParams::new();
    additional.insert("page".to_string(), json!(7));
    additional.insert("perPage".to_string(), json!(1000));

    client
        .paginated_query(
            &spec_for("sets"),
            PaginationOptions::default(),
            Some(additional),
        )
        .await
        .unwrap();

    let first = &executor.calls()[0];
    assert_eq!((first.page, first.per_page), (1, 1));
}

#[tokio::test]
async fn test_filters_and_additional_params_reach_the_query() {
    struct CapturingExecutor(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl Executor for CapturingExecutor {
        async fn execute(&self, query: &str, _variables: &Value) -> Result<Value, ExecutionError> {
            self.0.lock().unwrap().push(query.to_string());
            Ok(json!({"players": {"pageInfo": {"totalPages": 1}, "nodes": []}}))
        }
    }

    let executor = Arc::new(CapturingExecutor(std::sync::Mutex::new(Vec::new())));
    let client = QueryClient::new(test_config(), executor.clone());
    let spec = QuerySpec::new(
        "players",
        "players(query: {page: {page}, perPage: {perPage}, filter: {filters}}, sort: {sort}) { {pageInfo} nodes { id } }",
    );

    let mut additional = MergeParams::new();
    additional.insert("sort".to_string(), json!("NAME"));
    client
        .paginated_query(
            &spec,
            PaginationOptions::default().with_filters(json!({"gamerTag": "Mang0"})),
            Some(additional),
        )
        .await
        .unwrap();

    let queries = executor.0.lock().unwrap().clone();
    assert!(queries[0].contains(r#"filter: {gamerTag: "Mang0"}"#), "{}", queries[0]);
    assert!(queries[0].contains("sort: NAME"));
    assert!(queries[0].contains("page: 1, perPage: 1,"));
    assert!(queries[0].contains("pageInfo{\ntotalPages\n}"));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_runs_share_the_gate_and_stay_ordered() {
    let executor = Arc::new(ScriptedExecutor::new(30));
    let config = gql_pacer::Config {
        rate_limit_capacity: 3,
        rate_limit_window: Duration::from_millis(1000),
        ..test_config()
    };
    let client = QueryClient::new(config, executor.clone());

    let first = {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .paginated_query(&spec_for("a"), PaginationOptions::default(), None)
                .await
        })
    };
    let second = {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .paginated_query(&spec_for("b"), PaginationOptions::default(), None)
                .await
        })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    for result in [&first, &second] {
        let pages: Vec<u32> = result.pages.iter().map(|p| p.page).collect();
        assert_eq!(pages, vec![1, 2, 3, 4]);
        assert_eq!(node_ids(&result.clone().into_payloads()), (0..30).collect::<Vec<u64>>());
    }

    // Each run requests its own sweep pages strictly in order
    for op in ["a", "b"] {
        let sweep: Vec<u32> = executor.calls_for(op)[2..].iter().map(|c| c.page).collect();
        assert_eq!(sweep, vec![2, 3, 4]);
    }

    // Never more than 3 requests inside any 1s window
    let calls = executor.calls();
    assert_eq!(calls.len(), 10);
    for i in 3..calls.len() {
        assert!(calls[i].at - calls[i - 3].at >= Duration::from_millis(1000));
    }
    assert!(client.stats().get_event_count(gql_pacer::GateEvent::Queued) > 0);
    assert_eq!(client.stats().total_errors(), 0);
}
