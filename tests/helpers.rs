// Shared test helpers: an in-memory executor that serves paginated payloads.
//
// Queries are expected to be rendered from `spec_for`, so the executor can
// read the requested page and page size back out of the query text.

use async_trait::async_trait;
use gql_pacer::{Config, ExecutionError, Executor, QuerySpec};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// A query the scripted executor understands, tagged with `op`.
#[allow(dead_code)] // Used by other test files
pub fn spec_for(op: &str) -> QuerySpec {
    QuerySpec::new(
        op,
        format!("op={op} page={{page}} perPage={{perPage}} info={{pageInfo}}"),
    )
}

/// One request seen by the executor.
#[derive(Debug, Clone)]
pub struct Call {
    pub op: String,
    pub page: u32,
    pub per_page: u32,
    pub with_page_info: bool,
    pub at: Instant,
}

/// Serves `total_items` items split into pages of the requested size.
///
/// Fails with an HTTP 500 on the call numbers listed in `fail_on` (1-based).
pub struct ScriptedExecutor {
    total_items: u32,
    fail_on: Vec<usize>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new(total_items: u32) -> Self {
        ScriptedExecutor {
            total_items,
            fail_on: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on.push(call);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, op: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }
}

fn field<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split_whitespace()
        .find_map(|part| part.strip_prefix(name)?.strip_prefix('='))
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self, query: &str, _variables: &Value) -> Result<Value, ExecutionError> {
        let call = Call {
            op: field(query, "op").unwrap_or_default().to_string(),
            page: field(query, "page").and_then(|n| n.parse().ok()).unwrap_or(0),
            per_page: field(query, "perPage").and_then(|n| n.parse().ok()).unwrap_or(0),
            with_page_info: query.contains("totalPages"),
            at: Instant::now(),
        };

        let number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call.clone());
            calls.len()
        };
        if self.fail_on.contains(&number) {
            return Err(ExecutionError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }

        let per_page = call.per_page.max(1);
        let total_pages = self.total_items.div_ceil(per_page);
        let first = (call.page.saturating_sub(1)) * per_page;
        let last = (first + per_page).min(self.total_items);
        let nodes: Vec<Value> = (first..last)
            .map(|id| json!({"id": id, "entrant": {"name": format!("player{id}")}}))
            .collect();

        let mut payload = json!({"event": {"sets": {"nodes": nodes}}});
        if call.with_page_info {
            payload["event"]["sets"]["pageInfo"] = json!({"totalPages": total_pages});
        }
        Ok(payload)
    }
}

/// Config with generous limits and no artificial delays.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        rate_limit_capacity: 100,
        rate_limit_window: Duration::from_secs(60),
        single_query_delay: Duration::ZERO,
        stagger_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// Collects every node id of every page, in order.
#[allow(dead_code)]
pub fn node_ids(payloads: &[Value]) -> Vec<u64> {
    payloads
        .iter()
        .flat_map(|p| p["event"]["sets"]["nodes"].as_array().cloned().unwrap_or_default())
        .filter_map(|node| node["id"].as_u64())
        .collect()
}
