//! Remote query execution.
//!
//! The [`Executor`] trait is the only place a query leaves the process.
//! [`HttpExecutor`] is the GraphQL-over-HTTP implementation; tests and
//! embedders can supply their own.

mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error_handling::ExecutionError;

pub use http::HttpExecutor;

/// Performs the actual wire call for a fully bound query.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Executes `query` with `variables` and returns the response payload.
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, ExecutionError>;
}

/// A concrete query ready to be sent.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Operation name, used in log lines
    pub operation_name: String,
    /// Query text with every placeholder already substituted
    pub query: String,
    /// Variables sent alongside the query
    pub variables: Value,
}

impl QueryRequest {
    /// Bundles a bound query with its variables.
    pub fn new(operation_name: impl Into<String>, query: impl Into<String>, variables: Value) -> Self {
        QueryRequest {
            operation_name: operation_name.into(),
            query: query.into(),
            variables,
        }
    }
}
