//! gql_pacer library: rate-limited, adaptively paginated GraphQL queries
//!
//! This library schedules queries against a GraphQL API that enforces both a
//! request-rate ceiling and a per-request complexity ceiling. Every query goes
//! through a sliding-window gate that queues (rather than fails) requests once
//! the window is full, and paginated queries pick their own page size from a
//! one-item probe.
//!
//! # Example
//!
//! ```no_run
//! use gql_pacer::{Config, PaginationOptions, QueryClient, QuerySpec};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     api_token: Some("my-token".to_string()),
//!     rate_limit_capacity: 80,
//!     rate_limit_window: Duration::from_secs(60),
//!     ..Default::default()
//! };
//!
//! let client = QueryClient::from_config(config)?;
//! let spec = QuerySpec::new(
//!     "tournamentEvents",
//!     "query { tournaments(query: {page: {page}, perPage: {perPage}, filter: {filters}}) { {pageInfo} nodes { id name } } }",
//! );
//! let result = client
//!     .paginated_query(&spec, PaginationOptions::default(), None)
//!     .await?;
//! println!("Fetched {} pages at {} per page", result.len(), result.per_page);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod client;
mod complexity;
pub mod config;
mod error_handling;
mod executor;
mod gate;
pub mod initialization;
mod pagination;
mod stagger;

// Re-export public API
pub use client::QueryClient;
pub use complexity::{score, score_json, score_payload, SemanticValue};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    ConfigError, ErrorKind, ExecutionError, GateEvent, InitializationError, QueryError, QueryStats,
};
pub use executor::{Executor, HttpExecutor, QueryRequest};
pub use gate::{Clock, RateLimitGate, TokioClock};
pub use pagination::{
    parse_total_pages, plan, to_graphql_literal, AggregatedResult, MergeParams, PageResult,
    PaginatedQueryEngine, PaginationOptions, PlaceholderMerger, QueryMerger, QuerySpec,
};
pub use stagger::{StaggeredHandle, StaggeredQueue};
