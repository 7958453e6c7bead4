//! Configuration constants.
//!
//! Defaults used when the environment does not override a setting, plus the
//! field names the pagination engine relies on.

use std::time::Duration;

/// Default GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.smash.gg/gql/alpha";

/// Default User-Agent sent by the HTTP executor.
pub const DEFAULT_USER_AGENT: &str = concat!("gql_pacer/", env!("CARGO_PKG_VERSION"));

// Rate limiting
/// Maximum requests allowed inside one sliding window.
/// The upstream API penalizes clients that exceed 80 requests per minute.
pub const DEFAULT_RATE_LIMIT_CAPACITY: usize = 80;
/// Length of the sliding rate-limit window.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_millis(60_000);
/// Fixed delay applied before a bare `single_query` dispatch.
pub const DEFAULT_SINGLE_QUERY_DELAY: Duration = Duration::from_millis(1_000);
/// Minimum spacing between dispatches of the staggered queue.
pub const DEFAULT_STAGGER_DELAY: Duration = Duration::from_millis(0);

// Complexity
/// Maximum complexity the server tolerates for a single request.
pub const DEFAULT_COMPLEXITY_BUDGET: u64 = 1_000;

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Pagination metadata
/// Response field carrying pagination hints. Never counted as data cost.
pub const PAGE_INFO_FIELD: &str = "pageInfo";
/// Field inside [`PAGE_INFO_FIELD`] holding the total page count.
pub const TOTAL_PAGES_FIELD: &str = "totalPages";
/// Selection substituted for the `{pageInfo}` placeholder when page totals are wanted.
pub const PAGE_INFO_SELECTION: &str = "pageInfo{\ntotalPages\n}";

// Environment variable names
/// Overrides [`DEFAULT_ENDPOINT`].
pub const ENV_ENDPOINT: &str = "GQL_PACER_ENDPOINT";
/// Bearer token; unset or blank means no `Authorization` header.
pub const ENV_API_TOKEN: &str = "GQL_PACER_API_TOKEN";
/// Overrides [`DEFAULT_RATE_LIMIT_CAPACITY`].
pub const ENV_RATE_LIMIT_CAPACITY: &str = "GQL_PACER_RATE_LIMIT_CAPACITY";
/// Overrides [`DEFAULT_RATE_LIMIT_WINDOW`], in milliseconds.
pub const ENV_RATE_LIMIT_WINDOW_MS: &str = "GQL_PACER_RATE_LIMIT_WINDOW_MS";
/// Overrides [`DEFAULT_SINGLE_QUERY_DELAY`], in milliseconds.
pub const ENV_SINGLE_QUERY_DELAY_MS: &str = "GQL_PACER_SINGLE_QUERY_DELAY_MS";
/// Overrides [`DEFAULT_STAGGER_DELAY`], in milliseconds.
pub const ENV_STAGGER_DELAY_MS: &str = "GQL_PACER_STAGGER_DELAY_MS";
/// Overrides [`DEFAULT_COMPLEXITY_BUDGET`].
pub const ENV_COMPLEXITY_BUDGET: &str = "GQL_PACER_COMPLEXITY_BUDGET";
/// Overrides [`DEFAULT_TIMEOUT_SECS`].
pub const ENV_TIMEOUT_SECS: &str = "GQL_PACER_TIMEOUT_SECS";
/// Log level name (`error` through `trace`, case-insensitive).
pub const ENV_LOG_LEVEL: &str = "GQL_PACER_LOG_LEVEL";
/// `plain` or `json`.
pub const ENV_LOG_FORMAT: &str = "GQL_PACER_LOG_FORMAT";
