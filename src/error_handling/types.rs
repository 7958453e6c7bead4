//! Error type definitions.
//!
//! This module defines all error types used throughout the crate, plus the
//! counters' key enums used by [`super::QueryStats`].

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Error types for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("{key} has an invalid value: {value:?}")]
    InvalidValue {
        /// Environment key
        key: &'static str,
        /// Raw value found
        value: String,
    },

    /// A value parsed but is unusable.
    #[error("{key} is out of range: {reason}")]
    OutOfRange {
        /// Environment key
        key: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The endpoint is not a valid URL.
    #[error("Invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured
        endpoint: String,
        /// Parser message
        reason: String,
    },
}

/// Failure of the remote call itself.
///
/// Propagated unchanged through the gate and the pagination engine.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The server answered with a non-success HTTP status.
    #[error("server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// The server answered with GraphQL errors.
    #[error("GraphQL errors: {}", messages.join("; "))]
    GraphQl {
        /// Messages of every reported error
        messages: Vec<String>,
    },

    /// The response body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// A queued request lost the task that was supposed to run it.
    #[error("queued request was abandoned before it could run")]
    Abandoned,
}

/// Errors surfaced by the query operations of [`crate::QueryClient`].
///
/// Rate-limit saturation is never an error; it only adds latency.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The executor call failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Pagination metadata was missing or unparsable.
    #[error("{operation}: malformed paginated response: {detail}")]
    MalformedResponse {
        /// Operation name
        operation: String,
        /// What was wrong
        detail: String,
    },

    /// A query phase returned no data at all.
    #[error("{operation}: no data returned from query")]
    EmptyResult {
        /// Operation name
        operation: String,
    },
}

impl QueryError {
    /// Category of this error, for statistics.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Execution(ExecutionError::Transport(_)) => ErrorKind::Transport,
            QueryError::Execution(ExecutionError::Status { .. }) => ErrorKind::HttpStatus,
            QueryError::Execution(ExecutionError::GraphQl { .. }) => ErrorKind::GraphQl,
            QueryError::Execution(ExecutionError::Decode(_)) => ErrorKind::Decode,
            QueryError::Execution(ExecutionError::Abandoned) => ErrorKind::Abandoned,
            QueryError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            QueryError::EmptyResult { .. } => ErrorKind::EmptyResult,
        }
    }
}

/// Categories of query failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    /// Network or transport failure
    Transport,
    /// Non-success HTTP status
    HttpStatus,
    /// GraphQL `errors` in the response
    GraphQl,
    /// Undecodable response body
    Decode,
    /// Queued request never ran
    Abandoned,
    /// Missing or unparsable page totals
    MalformedResponse,
    /// No data returned
    EmptyResult,
}

impl ErrorKind {
    /// Human-readable label used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "Transport error",
            ErrorKind::HttpStatus => "HTTP status error",
            ErrorKind::GraphQl => "GraphQL error",
            ErrorKind::Decode => "Response decode error",
            ErrorKind::Abandoned => "Abandoned queued request",
            ErrorKind::MalformedResponse => "Malformed paginated response",
            ErrorKind::EmptyResult => "Empty result",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notable scheduling events. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum GateEvent {
    /// Admitted immediately by the rate-limit gate
    Admitted,
    /// Parked in the delinquency queue
    Queued,
    /// Released from the delinquency queue
    Replayed,
    /// Dispatched through the fixed-delay escape hatch
    SingleQuery,
    /// Dispatched by the staggered queue
    Staggered,
}

impl GateEvent {
    /// Human-readable label used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateEvent::Admitted => "Admitted",
            GateEvent::Queued => "Queued (delinquent)",
            GateEvent::Replayed => "Replayed",
            GateEvent::SingleQuery => "Single query",
            GateEvent::Staggered => "Staggered",
        }
    }
}

impl std::fmt::Display for GateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
