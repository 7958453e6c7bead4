//! Error handling and query statistics.
//!
//! This module provides:
//! - Error type definitions (execution, pagination, configuration, initialization)
//! - Thread-safe statistics for failures and scheduling events
//!
//! Rate-limit saturation has no error variant. It is
//! absorbed by the delinquency queue and only shows up as a `Queued` event.

mod stats;
mod types;

// Re-export public API
pub use stats::QueryStats;
pub use types::{
    ConfigError, ErrorKind, ExecutionError, GateEvent, InitializationError, QueryError,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_kinds() {
        let malformed = QueryError::MalformedResponse {
            operation: "getEvents".into(),
            detail: "missing pageInfo.totalPages".into(),
        };
        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);

        let empty = QueryError::EmptyResult {
            operation: "getEvents".into(),
        };
        assert_eq!(empty.kind(), ErrorKind::EmptyResult);

        let status: QueryError = ExecutionError::Status {
            status: 503,
            body: "unavailable".into(),
        }
        .into();
        assert_eq!(status.kind(), ErrorKind::HttpStatus);
    }

    #[test]
    fn test_error_messages_name_the_operation() {
        let err = QueryError::MalformedResponse {
            operation: "phaseGroupSets".into(),
            detail: "missing pageInfo.totalPages".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("phaseGroupSets:"), "got {msg}");

        let err = QueryError::EmptyResult {
            operation: "phaseGroupSets".into(),
        };
        assert!(err.to_string().contains("phaseGroupSets"));
    }

    #[test]
    fn test_execution_error_is_transparent() {
        let err: QueryError = ExecutionError::GraphQl {
            messages: vec!["a".into(), "b".into()],
        }
        .into();
        assert_eq!(err.to_string(), "GraphQL errors: a; b");
    }
}
