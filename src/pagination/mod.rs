//! Adaptive pagination over the rate-limit gate.

mod engine;
mod merge;
mod options;
mod planner;

pub use engine::{parse_total_pages, PaginatedQueryEngine};
pub use merge::{to_graphql_literal, MergeParams, PlaceholderMerger, QueryMerger};
pub use options::{AggregatedResult, PageResult, PaginationOptions, QuerySpec};
pub use planner::plan;
