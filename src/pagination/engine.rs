//! Probe, calibrate, sweep.
//!
//! 1. **Probe**: fetch the start page at one item per page (or at the forced
//!    size) with page totals, and estimate the per-object complexity.
//! 2. **Calibrate** (unless the caller forced a size): plan a page size and
//!    refetch the start page at that size to learn the real page count.
//! 3. **Sweep**: fetch every remaining page in order, without page totals.
//!
//! Every request goes through the rate-limit gate. Any failure aborts the
//! run and discards the pages gathered so far.

use std::sync::Arc;

use serde_json::Value;

use super::merge::{MergeParams, QueryMerger};
use super::options::{AggregatedResult, PageResult, PaginationOptions, QuerySpec};
use super::planner;
use crate::complexity;
use crate::config::{PAGE_INFO_FIELD, PAGE_INFO_SELECTION, TOTAL_PAGES_FIELD};
use crate::error_handling::QueryError;
use crate::executor::QueryRequest;
use crate::gate::RateLimitGate;

/// Drives paginated queries through a shared [`RateLimitGate`].
///
/// Holds no per-run state, so concurrent runs can share one engine.
#[derive(Clone)]
pub struct PaginatedQueryEngine {
    gate: RateLimitGate,
    merger: Arc<dyn QueryMerger>,
    complexity_budget: u64,
}

impl PaginatedQueryEngine {
    /// Creates an engine whose requests all go through `gate`.
    pub fn new(gate: RateLimitGate, merger: Arc<dyn QueryMerger>, complexity_budget: u64) -> Self {
        PaginatedQueryEngine {
            gate,
            merger,
            complexity_budget,
        }
    }

    /// Per-request complexity ceiling used for planning.
    pub fn complexity_budget(&self) -> u64 {
        self.complexity_budget
    }

    /// Fetches every page of `spec`.
    ///
    /// `additional` is laid over the computed parameters, except `page`,
    /// `perPage` and `pageInfo`, which the engine always controls.
    ///
    /// # Errors
    ///
    /// - [`QueryError::Execution`] when any request fails
    /// - [`QueryError::MalformedResponse`] when page totals are missing
    /// - [`QueryError::EmptyResult`] when a request returns no data
    pub async fn run(
        &self,
        spec: &QuerySpec,
        options: &PaginationOptions,
        additional: &MergeParams,
    ) -> Result<AggregatedResult, QueryError> {
        let operation = spec.operation_name.as_str();
        log::info!("{}: Calling paginated queries", operation);

        let start_page = options.page.max(1);
        let probe_size = options.per_page.unwrap_or(1).max(1);

        let probe = self
            .fetch(spec, options, additional, start_page, probe_size, true)
            .await?;
        let probe_total = require_total_pages(operation, &probe)?;
        let estimated = complexity::score_payload(&probe.payload);
        let object_complexity = adjust(estimated, spec.complexity_adjustment);
        log::info!(
            "{}: Total pages using {} per page: {}, object complexity per page: {}",
            operation,
            probe_size,
            probe_total,
            object_complexity
        );

        let (per_page, total_pages, mut pages) = if options.is_forcing_per_page() {
            log::warn!(
                "{}: Implementer has chosen to force perPage at {} per page",
                operation,
                probe_size
            );
            (probe_size, probe_total, vec![probe])
        } else {
            let per_page = planner::plan(object_complexity, probe_total, self.complexity_budget);
            log::info!("{}: Optimal per page count: {}", operation, per_page);

            let calibration = self
                .fetch(spec, options, additional, start_page, per_page, true)
                .await?;
            let total_pages = require_total_pages(operation, &calibration)?;
            log::info!("{}: Optimal page count: {}", operation, total_pages);
            (per_page, total_pages, vec![calibration])
        };

        for page in start_page.saturating_add(1)..=total_pages {
            log::info!(
                "{}: Collected {}/{} pages",
                operation,
                page - start_page,
                total_pages - start_page + 1
            );
            let result = self
                .fetch(spec, options, additional, page, per_page, false)
                .await?;
            pages.push(result);
        }

        log::debug!("{}: Finished with {} pages", operation, pages.len());
        Ok(AggregatedResult {
            operation_name: spec.operation_name.clone(),
            per_page,
            total_pages,
            pages,
        })
    }

    async fn fetch(
        &self,
        spec: &QuerySpec,
        options: &PaginationOptions,
        additional: &MergeParams,
        page: u32,
        per_page: u32,
        with_page_info: bool,
    ) -> Result<PageResult, QueryError> {
        let params = merge_params(options, additional, page, per_page, with_page_info);
        let query = self.merger.merge(&spec.template, &params);
        let payload = self
            .gate
            .admit(QueryRequest::new(
                spec.operation_name.clone(),
                query,
                spec.variables.clone(),
            ))
            .await?;

        if is_empty_payload(&payload) {
            return Err(QueryError::EmptyResult {
                operation: spec.operation_name.clone(),
            });
        }

        let total_pages = if with_page_info {
            Some(parse_total_pages(&spec.operation_name, &payload)?)
        } else {
            None
        };

        Ok(PageResult {
            page,
            per_page,
            payload,
            total_pages,
        })
    }
}

/// Builds the parameters for one request of a run.
fn merge_params(
    options: &PaginationOptions,
    additional: &MergeParams,
    page: u32,
    per_page: u32,
    with_page_info: bool,
) -> MergeParams {
    let mut params = MergeParams::new();
    params.insert(
        "filters".to_string(),
        options.filters.clone().unwrap_or(Value::Null),
    );
    for (key, value) in additional {
        params.insert(key.clone(), value.clone());
    }

    params.insert("page".to_string(), Value::from(page));
    params.insert("perPage".to_string(), Value::from(per_page));
    let page_info = if with_page_info { PAGE_INFO_SELECTION } else { "" };
    params.insert(PAGE_INFO_FIELD.to_string(), Value::from(page_info));
    params
}

fn adjust(estimated: u64, adjustment: i64) -> u64 {
    let adjusted = i128::from(estimated) - i128::from(adjustment);
    u64::try_from(adjusted.max(1)).unwrap_or(u64::MAX)
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

fn require_total_pages(operation: &str, page: &PageResult) -> Result<u32, QueryError> {
    page.total_pages
        .ok_or_else(|| QueryError::MalformedResponse {
            operation: operation.to_string(),
            detail: "page totals were requested but not parsed".to_string(),
        })
}

/// Reads the first `pageInfo.totalPages` found in `payload`.
pub fn parse_total_pages(operation: &str, payload: &Value) -> Result<u32, QueryError> {
    let malformed = |detail: String| QueryError::MalformedResponse {
        operation: operation.to_string(),
        detail,
    };

    let raw = find_total_pages(payload).ok_or_else(|| {
        malformed(format!(
            "response has no {}.{}",
            PAGE_INFO_FIELD, TOTAL_PAGES_FIELD
        ))
    })?;

    raw.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            malformed(format!(
                "{}.{} is not a page count: {}",
                PAGE_INFO_FIELD, TOTAL_PAGES_FIELD, raw
            ))
        })
}

fn find_total_pages(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(fields) => {
            if let Some(total) = fields
                .get(PAGE_INFO_FIELD)
                .and_then(|info| info.get(TOTAL_PAGES_FIELD))
            {
                return Some(total);
            }
            fields.values().find_map(find_total_pages)
        }
        Value::Array(items) => items.iter().find_map(find_total_pages),
        _ => None,
    }
}
