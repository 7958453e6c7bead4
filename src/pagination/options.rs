//! Pagination data model.

use serde_json::{Map, Value};

/// Immutable descriptor of one logical query.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Operation name, used in logs and error messages
    pub operation_name: String,
    /// Query text, possibly with `{page}`, `{perPage}`, `{filters}` and
    /// `{pageInfo}` placeholders
    pub template: String,
    /// Variables sent with every request of this query
    pub variables: Value,
    /// Subtracted from the estimated per-object complexity
    pub complexity_adjustment: i64,
}

impl QuerySpec {
    /// Creates a spec with no variables and no complexity adjustment.
    pub fn new(operation_name: impl Into<String>, template: impl Into<String>) -> Self {
        QuerySpec {
            operation_name: operation_name.into(),
            template: template.into(),
            variables: Value::Object(Map::new()),
            complexity_adjustment: 0,
        }
    }

    /// Sets the variables sent with every request.
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    /// Sets the amount subtracted from the complexity estimate.
    pub fn with_complexity_adjustment(mut self, adjustment: i64) -> Self {
        self.complexity_adjustment = adjustment;
        self
    }
}

/// Caller-side pagination options.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationOptions {
    /// First page to fetch, 1-based
    pub page: u32,
    /// Page size. `Some` forces this size and skips calibration.
    pub per_page: Option<u32>,
    /// Passed through to the `{filters}` placeholder
    pub filters: Option<Value>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        PaginationOptions {
            page: 1,
            per_page: None,
            filters: None,
        }
    }
}

impl PaginationOptions {
    /// Options starting at `page`, with a planned page size.
    pub fn starting_at(page: u32) -> Self {
        PaginationOptions {
            page,
            ..Default::default()
        }
    }

    /// Forces the page size, skipping calibration.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sets the value bound to `{filters}`.
    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Whether the caller pinned the page size.
    pub fn is_forcing_per_page(&self) -> bool {
        self.per_page.is_some()
    }
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Page number requested
    pub page: u32,
    /// Page size requested
    pub per_page: u32,
    /// Raw payload returned by the executor
    pub payload: Value,
    /// `pageInfo.totalPages` when it was requested
    pub total_pages: Option<u32>,
}

/// Pages of one paginated query, in fetch order.
///
/// The engine never reorders or deduplicates pages; concatenating the
/// payloads in order reconstructs the logical list.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    /// Operation name
    pub operation_name: String,
    /// Page size used for the bulk of the sweep
    pub per_page: u32,
    /// Total page count at that page size
    pub total_pages: u32,
    /// Fetched pages in ascending page order
    pub pages: Vec<PageResult>,
}

impl AggregatedResult {
    /// Number of pages fetched.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page was fetched.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page payloads in order.
    pub fn payloads(&self) -> impl Iterator<Item = &Value> {
        self.pages.iter().map(|page| &page.payload)
    }

    /// Consumes the result, keeping only the payloads.
    pub fn into_payloads(self) -> Vec<Value> {
        self.pages.into_iter().map(|page| page.payload).collect()
    }
}
