//! The public query surface.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::error_handling::{GateEvent, InitializationError, QueryError, QueryStats};
use crate::executor::{Executor, HttpExecutor, QueryRequest};
use crate::gate::{RateLimitGate, TokioClock};
use crate::pagination::{
    AggregatedResult, MergeParams, PaginatedQueryEngine, PaginationOptions, PlaceholderMerger,
    QueryMerger, QuerySpec,
};
use crate::stagger::{StaggeredHandle, StaggeredQueue};

/// Rate-limited access to one GraphQL API.
///
/// Owns one [`RateLimitGate`] and one [`StaggeredQueue`]. Clones share both,
/// so handing clones to concurrent tasks keeps every request under the same
/// window.
///
/// Must be created inside a Tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use gql_pacer::{Config, PaginationOptions, QueryClient, QuerySpec};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = QueryClient::from_config(Config::from_env()?)?;
/// let spec = QuerySpec::new(
///     "eventSets",
///     "query { event(id: 42) { sets(page: {page}, perPage: {perPage}) { {pageInfo} nodes { id } } } }",
/// );
/// let result = client
///     .paginated_query(&spec, PaginationOptions::default(), None)
///     .await?;
/// println!("{} pages", result.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QueryClient {
    config: Arc<Config>,
    executor: Arc<dyn Executor>,
    gate: RateLimitGate,
    stagger: StaggeredQueue,
    engine: PaginatedQueryEngine,
}

impl QueryClient {
    /// Builds a client around `executor` with the default merger.
    pub fn new(config: Config, executor: Arc<dyn Executor>) -> Self {
        Self::with_merger(config, executor, Arc::new(PlaceholderMerger))
    }

    /// Builds a client that talks HTTP to `config.endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: Config) -> Result<Self, InitializationError> {
        let executor = HttpExecutor::from_config(&config)?;
        log::debug!(
            "Query client for {} ({} requests per {:?})",
            executor.endpoint(),
            config.rate_limit_capacity,
            config.rate_limit_window
        );
        Ok(Self::new(config, Arc::new(executor)))
    }

    /// Builds a client with a custom [`QueryMerger`].
    pub fn with_merger(
        config: Config,
        executor: Arc<dyn Executor>,
        merger: Arc<dyn QueryMerger>,
    ) -> Self {
        let gate = RateLimitGate::with_clock(
            Arc::clone(&executor),
            config.rate_limit_capacity,
            config.rate_limit_window,
            Arc::new(TokioClock),
            Arc::new(QueryStats::new()),
        );
        let stagger = StaggeredQueue::new(config.stagger_delay);
        let engine = PaginatedQueryEngine::new(gate.clone(), merger, config.complexity_budget);

        QueryClient {
            config: Arc::new(config),
            executor,
            gate,
            stagger,
            engine,
        }
    }

    /// Configuration this client was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared rate-limit gate.
    pub fn gate(&self) -> &RateLimitGate {
        &self.gate
    }

    /// Error and scheduling counters for this client and its clones.
    pub fn stats(&self) -> &Arc<QueryStats> {
        self.gate.stats()
    }

    /// Runs one query through the rate-limit gate.
    ///
    /// The template is sent as written, with `spec.variables`.
    pub async fn query(&self, spec: &QuerySpec) -> Result<Value, QueryError> {
        let outcome = self.gate.admit(request_for(spec)).await;
        self.record(outcome.map_err(QueryError::from))
    }

    /// Runs one query after the fixed single-query delay, bypassing the gate.
    ///
    /// Requests sent this way are not counted in the rate-limit window.
    pub async fn single_query(&self, spec: &QuerySpec) -> Result<Value, QueryError> {
        log::debug!(
            "{}: single query after {:?}",
            spec.operation_name,
            self.config.single_query_delay
        );
        tokio::time::sleep(self.config.single_query_delay).await;
        self.stats().increment_event(GateEvent::SingleQuery);

        let outcome = self.executor.execute(&spec.template, &spec.variables).await;
        self.record(outcome.map_err(QueryError::from))
    }

    /// Adds an arbitrary job to the staggered queue.
    pub fn staggered<F, Fut, T>(&self, job: F) -> StaggeredHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let stats = Arc::clone(self.stats());
        self.stagger.add(move || {
            stats.increment_event(GateEvent::Staggered);
            job()
        })
    }

    /// Runs one gated query as a staggered job.
    ///
    /// The query still passes the rate-limit gate; staggering only spaces
    /// out dispatches.
    pub async fn staggered_query(&self, spec: &QuerySpec) -> Result<Value, QueryError> {
        let gate = self.gate.clone();
        let request = request_for(spec);
        let outcome = self
            .staggered(move || async move { gate.admit(request).await })
            .await
            .and_then(|result| result);
        self.record(outcome.map_err(QueryError::from))
    }

    /// Fetches every page of `spec`.
    ///
    /// `additional` parameters are merged into the template on every request,
    /// after `filters` and before the engine's own `page`, `perPage` and
    /// `pageInfo`. Nothing is returned unless every page succeeds.
    ///
    /// # Errors
    ///
    /// - [`QueryError::Execution`] when any request fails
    /// - [`QueryError::MalformedResponse`] when page totals are missing
    /// - [`QueryError::EmptyResult`] when a request returns no data
    pub async fn paginated_query(
        &self,
        spec: &QuerySpec,
        options: PaginationOptions,
        additional: Option<MergeParams>,
    ) -> Result<AggregatedResult, QueryError> {
        let additional = additional.unwrap_or_default();
        let outcome = self.engine.run(spec, &options, &additional).await;
        if let Err(e) = &outcome {
            log::warn!("{}: paginated query failed: {}", spec.operation_name, e);
        }
        self.record(outcome)
    }

    fn record<T>(&self, outcome: Result<T, QueryError>) -> Result<T, QueryError> {
        if let Err(e) = &outcome {
            self.stats().increment_error(e.kind());
        }
        outcome
    }
}

fn request_for(spec: &QuerySpec) -> QueryRequest {
    QueryRequest::new(
        spec.operation_name.clone(),
        spec.template.clone(),
        spec.variables.clone(),
    )
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("endpoint", &self.config.endpoint)
            .field("capacity", &self.gate.capacity())
            .field("window", &self.gate.window_duration())
            .field("stagger_delay", &self.stagger.delay())
            .finish()
    }
}
