//! Sliding-window rate limiting with delinquency queueing.
//!
//! Every gated query passes through [`RateLimitGate::admit`]:
//! - Timestamps older than the window are evicted on each attempt
//! - With fewer than `capacity` requests in the window the query runs at once
//! - Otherwise the client is *delinquent* and the query is parked in a FIFO
//!   queue; a replay timer fires when the oldest timestamp leaves the window
//!   and releases as many queued queries as now fit
//!
//! Delinquency is not an error. A queued caller simply waits longer and then
//! receives the executor's result (or error) through its own channel.

mod clock;
mod delinquency;
mod window;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{oneshot, Mutex};

use crate::error_handling::{ExecutionError, GateEvent, QueryStats};
use crate::executor::{Executor, QueryRequest};

pub use clock::{Clock, TokioClock};
use delinquency::{DelinquencyQueue, QueueEntry};
use window::RequestWindow;

/// Mutable bookkeeping shared by every caller of one gate.
struct GateState {
    window: RequestWindow,
    queue: DelinquencyQueue,
    replay_scheduled: bool,
}

struct GateInner {
    state: Mutex<GateState>,
    executor: Arc<dyn Executor>,
    clock: Arc<dyn Clock>,
    stats: Arc<QueryStats>,
    capacity: usize,
    window_duration: Duration,
}

enum Admission {
    Immediate(QueryRequest),
    Deferred(oneshot::Receiver<Result<Value, ExecutionError>>),
}

/// The single choke point for rate-limited queries.
///
/// Cloning is cheap and every clone shares the same window and queue, so one
/// gate can be handed to any number of concurrent callers.
#[derive(Clone)]
pub struct RateLimitGate {
    inner: Arc<GateInner>,
}

impl RateLimitGate {
    /// Creates a gate allowing `capacity` requests per `window_duration`.
    ///
    /// # Arguments
    ///
    /// * `executor` - Performs the admitted calls
    /// * `capacity` - Maximum requests inside one window (at least 1)
    /// * `window_duration` - Length of the sliding window
    pub fn new(executor: Arc<dyn Executor>, capacity: usize, window_duration: Duration) -> Self {
        Self::with_clock(
            executor,
            capacity,
            window_duration,
            Arc::new(TokioClock),
            Arc::new(QueryStats::new()),
        )
    }

    /// Creates a gate with an explicit clock and statistics sink.
    pub fn with_clock(
        executor: Arc<dyn Executor>,
        capacity: usize,
        window_duration: Duration,
        clock: Arc<dyn Clock>,
        stats: Arc<QueryStats>,
    ) -> Self {
        let capacity = capacity.max(1);
        RateLimitGate {
            inner: Arc::new(GateInner {
                state: Mutex::new(GateState {
                    window: RequestWindow::new(capacity, window_duration),
                    queue: DelinquencyQueue::new(),
                    replay_scheduled: false,
                }),
                executor,
                clock,
                stats,
                capacity,
                window_duration,
            }),
        }
    }

    /// Requests allowed per window.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Length of the sliding window.
    pub fn window_duration(&self) -> Duration {
        self.inner.window_duration
    }

    /// Counters updated on every admission.
    pub fn stats(&self) -> &Arc<QueryStats> {
        &self.inner.stats
    }

    /// Runs `request` now if the window allows it, otherwise once it reopens.
    ///
    /// Arrival order is preserved: while anything is queued, new arrivals
    /// queue behind it even if a slot has just freed up.
    ///
    /// # Errors
    ///
    /// Only the executor's own error is returned; saturation never fails.
    pub async fn admit(&self, request: QueryRequest) -> Result<Value, ExecutionError> {
        let admission = {
            let mut state = self.inner.state.lock().await;
            let now = self.inner.clock.now();
            state.window.evict(now);

            if state.queue.is_empty() && state.window.has_room() {
                state.window.record(now);
                Admission::Immediate(request)
            } else {
                log::debug!(
                    "{}: client delinquent ({} requests in window), queueing behind {} others",
                    request.operation_name,
                    state.window.len(),
                    state.queue.len()
                );
                let (tx, rx) = oneshot::channel();
                state.queue.enqueue(QueueEntry::new(request, tx));
                self.schedule_replay(&mut state);
                Admission::Deferred(rx)
            }
        };

        match admission {
            Admission::Immediate(request) => {
                self.inner.stats.increment_event(GateEvent::Admitted);
                self.inner
                    .executor
                    .execute(&request.query, &request.variables)
                    .await
            }
            Admission::Deferred(rx) => {
                self.inner.stats.increment_event(GateEvent::Queued);
                rx.await.unwrap_or(Err(ExecutionError::Abandoned))
            }
        }
    }

    /// Whether the window is currently saturated.
    pub async fn is_delinquent(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        state.window.evict(self.inner.clock.now());
        !state.window.has_room() || !state.queue.is_empty()
    }

    /// Number of queries waiting for the window to reopen.
    pub async fn queued(&self) -> usize {
        self.inner.state.lock().await.queue.len()
    }

    /// Arms the replay timer for when the oldest timestamp expires.
    fn schedule_replay(&self, state: &mut GateState) {
        if state.replay_scheduled {
            return;
        }
        let deadline = state
            .window
            .reopens_at()
            .unwrap_or_else(|| self.inner.clock.now());
        state.replay_scheduled = true;

        let gate = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            gate.replay().await;
        });
    }

    /// Releases queued queries that fit in the window and re-arms if needed.
    async fn replay(&self) {
        let mut state = self.inner.state.lock().await;
        state.replay_scheduled = false;

        let now = self.inner.clock.now();
        state.window.evict(now);
        let GateState { window, queue, .. } = &mut *state;
        let released = queue.drain(window, now);

        if !released.is_empty() {
            log::debug!(
                "Replaying {} queued queries, {} still waiting",
                released.len(),
                state.queue.len()
            );
        }

        for entry in released {
            self.inner.stats.increment_event(GateEvent::Replayed);
            let executor = Arc::clone(&self.inner.executor);
            tokio::spawn(async move {
                let outcome = executor
                    .execute(&entry.request.query, &entry.request.variables)
                    .await;
                entry.resolve(outcome);
            });
        }

        if !state.queue.is_empty() {
            self.schedule_replay(&mut state);
        }
    }
}
