//! FIFO holding area for queries that arrived while the window was full.

use std::collections::VecDeque;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::window::RequestWindow;
use crate::error_handling::ExecutionError;
use crate::executor::QueryRequest;

/// Channel the replayed query's outcome is delivered on.
pub(crate) type Responder = oneshot::Sender<Result<Value, ExecutionError>>;

/// A deferred query plus the channel its original caller is waiting on.
#[derive(Debug)]
pub(crate) struct QueueEntry {
    pub(crate) request: QueryRequest,
    pub(crate) responder: Responder,
}

impl QueueEntry {
    pub(crate) fn new(request: QueryRequest, responder: Responder) -> Self {
        QueueEntry { request, responder }
    }

    /// Hands the outcome back to the waiting caller.
    ///
    /// A caller that stopped waiting is not an error; the result is dropped.
    pub(crate) fn resolve(self, outcome: Result<Value, ExecutionError>) {
        if self.responder.send(outcome).is_err() {
            log::debug!(
                "{}: caller went away before its replayed query finished",
                self.request.operation_name
            );
        }
    }
}

/// Strict FIFO of deferred queries. No priorities, no reordering.
#[derive(Debug, Default)]
pub(crate) struct DelinquencyQueue {
    entries: VecDeque<QueueEntry>,
}

impl DelinquencyQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enqueue(&mut self, entry: QueueEntry) {
        self.entries.push_back(entry);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Releases head-of-queue entries while the window has room.
    ///
    /// Every released entry is recorded in `window` at `now`. Entries that do
    /// not fit stay queued in their original order.
    pub(crate) fn drain(&mut self, window: &mut RequestWindow, now: Instant) -> Vec<QueueEntry> {
        let mut released = Vec::new();
        while window.has_room() {
            let Some(entry) = self.entries.pop_front() else {
                break;
            };
            window.record(now);
            released.push(entry);
        }
        released
    }
}
