//! Query statistics tracking.
//!
//! Thread-safe counters for query failures and scheduling events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorKind, GateEvent};

/// Thread-safe query statistics tracker.
///
/// Tracks failures by [`ErrorKind`] and scheduling decisions by
/// [`GateEvent`] using atomic counters. All keys are initialized to zero on
/// creation.
///
/// # Thread Safety
///
/// This struct is thread-safe and can be shared across multiple tasks using `Arc`.
#[derive(Debug)]
pub struct QueryStats {
    errors: HashMap<ErrorKind, AtomicUsize>,
    events: HashMap<GateEvent, AtomicUsize>,
}

impl QueryStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for kind in ErrorKind::iter() {
            errors.insert(kind, AtomicUsize::new(0));
        }

        let mut events = HashMap::new();
        for event in GateEvent::iter() {
            events.insert(event, AtomicUsize::new(0));
        }

        QueryStats { errors, events }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, kind: ErrorKind) {
        if let Some(counter) = self.errors.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map",
                kind
            );
        }
    }

    /// Increment a scheduling event counter.
    pub fn increment_event(&self, event: GateEvent) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment event counter for {:?} which is not in the map",
                event
            );
        }
    }

    /// Current count for one error kind.
    pub fn get_error_count(&self, kind: ErrorKind) -> usize {
        self.errors
            .get(&kind)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Current count for one scheduling event.
    pub fn get_event_count(&self, event: GateEvent) -> usize {
        self.events
            .get(&event)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum of all error counters.
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Logs every non-zero counter at info level.
    pub fn log_summary(&self) {
        for event in GateEvent::iter() {
            let count = self.get_event_count(event);
            if count > 0 {
                log::info!("{}: {}", event, count);
            }
        }
        for kind in ErrorKind::iter() {
            let count = self.get_error_count(kind);
            if count > 0 {
                log::info!("{}: {}", kind, count);
            }
        }
    }
}

impl Default for QueryStats {
    fn default() -> Self {
        Self::new()
    }
}
