//! Sliding window of request timestamps.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Timestamps of the requests sent inside the current rate-limit window.
///
/// Not synchronized on its own; the gate owns it behind its state lock.
#[derive(Debug)]
pub(crate) struct RequestWindow {
    timestamps: VecDeque<Instant>,
    capacity: usize,
    window_duration: Duration,
}

impl RequestWindow {
    pub(crate) fn new(capacity: usize, window_duration: Duration) -> Self {
        RequestWindow {
            timestamps: VecDeque::with_capacity(capacity),
            capacity,
            window_duration,
        }
    }

    /// Drops timestamps that have aged out of the window.
    ///
    /// A timestamp exactly `window_duration` old is already out, so a replay
    /// timer set for `oldest + window_duration` always finds room.
    pub(crate) fn evict(&mut self, now: Instant) {
        while let Some(front) = self.timestamps.front() {
            if now.saturating_duration_since(*front) >= self.window_duration {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records a dispatched request.
    pub(crate) fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    pub(crate) fn has_room(&self) -> bool {
        self.timestamps.len() < self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// When the oldest retained timestamp leaves the window.
    pub(crate) fn reopens_at(&self) -> Option<Instant> {
        self.timestamps
            .front()
            .map(|oldest| *oldest + self.window_duration)
    }
}
