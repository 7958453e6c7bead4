//! Time source for the sliding window.

use tokio::time::Instant;

/// Monotonic time source consulted by the rate-limit gate.
///
/// Replay timers always run on tokio time, so an implementation should stay
/// in step with `tokio::time::Instant`.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Default clock backed by tokio's monotonic time.
///
/// Honours `tokio::time::pause`, which makes window tests deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
