//! Serialized, evenly spaced job dispatch.
//!
//! A [`StaggeredQueue`] runs one job at a time on a background task. The next
//! job starts only after the previous one settles and at least `delay` after
//! the previous dispatch. This smooths a burst of work; it does not enforce
//! the API's request ceiling, which is the gate's job.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use crate::error_handling::ExecutionError;

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// FIFO of zero-argument jobs processed one at a time.
///
/// Cloning is cheap; clones feed the same worker.
#[derive(Clone)]
pub struct StaggeredQueue {
    sender: mpsc::UnboundedSender<Job>,
    delay: Duration,
}

impl StaggeredQueue {
    /// Starts the worker task.
    ///
    /// Must be called from within a Tokio runtime. The worker exits once every
    /// clone of the queue has been dropped and the backlog is done.
    pub fn new(delay: Duration) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            let mut last_dispatch: Option<Instant> = None;
            while let Some(job) = receiver.recv().await {
                if let Some(last) = last_dispatch {
                    sleep_until(last + delay).await;
                }
                last_dispatch = Some(Instant::now());
                job().await;
            }
            log::debug!("Staggered queue worker shutting down");
        });

        StaggeredQueue { sender, delay }
    }

    /// Minimum spacing between dispatches.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Enqueues `job` and returns a handle resolving to its output.
    pub fn add<F, Fut, T>(&self, job: F) -> StaggeredHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let boxed: Job = Box::new(move || {
            async move {
                // The handle may have been dropped; the job still ran
                let _ = tx.send(job().await);
            }
            .boxed()
        });

        if self.sender.send(boxed).is_err() {
            log::warn!("Staggered queue worker is gone; job dropped");
        }
        StaggeredHandle { receiver: rx }
    }
}

/// Resolves to the output of a job added to a [`StaggeredQueue`].
///
/// Yields [`ExecutionError::Abandoned`] if the worker stopped (for example
/// because an earlier job panicked) before this job ran.
#[must_use = "a StaggeredHandle does nothing unless awaited"]
pub struct StaggeredHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> Future for StaggeredHandle<T> {
    type Output = Result<T, ExecutionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| ExecutionError::Abandoned))
    }
}
