//! Windowed bounded-concurrency executor.
//!
//! Items are processed in consecutive windows of `limit`. Every item of a
//! window runs concurrently; the next window starts only after the current
//! one has fully settled, so at most `limit` calls are ever in flight.
//! A worker that returns `Err` contributes nothing and never aborts the run.

use crate::error::{Error, Result};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Executor for fan-out against rate-limited services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    limit: usize,
}

impl BatchScheduler {
    /// Scheduler with the given window size (clamped to at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Window size.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Apply `worker` to every item, keeping successful outputs in item order.
    pub async fn run<I, T, F, Fut>(&self, items: impl IntoIterator<Item = I>, worker: F) -> Vec<T>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut items = items.into_iter().peekable();
        let mut settled = Vec::new();

        while items.peek().is_some() {
            let window: Vec<Fut> = items.by_ref().take(self.limit).map(&worker).collect();

            for outcome in join_all(window).await {
                match outcome {
                    Ok(value) => settled.push(value),
                    Err(e) => debug!(error = %e, "batch item failed"),
                }
            }
        }

        settled
    }
}

/// Await `call`, dropping it (and so cancelling it) once `timeout` elapses.
pub async fn with_deadline<T, Fut>(operation: &'static str, timeout: Duration, call: Fut) -> Result<T>
where
    Fut: Future<Output = vetter_info::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Timeout { operation, timeout }),
    }
}
