//! # Job Poller
//!
//! Fixed-interval polling of a server-side job until it reaches a terminal
//! status or the caller cancels.
//!
//! The first status fetch is issued immediately. While the status is pending
//! the poller checks for cancellation, sleeps one interval, checks again, and
//! only then fetches. Checking on both sides of the sleep bounds the delay
//! before cancellation is honored to one interval and guarantees no request
//! goes out after cancellation was observed.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use super::states::PollResult;
use crate::context::OperationContext;
use crate::models::JobHandle;

#[derive(Debug, Clone, Copy)]
pub struct JobPoller {
    interval: Duration,
}

impl JobPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `fetch_status` until `is_pending` returns false
    ///
    /// Fetch errors are not retried; they propagate to the caller.
    pub async fn poll<S, E, F, Fut, P>(
        &self,
        handle: &JobHandle,
        ctx: &dyn OperationContext,
        mut fetch_status: F,
        is_pending: P,
    ) -> Result<PollResult<S>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<S, E>>,
        P: Fn(&S) -> bool,
    {
        if ctx.is_cancelled() {
            info!(job = %handle, "🛑 Cancelled before first status fetch");
            return Ok(PollResult::Cancelled);
        }

        let mut fetches: u32 = 1;
        let mut status = fetch_status().await?;

        while is_pending(&status) {
            if ctx.is_cancelled() {
                info!(job = %handle, fetches, "🛑 Polling cancelled");
                return Ok(PollResult::Cancelled);
            }

            tokio::time::sleep(self.interval).await;

            if ctx.is_cancelled() {
                info!(job = %handle, fetches, "🛑 Polling cancelled during wait");
                return Ok(PollResult::Cancelled);
            }

            status = fetch_status().await?;
            fetches += 1;
            debug!(job = %handle, fetches, "⏳ Job still pending check");
        }

        debug!(job = %handle, fetches, "✅ Job reached terminal status");
        Ok(PollResult::Terminal(status))
    }
}
