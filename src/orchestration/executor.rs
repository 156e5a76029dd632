//! # Rate-Limited Executor
//!
//! Runs one unit of work per batch, strictly one after another. The service
//! throttles bulk endpoints per tenant, so a batch is only started once the
//! previous batch's call has settled.
//!
//! Failures are absorbed into the report and the run moves on to the next
//! batch. Cancellation is checked before every batch; once observed, the
//! remaining batches are skipped and the partial report is returned.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::batcher::Batch;
use crate::context::OperationContext;
use crate::models::BulkOperationReport;

/// Snapshot handed to progress callbacks after each batch settles
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProgress {
    pub label: String,
    /// 1-based position of the batch that just settled
    pub index: usize,
    pub count: usize,
    pub batch_size: usize,
    pub succeeded: bool,
    /// Running totals including this batch
    pub success_count: usize,
    pub error_count: usize,
    /// This batch's share of the whole run, `100 / run_batch_count`
    pub increment_percent: f64,
}

impl fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} batch {}/{}: {} succeeded, {} failed",
            self.label, self.index, self.count, self.success_count, self.error_count
        )
    }
}

pub type ProgressCallback = Arc<dyn Fn(&BatchProgress) + Send + Sync>;

pub struct RateLimitedExecutor<'a> {
    label: String,
    ctx: &'a dyn OperationContext,
    on_progress: Option<ProgressCallback>,
    run_batch_count: Option<usize>,
}

impl<'a> RateLimitedExecutor<'a> {
    pub fn new(label: impl Into<String>, ctx: &'a dyn OperationContext) -> Self {
        Self {
            label: label.into(),
            ctx,
            on_progress: None,
            run_batch_count: None,
        }
    }

    pub fn with_progress(mut self, callback: Option<ProgressCallback>) -> Self {
        self.on_progress = callback;
        self
    }

    /// Batches across every executor of one bulk run
    ///
    /// Progress increments are shares of this total, so a run split over
    /// several executors still adds up to 100. Defaults to this executor's
    /// own batch count.
    pub fn with_run_batch_count(mut self, total: usize) -> Self {
        self.run_batch_count = Some(total);
        self
    }

    /// Run `unit_of_work` once per batch, in order
    ///
    /// Without cancellation `success_count + error_count` equals the total
    /// number of items across `batches`.
    pub async fn run<T, E, F, Fut>(
        &self,
        batches: Vec<Batch<T>>,
        mut unit_of_work: F,
    ) -> BulkOperationReport
    where
        F: FnMut(Batch<T>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let mut report = BulkOperationReport::new();
        let total = batches.len();

        for batch in batches {
            if self.ctx.is_cancelled() {
                info!(
                    label = %self.label,
                    next_batch = batch.index,
                    batch_count = total,
                    "🛑 Cancellation requested, skipping remaining batches"
                );
                report.cancelled = true;
                return report;
            }

            let index = batch.index;
            let count = batch.count;
            let size = batch.len();
            debug!(label = %self.label, batch = index, batch_count = count, size, "📦 Submitting batch");

            let succeeded = match unit_of_work(batch).await {
                Ok(()) => {
                    report.record_success(size);
                    true
                }
                Err(error) => {
                    let message = format!(
                        "{} batch {index}/{count} ({size} items) failed: {error}",
                        self.label
                    );
                    warn!(label = %self.label, batch = index, size, error = %error, "❌ Batch failed");
                    report.record_failure(size, message);
                    false
                }
            };

            let run_batches = self.run_batch_count.unwrap_or(count).max(1);
            let progress = BatchProgress {
                label: self.label.clone(),
                index,
                count,
                batch_size: size,
                succeeded,
                success_count: report.success_count,
                error_count: report.error_count,
                increment_percent: 100.0 / run_batches as f64,
            };
            self.ctx
                .report_progress(&progress.to_string(), progress.increment_percent);
            if let Some(callback) = &self.on_progress {
                callback(&progress);
            }
        }

        report
    }
}
