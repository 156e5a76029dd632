//! # Account Aggregation
//!
//! Starts an account aggregation for a source and follows the resulting
//! task until it completes.

use tracing::info;

use super::poller::JobPoller;
use super::states::PollResult;
use crate::api::AggregationApi;
use crate::config::PollingConfig;
use crate::context::OperationContext;
use crate::error::BulkOpsResult;
use crate::logging::log_job_operation;
use crate::models::{JobHandle, JobKind, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum AggregationOutcome {
    Completed(TaskStatus),
    /// Task finished with a failing completion status; `message` joins the
    /// task's own messages
    Failed { status: TaskStatus, message: String },
    Cancelled { job: JobHandle },
}

pub struct AccountAggregationOrchestrator<'a, A: AggregationApi + ?Sized> {
    api: &'a A,
    poller: JobPoller,
}

impl<'a, A: AggregationApi + ?Sized> AccountAggregationOrchestrator<'a, A> {
    pub fn new(api: &'a A, polling: &PollingConfig) -> Self {
        Self {
            api,
            poller: JobPoller::new(polling.aggregation_interval()),
        }
    }

    pub async fn aggregate(
        &self,
        source_id: &str,
        ctx: &dyn OperationContext,
    ) -> BulkOpsResult<AggregationOutcome> {
        let started = self.api.start_account_aggregation(source_id).await?;
        let handle = JobHandle::new(&started.id, JobKind::Aggregation);
        info!(job = %handle, source_id = %source_id, "🔄 Account aggregation started");

        let api = self.api;
        let task_id = started.id.as_str();
        let polled = self
            .poller
            .poll(
                &handle,
                ctx,
                move || api.get_task_status(task_id),
                TaskStatus::is_pending,
            )
            .await?;

        let status = match polled {
            PollResult::Terminal(status) => status,
            PollResult::Cancelled => {
                log_job_operation("aggregation", &handle.id, "CANCELLED", None);
                return Ok(AggregationOutcome::Cancelled { job: handle });
            }
        };

        if status.completion_status.is_some_and(|c| c.is_failure()) {
            let message = failure_message(&status);
            log_job_operation("aggregation", &handle.id, "FAILED", Some(&message));
            return Ok(AggregationOutcome::Failed { status, message });
        }

        log_job_operation("aggregation", &handle.id, "COMPLETE", None);
        Ok(AggregationOutcome::Completed(status))
    }
}

fn failure_message(status: &TaskStatus) -> String {
    let texts: Vec<&str> = status
        .messages
        .iter()
        .map(|m| m.text())
        .filter(|t| !t.is_empty())
        .collect();

    if texts.is_empty() {
        format!("aggregation task {} failed", status.id)
    } else {
        texts.join("; ")
    }
}
