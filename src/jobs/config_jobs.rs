//! # Configuration Export/Import Jobs
//!
//! Submits an export or import job, polls it at the configuration-job
//! interval, and downloads the result once the job is COMPLETE.
//!
//! Import results are flattened for operators: every per-type error becomes
//! one message and imported objects are listed by type. Any error fails the
//! whole import, but the failure message still lists what did import so the
//! operator knows what to clean up.

use std::collections::BTreeMap;
use tracing::{info, warn};

use super::poller::JobPoller;
use super::states::{JobState, PollResult};
use crate::api::ConfigJobApi;
use crate::config::PollingConfig;
use crate::context::OperationContext;
use crate::error::BulkOpsResult;
use crate::logging::log_job_operation;
use crate::models::{
    ConfigJobStatus, ExportOptions, ExportPayload, ImportMessage, ImportOptions, ImportResult,
    JobHandle, JobKind,
};

/// Terminal outcome of an export or import
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigJobOutcome<T> {
    Completed { status: ConfigJobStatus, result: T },
    /// `message` is the job's own message, or the flattened import errors
    Failed {
        status: ConfigJobStatus,
        message: String,
    },
    /// The caller stopped observing; the remote job may still finish
    Cancelled { job: JobHandle },
}

impl<T> ConfigJobOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Operator-facing digest of an import result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Imported object names by object type
    pub imported: BTreeMap<String, Vec<String>>,
    pub errors: Vec<String>,
    /// Logged as they are read; never fail the import
    pub warnings: Vec<String>,
}

impl ImportSummary {
    pub fn from_result(result: &ImportResult) -> Self {
        let mut summary = Self::default();

        for (object_type, type_result) in &result.results {
            summary.errors.extend(
                type_result
                    .errors
                    .iter()
                    .map(|e| import_message(object_type, e)),
            );
            summary.warnings.extend(
                type_result
                    .warnings
                    .iter()
                    .map(|w| import_message(object_type, w)),
            );

            if !type_result.imported_objects.is_empty() {
                let names = type_result
                    .imported_objects
                    .iter()
                    .map(|o| {
                        o.name
                            .clone()
                            .or_else(|| o.id.clone())
                            .unwrap_or_else(|| "<unnamed>".to_string())
                    })
                    .collect();
                summary.imported.insert(object_type.clone(), names);
            }
        }

        summary
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn imported_count(&self) -> usize {
        self.imported.values().map(Vec::len).sum()
    }

    /// `Successfully imported: ROLE: Admin; SOURCE: AD, Workday`, or `None`
    /// when nothing was imported
    pub fn success_message(&self) -> Option<String> {
        if self.imported.is_empty() {
            return None;
        }
        let groups: Vec<String> = self
            .imported
            .iter()
            .map(|(object_type, names)| format!("{object_type}: {}", names.join(", ")))
            .collect();
        Some(format!("Successfully imported: {}", groups.join("; ")))
    }

    /// Errors one per line, followed by the success line when present
    pub fn failure_message(&self) -> String {
        let mut lines = self.errors.clone();
        if let Some(success) = self.success_message() {
            lines.push(success);
        }
        lines.join("\n")
    }
}

pub struct ConfigJobOrchestrator<'a, A: ConfigJobApi + ?Sized> {
    api: &'a A,
    poller: JobPoller,
}

impl<'a, A: ConfigJobApi + ?Sized> ConfigJobOrchestrator<'a, A> {
    pub fn new(api: &'a A, polling: &PollingConfig) -> Self {
        Self {
            api,
            poller: JobPoller::new(polling.config_job_interval()),
        }
    }

    /// Export the selected object types and download the payload
    pub async fn export(
        &self,
        options: &ExportOptions,
        ctx: &dyn OperationContext,
    ) -> BulkOpsResult<ConfigJobOutcome<ExportPayload>> {
        let submitted = self.api.submit_export(options).await?;
        let handle = JobHandle::new(&submitted.job_id, JobKind::Export);
        info!(job = %handle, types = ?options.include_types, "📤 Export job submitted");

        let api = self.api;
        let job_id = submitted.job_id.as_str();
        let polled = self
            .poller
            .poll(
                &handle,
                ctx,
                move || api.get_export_status(job_id),
                |s: &ConfigJobStatus| s.status.is_pending(),
            )
            .await?;

        let status = match polled {
            PollResult::Terminal(status) => status,
            PollResult::Cancelled => {
                log_job_operation("export", &handle.id, "CANCELLED", None);
                return Ok(ConfigJobOutcome::Cancelled { job: handle });
            }
        };

        match status.status {
            JobState::Complete => {
                let result = self.api.download_export(&handle.id).await?;
                log_job_operation(
                    "export",
                    &handle.id,
                    "COMPLETE",
                    Some(&format!("{} objects", result.objects.len())),
                );
                Ok(ConfigJobOutcome::Completed { status, result })
            }
            _ => {
                let message = job_message(&status, &handle);
                log_job_operation("export", &handle.id, "FAILED", Some(&message));
                Ok(ConfigJobOutcome::Failed { status, message })
            }
        }
    }

    /// Import a payload and summarize what the service applied
    pub async fn import(
        &self,
        payload: &ExportPayload,
        options: &ImportOptions,
        ctx: &dyn OperationContext,
    ) -> BulkOpsResult<ConfigJobOutcome<ImportSummary>> {
        let submitted = self.api.submit_import(payload, options).await?;
        let handle = JobHandle::new(&submitted.job_id, JobKind::Import);
        info!(job = %handle, objects = payload.objects.len(), "📥 Import job submitted");

        let api = self.api;
        let job_id = submitted.job_id.as_str();
        let polled = self
            .poller
            .poll(
                &handle,
                ctx,
                move || api.get_import_status(job_id),
                |s: &ConfigJobStatus| s.status.is_pending(),
            )
            .await?;

        let status = match polled {
            PollResult::Terminal(status) => status,
            PollResult::Cancelled => {
                log_job_operation("import", &handle.id, "CANCELLED", None);
                return Ok(ConfigJobOutcome::Cancelled { job: handle });
            }
        };

        if status.status != JobState::Complete {
            let message = job_message(&status, &handle);
            log_job_operation("import", &handle.id, "FAILED", Some(&message));
            return Ok(ConfigJobOutcome::Failed { status, message });
        }

        let result = self.api.download_import(&handle.id).await?;
        let summary = ImportSummary::from_result(&result);
        for warning in &summary.warnings {
            warn!(job = %handle, "⚠️ Import warning: {}", warning);
        }

        if summary.has_errors() {
            warn!(
                job = %handle,
                errors = summary.errors.len(),
                imported = summary.imported_count(),
                "Import completed with errors"
            );
            let message = summary.failure_message();
            log_job_operation("import", &handle.id, "FAILED", Some(&message));
            return Ok(ConfigJobOutcome::Failed { status, message });
        }

        log_job_operation(
            "import",
            &handle.id,
            "COMPLETE",
            summary.success_message().as_deref(),
        );
        Ok(ConfigJobOutcome::Completed {
            status,
            result: summary,
        })
    }
}

/// `<TYPE> <key>: <text>`, dropping the key when the service sent none
fn import_message(object_type: &str, message: &ImportMessage) -> String {
    match &message.key {
        Some(key) => format!("{object_type} {key}: {}", message.text),
        None => format!("{object_type}: {}", message.text),
    }
}

fn job_message(status: &ConfigJobStatus, handle: &JobHandle) -> String {
    status
        .message
        .clone()
        .unwrap_or_else(|| format!("{handle} ended in {}", status.status))
}
