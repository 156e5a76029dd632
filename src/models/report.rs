//! Bulk operation reports and run outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregated success/failure tally of a bulk run
///
/// Without cancellation, `success_count + error_count` equals the number of
/// items submitted, unresolved items included as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperationReport {
    pub success_count: usize,
    pub error_count: usize,
    pub error_messages: Vec<String>,
    /// Set when the run stopped early at the caller's request
    pub cancelled: bool,
}

/// How an operator should read a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    /// Nothing was processed
    Empty,
    AllSucceeded,
    AllFailed,
    PartialSuccess,
}

impl BulkOperationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, count: usize) {
        self.success_count += count;
    }

    pub fn record_failure(&mut self, count: usize, message: impl Into<String>) {
        self.error_count += count;
        self.error_messages.push(message.into());
    }

    /// Fold another report into this one; cancellation is sticky
    pub fn merge(&mut self, other: BulkOperationReport) {
        self.success_count += other.success_count;
        self.error_count += other.error_count;
        self.error_messages.extend(other.error_messages);
        self.cancelled |= other.cancelled;
    }

    pub fn processed(&self) -> usize {
        self.success_count + self.error_count
    }

    pub fn outcome(&self) -> ReportOutcome {
        match (self.success_count, self.error_count) {
            (0, 0) => ReportOutcome::Empty,
            (_, 0) => ReportOutcome::AllSucceeded,
            (0, _) => ReportOutcome::AllFailed,
            _ => ReportOutcome::PartialSuccess,
        }
    }

    /// One-line operator summary
    pub fn summary(&self) -> String {
        let mut line = match self.outcome() {
            ReportOutcome::Empty => "No items were processed".to_string(),
            ReportOutcome::AllSucceeded => format!("All {} items succeeded", self.success_count),
            ReportOutcome::AllFailed => format!("All {} items failed", self.error_count),
            ReportOutcome::PartialSuccess => format!(
                "{} items succeeded, {} items failed",
                self.success_count, self.error_count
            ),
        };
        if self.cancelled {
            line.push_str(" (cancelled before completion)");
        }
        line
    }
}

/// Why a bulk run had nothing to submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum NothingToDo {
    /// The campaign is already in a terminal state
    CampaignClosed { campaign_id: String, status: String },
    NoPendingCertifications { campaign_id: String },
    NoPendingItems { campaign_id: String },
}

impl fmt::Display for NothingToDo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CampaignClosed {
                campaign_id,
                status,
            } => write!(f, "Campaign {campaign_id} is already {status}"),
            Self::NoPendingCertifications { campaign_id } => {
                write!(f, "Campaign {campaign_id} has no pending certifications")
            }
            Self::NoPendingItems { campaign_id } => {
                write!(f, "Campaign {campaign_id} has no pending review items")
            }
        }
    }
}

/// Result of one coordinator use case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Completed(BulkOperationReport),
    /// Stopped early; the report covers only the batches that ran
    Cancelled(BulkOperationReport),
    NothingToDo(NothingToDo),
}

impl BulkOutcome {
    pub(crate) fn from_report(report: BulkOperationReport) -> Self {
        if report.cancelled {
            Self::Cancelled(report)
        } else {
            Self::Completed(report)
        }
    }

    pub fn report(&self) -> Option<&BulkOperationReport> {
        match self {
            Self::Completed(report) | Self::Cancelled(report) => Some(report),
            Self::NothingToDo(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
