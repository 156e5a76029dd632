//! # Domain Models
//!
//! Item references, reports, certification records, job records and typed
//! request records. Nothing here is persisted; values live for one
//! coordinator invocation.

pub mod certification;
pub mod item;
pub mod jobs;
pub mod report;
pub mod requests;

pub use certification::{
    AccessSummary, Campaign, CampaignStatus, Certification, Decision, ReviewItem, Reviewer,
};
pub use item::{AccessKind, AccessRef, Assignable, ItemReference, TargetKey};
pub use jobs::{
    CompletionStatus, ConfigJobStatus, ConfigObject, ExportOptions, ExportPayload, ImportMessage,
    ImportOptions, ImportResult, ImportTypeResult, JobHandle, JobKind, ObjectFilter, ObjectRef,
    TaskStatus,
};
pub use report::{BulkOperationReport, BulkOutcome, NothingToDo, ReportOutcome};
pub use requests::{
    CertificationReassignRequest, DecisionRequest, ItemReassignRequest, ReminderRequest,
};
