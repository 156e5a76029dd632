//! # Capability Interfaces
//!
//! The engine talks to the identity-governance service only through these
//! traits. [`GovernanceApiClient`] implements all of them over HTTP; tests
//! substitute in-memory fakes.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{
    Campaign, Certification, CertificationReassignRequest, ConfigJobStatus, DecisionRequest,
    ExportOptions, ExportPayload, ImportOptions, ImportResult, ItemReassignRequest,
    ReminderRequest, ReviewItem, TaskStatus,
};

pub use client::GovernanceApiClient;
pub use error::{ApiError, ApiResult};

/// Certification campaign reads and bulk writes
#[async_trait]
pub trait CertificationApi: Send + Sync {
    async fn get_campaign(&self, campaign_id: &str) -> ApiResult<Campaign>;

    /// Certifications of the campaign that still await sign-off
    async fn list_pending_certifications(&self, campaign_id: &str)
        -> ApiResult<Vec<Certification>>;

    /// Review items of the certification without a decision yet
    async fn list_pending_review_items(&self, certification_id: &str)
        -> ApiResult<Vec<ReviewItem>>;

    async fn decide(&self, request: &DecisionRequest) -> ApiResult<()>;

    async fn reassign_items(&self, request: &ItemReassignRequest) -> ApiResult<()>;

    async fn reassign_certifications(&self, request: &CertificationReassignRequest)
        -> ApiResult<()>;

    async fn send_reminders(&self, request: &ReminderRequest) -> ApiResult<()>;
}

/// Identity and source lookups used by target resolvers
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// `None` when the identity has no manager
    async fn get_manager_id(&self, identity_id: &str) -> ApiResult<Option<String>>;

    /// `None` when the source has no owner
    async fn get_source_owner_id(&self, source_id: &str) -> ApiResult<Option<String>>;
}

/// Configuration export/import jobs
#[async_trait]
pub trait ConfigJobApi: Send + Sync {
    async fn submit_export(&self, options: &ExportOptions) -> ApiResult<ConfigJobStatus>;

    async fn get_export_status(&self, job_id: &str) -> ApiResult<ConfigJobStatus>;

    async fn download_export(&self, job_id: &str) -> ApiResult<ExportPayload>;

    async fn submit_import(
        &self,
        payload: &ExportPayload,
        options: &ImportOptions,
    ) -> ApiResult<ConfigJobStatus>;

    async fn get_import_status(&self, job_id: &str) -> ApiResult<ConfigJobStatus>;

    async fn download_import(&self, job_id: &str) -> ApiResult<ImportResult>;
}

/// Account aggregation tasks
#[async_trait]
pub trait AggregationApi: Send + Sync {
    async fn start_account_aggregation(&self, source_id: &str) -> ApiResult<TaskStatus>;

    async fn get_task_status(&self, task_id: &str) -> ApiResult<TaskStatus>;
}
