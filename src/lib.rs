#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # bulkops-core
//!
//! Batched bulk operations and asynchronous job orchestration for an
//! identity-governance service.
//!
//! ## Overview
//!
//! The governance API accepts bulk writes only in size-limited calls and
//! throttles them per tenant. This crate turns campaign-level requests
//! ("approve everything pending", "escalate to managers") into ordered,
//! strictly sequential batches, and follows long-running server jobs
//! (configuration export/import, account aggregation) until they finish.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Batcher, executor, planner, resolvers and coordinator
//! - [`jobs`] - Job poller and the export/import/aggregation orchestrators
//! - [`api`] - Capability traits and the reqwest-based HTTP client
//! - [`models`] - Item references, reports, campaign and job records
//! - [`context`] - Cancellation and progress seam
//! - [`config`] - Layered configuration loading
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulkops_core::api::GovernanceApiClient;
//! use bulkops_core::config::ConfigManager;
//! use bulkops_core::context::TokenContext;
//! use bulkops_core::models::Decision;
//! use bulkops_core::orchestration::BulkOperationCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! bulkops_core::logging::init_structured_logging();
//!
//! let manager = ConfigManager::load()?;
//! let client = GovernanceApiClient::new(manager.config().api.clone())?;
//! let ctx = TokenContext::new();
//!
//! let coordinator = BulkOperationCoordinator::new(&client, manager.config().batching, &ctx);
//! let outcome = coordinator
//!     .decide_campaign("campaign-1", Decision::Approve, "Quarterly sign-off")
//!     .await?;
//!
//! if let Some(report) = outcome.report() {
//!     println!("{}", report.summary());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod orchestration;

pub use api::{ApiError, ApiResult, GovernanceApiClient};
pub use config::{BulkOpsConfig, ConfigManager};
pub use context::{OperationContext, TokenContext};
pub use error::{BulkOpsError, BulkOpsResult};
pub use jobs::{
    AccountAggregationOrchestrator, ConfigJobOrchestrator, ConfigJobOutcome, JobPoller, JobState,
    PollResult,
};
pub use models::{BulkOperationReport, BulkOutcome, ItemReference, TargetKey};
pub use orchestration::{BulkOperationCoordinator, RateLimitedExecutor, ReassignmentPlanner};
