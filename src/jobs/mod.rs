//! # Asynchronous Job Orchestration
//!
//! Submit-then-poll workflows for server-side jobs: configuration
//! export/import and account aggregation, all driven by [`JobPoller`].

pub mod aggregation;
pub mod config_jobs;
pub mod poller;
pub mod states;

pub use aggregation::{AccountAggregationOrchestrator, AggregationOutcome};
pub use config_jobs::{ConfigJobOrchestrator, ConfigJobOutcome, ImportSummary};
pub use poller::JobPoller;
pub use states::{JobState, PollResult};
