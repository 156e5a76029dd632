//! # System Constants
//!
//! Defaults for batch limits and poll intervals observed against the
//! identity-governance service. Every value here can be overridden through
//! [`BulkOpsConfig`](crate::config::BulkOpsConfig).

/// Batch-size limits accepted by the service per call
pub mod limits {
    /// Maximum review items per decide call
    pub const DECISION_BATCH_LIMIT: usize = 250;

    /// Maximum item or certification references per reassign call
    pub const REASSIGNMENT_BATCH_LIMIT: usize = 50;

    /// Maximum certification ids per reminder call
    pub const REMINDER_BATCH_LIMIT: usize = 250;

    /// Page size used when listing certifications and review items
    pub const LIST_PAGE_SIZE: usize = 250;
}

/// Fixed poll intervals per job kind
pub mod polling {
    /// Export/import job status interval
    pub const CONFIG_JOB_INTERVAL_MS: u64 = 1_000;

    /// Account aggregation task status interval
    pub const AGGREGATION_INTERVAL_MS: u64 = 5_000;
}

/// HTTP client defaults
pub mod http {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    /// Maximum re-sends of a request the service rejected with HTTP 429
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Wait applied when a 429 response carries no usable `Retry-After`
    pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;
}

/// Environment variables read by configuration and logging
pub mod env {
    pub const CONFIG_PATH: &str = "BULKOPS_CONFIG";
    pub const ENVIRONMENT: &str = "BULKOPS_ENV";
    pub const LOG_FORMAT: &str = "BULKOPS_LOG_FORMAT";
    pub const OVERRIDE_PREFIX: &str = "BULKOPS";
}
