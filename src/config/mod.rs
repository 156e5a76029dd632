//! # Bulk Operations Configuration
//!
//! Typed configuration for the HTTP adapter, batch limits and poll intervals.
//!
//! ## Sources
//!
//! Values are layered by [`ConfigManager`]: built-in defaults, then an optional
//! TOML file, then `BULKOPS_`-prefixed environment variables (`__` separates
//! nested keys, e.g. `BULKOPS_BATCHING__DECISION_LIMIT=100`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bulkops_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let limit = manager.config().batching.decision_limit;
//! let interval = manager.config().polling.config_job_interval();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{http, limits, polling};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BulkOpsConfig {
    /// Identity-governance API endpoint
    pub api: ApiEndpointConfig,

    /// Per-call batch-size limits
    pub batching: BatchingConfig,

    /// Job poll intervals
    pub polling: PollingConfig,
}

/// API endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiEndpointConfig {
    /// Tenant API base URL (e.g., "<https://acme.api.identitynow.com>")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum re-sends of a rate-limited (HTTP 429) request
    pub max_retries: u32,
    /// Static bearer token; token issuance and refresh happen elsewhere
    pub access_token: Option<String>,
}

impl Default for ApiEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: http::DEFAULT_BASE_URL.to_string(),
            timeout_ms: http::DEFAULT_TIMEOUT_MS,
            max_retries: http::DEFAULT_MAX_RETRIES,
            access_token: None,
        }
    }
}

impl ApiEndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Batch-size limits, one per call family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchingConfig {
    /// Review items per decide call
    pub decision_limit: usize,
    /// Item or certification references per reassign call
    pub reassignment_limit: usize,
    /// Certification ids per reminder call
    pub reminder_limit: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            decision_limit: limits::DECISION_BATCH_LIMIT,
            reassignment_limit: limits::REASSIGNMENT_BATCH_LIMIT,
            reminder_limit: limits::REMINDER_BATCH_LIMIT,
        }
    }
}

/// Fixed poll intervals per job kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    pub config_job_interval_ms: u64,
    pub aggregation_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            config_job_interval_ms: polling::CONFIG_JOB_INTERVAL_MS,
            aggregation_interval_ms: polling::AGGREGATION_INTERVAL_MS,
        }
    }
}

impl PollingConfig {
    pub fn config_job_interval(&self) -> Duration {
        Duration::from_millis(self.config_job_interval_ms)
    }

    pub fn aggregation_interval(&self) -> Duration {
        Duration::from_millis(self.aggregation_interval_ms)
    }
}

impl BulkOpsConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        let limits = [
            ("batching.decision_limit", self.batching.decision_limit),
            ("batching.reassignment_limit", self.batching.reassignment_limit),
            ("batching.reminder_limit", self.batching.reminder_limit),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "batch limit must be greater than 0",
                ));
            }
        }

        let intervals = [
            (
                "polling.config_job_interval_ms",
                self.polling.config_job_interval_ms,
            ),
            (
                "polling.aggregation_interval_ms",
                self.polling.aggregation_interval_ms,
            ),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "poll interval must be greater than 0",
                ));
            }
        }

        if self.api.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "api.timeout_ms",
                "0",
                "request timeout must be greater than 0",
            ));
        }

        Url::parse(&self.api.base_url).map_err(|e| {
            ConfigurationError::invalid_value("api.base_url", &self.api.base_url, e.to_string())
        })?;

        Ok(())
    }
}
