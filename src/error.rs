//! Error types for the bulk-operation engine.
//!
//! Per-batch and per-item failures never surface here; they are absorbed into
//! [`BulkOperationReport`](crate::models::BulkOperationReport). What remains are
//! programmer errors (invalid limits, missing mandatory input) and faults that
//! occur before any batch is submitted.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigurationError;

#[derive(Debug, Error)]
pub enum BulkOpsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl BulkOpsError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type BulkOpsResult<T> = std::result::Result<T, BulkOpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BulkOpsError::invalid_configuration("batch limit must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: batch limit must be at least 1"
        );

        let err: BulkOpsError = ApiError::status(429, "Too Many Requests").into();
        assert_eq!(err.to_string(), "API error: HTTP 429: Too Many Requests");
    }
}
