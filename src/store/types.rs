//! Store error definitions.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during a point read.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The read did not complete before its deadline.
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected the request for capacity reasons.
    #[error("throttled: {0}")]
    Throttled(String),

    /// The configured table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Network, authorization, or any other remote failure.
    #[error("remote error: {0}")]
    Remote(String),
}

impl StoreError {
    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Timeout(_) => "timeout",
            StoreError::Throttled(_) => "throttled",
            StoreError::TableNotFound(_) => "table_not_found",
            StoreError::Remote(_) => "remote",
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
