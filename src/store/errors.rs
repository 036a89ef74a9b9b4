//! Store collaborator error types
//!
//! The core never retries a store failure; whatever the engine reports is
//! surfaced synchronously at the call that triggered it, and the scan layer
//! tears its own resources down before propagating.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by the storage-engine collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// I/O failure while opening or advancing a scan
    #[error("store i/o failure: {reason}")]
    Io {
        /// Engine-reported cause
        reason: String,
    },

    /// The store rejected the requested physical range
    #[error("scan range rejected by store: {reason}")]
    InvalidRange {
        /// Why the range was rejected
        reason: String,
    },
}

impl StoreError {
    /// Create an I/O failure
    pub fn io(reason: impl Into<String>) -> Self {
        Self::Io {
            reason: reason.into(),
        }
    }

    /// Create an invalid-range failure
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Returns the stable string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "KS_STORE_IO",
            StoreError::InvalidRange { .. } => "KS_STORE_INVALID_RANGE",
        }
    }
}
