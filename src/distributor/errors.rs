//! Distributor error types
//!
//! Two failure classes are kept strictly apart:
//!
//! - `InvalidKey`: a single bad input (empty original key, physical key
//!   shorter than the prefix width). Local to one call.
//! - `ConfigurationMismatch`: the physical key was produced under a
//!   different distributor configuration (different bucket count or prefix
//!   scheme), or the configuration itself is unusable. This implies a
//!   systemic writer/reader disagreement, not a single bad key, so it must
//!   never be collapsed into `InvalidKey`.

use thiserror::Error;

/// Result type for distributor operations
pub type DistributorResult<T> = Result<T, DistributorError>;

/// Errors raised by key encoding, decoding, and distributor construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributorError {
    /// Malformed key passed to encode or decode
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// What made the key unusable
        reason: String,
    },

    /// Writer and reader disagree on the distribution scheme
    #[error("distributor configuration mismatch: {reason}")]
    ConfigurationMismatch {
        /// What disagreed
        reason: String,
    },
}

impl DistributorError {
    /// Create an invalid-key error
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    /// Create a configuration-mismatch error
    pub fn mismatch(reason: impl Into<String>) -> Self {
        Self::ConfigurationMismatch {
            reason: reason.into(),
        }
    }

    /// Returns the stable string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DistributorError::InvalidKey { .. } => "KS_KEY_INVALID",
            DistributorError::ConfigurationMismatch { .. } => "KS_CONFIG_MISMATCH",
        }
    }

    /// Returns whether this error signals a writer/reader configuration
    /// disagreement rather than a single bad key
    pub fn is_configuration_mismatch(&self) -> bool {
        matches!(self, DistributorError::ConfigurationMismatch { .. })
    }
}
