//! Scan error types
//!
//! Everything the scan layer can fail with comes from below: a distributor
//! decode/config failure or an underlying iterator failure. Both are
//! wrapped, never retried, and an iteration failure additionally triggers
//! teardown of every sibling iterator before the error leaves the merge.

use thiserror::Error;

use crate::distributor::DistributorError;
use crate::store::StoreError;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors surfaced by range splitting and merge scanning
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Key encoding/decoding or configuration failure during a scan
    #[error("key distribution failure during scan: {0}")]
    Distributor(#[from] DistributorError),

    /// An underlying per-bucket iterator failed
    #[error("scan iteration failure: {0}")]
    Iteration(#[from] StoreError),
}

impl ScanError {
    /// Returns the stable string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::Distributor(err) => err.code(),
            ScanError::Iteration(_) => "KS_SCAN_ITERATION_FAILED",
        }
    }

    /// Whether the cause is a writer/reader configuration disagreement
    pub fn is_configuration_mismatch(&self) -> bool {
        matches!(
            self,
            ScanError::Distributor(DistributorError::ConfigurationMismatch { .. })
        )
    }
}
