//! Storage-engine collaborator boundary
//!
//! keyspread does not implement a storage engine; it consumes one. This
//! module pins down exactly what is consumed: a way to open a physical-range
//! scan ([`ScanSource`]) yielding rows in ascending physical-key order
//! ([`RowIterator`]). Point put/get operations need no abstraction of their
//! own; callers use them unchanged with keys run through the distributor.
//!
//! [`MemoryStore`] is the in-process reference implementation used by the
//! test suite and by examples in place of a live cluster.

mod errors;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

use crate::scan::PhysicalScanRange;

/// One stored row.
///
/// `key` is whatever the producing layer says it is: physical when read
/// straight off a [`RowIterator`], original once the scan layer has
/// translated it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Row key
    pub key: Vec<u8>,
    /// Row value; empty means logically deleted/empty for counting purposes
    pub value: Vec<u8>,
}

impl Row {
    /// Creates a row
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this row carries no value (skipped by row counters)
    pub fn is_empty_value(&self) -> bool {
        self.value.is_empty()
    }
}

/// Pull-based iterator over rows in ascending physical-key order.
///
/// `Send` so batch work units can run each iterator on its own worker.
pub trait RowIterator: Send {
    /// Returns the next row, or `None` at end of range.
    fn next_row(&mut self) -> StoreResult<Option<Row>>;

    /// Releases the underlying scan resources. Idempotent.
    fn close(&mut self) -> StoreResult<()>;
}

/// Boxed iterator handle as handed out by [`ScanSource`]
pub type BoxRowIterator = Box<dyn RowIterator>;

/// Capability to open physical-range scans.
///
/// The engine's own ordering guarantee is assumed: every iterator yields
/// rows in ascending physical-key order. Timeouts and retries are the
/// engine's business; keyspread only cleans up after itself.
pub trait ScanSource: Send + Sync {
    /// Opens a scan over one physical sub-range.
    fn open_scan(&self, range: &PhysicalScanRange) -> StoreResult<BoxRowIterator>;
}
