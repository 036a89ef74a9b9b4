//! Parallel work planning for batch processing
//!
//! Offline jobs do not want one merged stream; they want N independent
//! pieces of work that a batch framework can schedule on separate workers.
//! The planner wraps each per-bucket physical sub-range as a [`WorkUnit`]
//! carrying the distributor handle, so every worker decodes its own rows
//! with no shared mutable state and no cross-unit ordering guarantee.
//!
//! Cancelling one unit affects only that unit's iterator; sibling units are
//! untouched.

use std::sync::Arc;

use crate::distributor::{DistributorConfig, KeyDistributor};
use crate::observability::{log_event_with_fields, Event};
use crate::scan::{PhysicalScanRange, RangeSplitter, ScanRange, ScanResult};
use crate::store::{BoxRowIterator, Row, ScanSource};

/// Turns a logical scan range into independent per-bucket work units.
#[derive(Clone)]
pub struct WorkPlanner {
    distributor: Arc<dyn KeyDistributor>,
}

impl WorkPlanner {
    /// Creates a planner over the given distributor configuration.
    pub fn new(distributor: Arc<dyn KeyDistributor>) -> Self {
        Self { distributor }
    }

    /// Produces exactly one [`WorkUnit`] per bucket, in bucket order.
    ///
    /// Units are `Send` and own no shared mutable state; the union of rows
    /// they read equals exactly what a single [`crate::scan::MergeScanner`]
    /// over the same range would emit.
    pub fn plan(&self, range: &ScanRange) -> Vec<WorkUnit> {
        let splitter = RangeSplitter::new(Arc::clone(&self.distributor));
        let units: Vec<WorkUnit> = splitter
            .split(range)
            .into_iter()
            .map(|split| WorkUnit {
                bucket: split.bucket,
                range: split.range,
                distributor: Arc::clone(&self.distributor),
            })
            .collect();

        log_event_with_fields(Event::PlanCreated, &[("units", &units.len().to_string())]);
        units
    }
}

/// One bucket's slice of a batch job: bucket id, physical range, and the
/// distributor metadata a downstream reader needs to decode rows.
#[derive(Clone)]
pub struct WorkUnit {
    bucket: usize,
    range: PhysicalScanRange,
    distributor: Arc<dyn KeyDistributor>,
}

impl WorkUnit {
    /// Bucket this unit covers.
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Physical sub-range this unit scans.
    pub fn range(&self) -> &PhysicalScanRange {
        &self.range
    }

    /// Serializable distributor parameters, for readers in other processes.
    pub fn distributor_params(&self) -> DistributorConfig {
        self.distributor.params()
    }

    /// Opens this unit's scan, yielding rows with decoded original keys.
    pub fn open(&self, source: &dyn ScanSource) -> ScanResult<WorkUnitReader> {
        let iter = source.open_scan(&self.range)?;
        Ok(WorkUnitReader {
            iter: Some(iter),
            distributor: Arc::clone(&self.distributor),
        })
    }

    /// Counts the rows present in this unit's range.
    ///
    /// Rows with empty values are skipped, matching the store's notion of a
    /// logically deleted/empty row. Used to verify batch runs against a
    /// merged scan of the same range.
    pub fn count_rows(&self, source: &dyn ScanSource) -> ScanResult<u64> {
        let mut reader = self.open(source)?;
        let mut count = 0;
        while let Some(row) = reader.next_row()? {
            if !row.is_empty_value() {
                count += 1;
            }
        }
        reader.close()?;
        Ok(count)
    }
}

/// Reader over one work unit's rows, translating keys back to originals.
///
/// Rows come out in original-key order *within this unit only*; ordering
/// across units is neither guaranteed nor required for batch aggregation.
pub struct WorkUnitReader {
    /// `None` once closed
    iter: Option<BoxRowIterator>,
    distributor: Arc<dyn KeyDistributor>,
}

impl WorkUnitReader {
    /// Returns the next row with its original key, or `None` at end.
    ///
    /// On any failure the underlying iterator is closed before the error
    /// propagates.
    pub fn next_row(&mut self) -> ScanResult<Option<Row>> {
        let Some(iter) = self.iter.as_mut() else {
            return Ok(None);
        };
        match iter.next_row() {
            Ok(Some(mut row)) => match self.distributor.decode(&row.key) {
                Ok(original_key) => {
                    row.key = original_key;
                    Ok(Some(row))
                }
                Err(err) => {
                    self.teardown();
                    Err(err.into())
                }
            },
            Ok(None) => {
                self.teardown();
                Ok(None)
            }
            Err(err) => {
                self.teardown();
                Err(err.into())
            }
        }
    }

    /// Releases the underlying iterator. Idempotent.
    pub fn close(&mut self) -> ScanResult<()> {
        if let Some(mut iter) = self.iter.take() {
            iter.close().map_err(Into::into)
        } else {
            Ok(())
        }
    }

    fn teardown(&mut self) {
        if let Some(mut iter) = self.iter.take() {
            let _ = iter.close();
        }
    }
}

impl Drop for WorkUnitReader {
    fn drop(&mut self) {
        self.teardown();
    }
}
