//! Logical scan ranges and per-bucket physical splitting
//!
//! A caller thinks in original keys: scan `[start, stop)`, either bound
//! optional. Physically those rows are scattered across every bucket, so the
//! one logical range becomes exactly N physical sub-ranges, one per bucket.
//! A logical bound applies to every bucket at once: the physical lower bound
//! for bucket `b` is `prefix(b) ++ start` (the would-be physical key of the
//! start under that bucket), not the encoding of the start under its own
//! assigned bucket. Decoded, the N sub-ranges tile the logical range with no
//! gaps and no overlaps.

use std::sync::Arc;

use crate::distributor::KeyDistributor;

/// Optional original-key interval `[start, stop)`.
///
/// An absent bound is unbounded on that side. A start at or past the stop is
/// permitted and scans nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRange {
    start: Option<Vec<u8>>,
    stop: Option<Vec<u8>>,
}

impl ScanRange {
    /// The unbounded range: every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// `[start, stop)` over original keys.
    pub fn bounded(start: impl Into<Vec<u8>>, stop: impl Into<Vec<u8>>) -> Self {
        Self {
            start: Some(start.into()),
            stop: Some(stop.into()),
        }
    }

    /// `[start, ..)`: from a key to the end.
    pub fn starting_at(start: impl Into<Vec<u8>>) -> Self {
        Self {
            start: Some(start.into()),
            stop: None,
        }
    }

    /// `[.., stop)`: from the beginning up to a key.
    pub fn until(stop: impl Into<Vec<u8>>) -> Self {
        Self {
            start: None,
            stop: Some(stop.into()),
        }
    }

    /// Inclusive start bound, if any.
    pub fn start(&self) -> Option<&[u8]> {
        self.start.as_deref()
    }

    /// Exclusive stop bound, if any.
    pub fn stop(&self) -> Option<&[u8]> {
        self.stop.as_deref()
    }

    /// Whether an original key falls inside this range.
    pub fn contains(&self, original: &[u8]) -> bool {
        if let Some(start) = &self.start {
            if original < start.as_slice() {
                return false;
            }
        }
        if let Some(stop) = &self.stop {
            if original >= stop.as_slice() {
                return false;
            }
        }
        true
    }
}

/// One bucket's physical sub-range: `[start, stop)` over physical keys,
/// `stop == None` meaning to the end of the keyspace.
///
/// Built from a [`ScanRange`] plus the distributor configuration, immutable,
/// and consumed once by the store to open a physical iterator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalScanRange {
    start: Vec<u8>,
    stop: Option<Vec<u8>>,
}

impl PhysicalScanRange {
    /// Creates a physical range.
    pub fn new(start: Vec<u8>, stop: Option<Vec<u8>>) -> Self {
        Self { start, stop }
    }

    /// Inclusive physical start key.
    pub fn start(&self) -> &[u8] {
        &self.start
    }

    /// Exclusive physical stop key, `None` for end of keyspace.
    pub fn stop(&self) -> Option<&[u8]> {
        self.stop.as_deref()
    }
}

/// A bucket paired with its physical sub-range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketScan {
    /// Bucket id in `[0, N)`
    pub bucket: usize,
    /// The physical sub-range covering this bucket's slice of the scan
    pub range: PhysicalScanRange,
}

/// Splits one logical range into exactly N per-bucket physical sub-ranges.
#[derive(Clone)]
pub struct RangeSplitter {
    distributor: Arc<dyn KeyDistributor>,
}

impl RangeSplitter {
    /// Creates a splitter over the given distributor configuration.
    pub fn new(distributor: Arc<dyn KeyDistributor>) -> Self {
        Self { distributor }
    }

    /// Produces one [`BucketScan`] per bucket, in bucket order.
    ///
    /// Per bucket `b`:
    /// - start present: `prefix(b) ++ start`; absent: `prefix(b)` itself
    ///   (the floor of that bucket's key space)
    /// - stop present: `prefix(b) ++ stop`; absent: the lexicographic
    ///   successor of `prefix(b)` (the ceiling of that bucket's key space),
    ///   or end of keyspace when the prefix has no successor
    ///
    /// The sub-ranges are independent and safe to scan in parallel.
    pub fn split(&self, range: &ScanRange) -> Vec<BucketScan> {
        let count = self.distributor.bucket_count();
        let mut scans = Vec::with_capacity(count);
        for bucket in 0..count {
            let prefix = self.distributor.bucket_prefix(bucket);

            let start = match range.start() {
                Some(start) => {
                    let mut key = Vec::with_capacity(prefix.len() + start.len());
                    key.extend_from_slice(prefix);
                    key.extend_from_slice(start);
                    key
                }
                None => prefix.to_vec(),
            };

            let stop = match range.stop() {
                Some(stop) => {
                    let mut key = Vec::with_capacity(prefix.len() + stop.len());
                    key.extend_from_slice(prefix);
                    key.extend_from_slice(stop);
                    Some(key)
                }
                None => prefix_successor(prefix),
            };

            scans.push(BucketScan {
                bucket,
                range: PhysicalScanRange::new(start, stop),
            });
        }
        scans
    }
}

/// Smallest byte string lexicographically greater than every string that
/// starts with `prefix`, or `None` when the prefix is all `0xFF` and no such
/// bound exists.
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut successor = prefix.to_vec();
    while let Some(last) = successor.last_mut() {
        if *last == 0xFF {
            successor.pop();
        } else {
            *last += 1;
            return Some(successor);
        }
    }
    None
}
