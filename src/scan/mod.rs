//! Distributed range-scan subsystem for keyspread
//!
//! A logical scan over original keys becomes N per-bucket physical scans
//! (see [`RangeSplitter`]), and their results are merged back into one
//! stream in original-key order (see [`MergeScanner`]). Callers see neither
//! the buckets nor the prefixes.

mod errors;
mod merge;
mod range;

pub use errors::{ScanError, ScanResult};
pub use merge::MergeScanner;
pub use range::{BucketScan, PhysicalScanRange, RangeSplitter, ScanRange};
