//! keyspread - deterministic row-key distribution for range-partitioned,
//! lexicographically sorted key-value stores
//!
//! Monotonic row keys concentrate load on one partition; keyspread spreads
//! them across N buckets with a fixed-width key prefix, then gives back
//! exact gets, ordered range scans ([`scan::MergeScanner`]), and parallel
//! batch plans ([`batch::WorkPlanner`]) over the original keys, transparent
//! to the caller.

pub mod batch;
pub mod distributor;
pub mod observability;
pub mod scan;
pub mod store;
