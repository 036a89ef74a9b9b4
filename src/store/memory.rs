//! In-memory reference store
//!
//! A `BTreeMap` under an `RwLock`: lexicographic key order for free, shared
//! reads for parallel work units. Scans snapshot the requested range at open
//! time, so an open iterator is unaffected by later writes (the same
//! isolation a real engine's scanner would give per-region).

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::{BoxRowIterator, Row, RowIterator, ScanSource};
use crate::scan::PhysicalScanRange;

/// Sorted in-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a row under a physical key.
    pub fn put(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> StoreResult<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::io("store lock poisoned"))?;
        rows.insert(key.into(), value.into());
        Ok(())
    }

    /// Point lookup by physical key.
    pub fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::io("store lock poisoned"))?;
        Ok(rows.get(key).cloned())
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScanSource for MemoryStore {
    fn open_scan(&self, range: &PhysicalScanRange) -> StoreResult<BoxRowIterator> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::io("store lock poisoned"))?;

        // An inverted range scans nothing rather than erroring; splitters
        // legitimately produce empty sub-ranges for empty logical ranges.
        let snapshot: Vec<Row> = match range.stop() {
            Some(stop) if stop < range.start() => Vec::new(),
            Some(stop) => rows
                .range::<[u8], _>((
                    Bound::Included(range.start()),
                    Bound::Excluded(stop),
                ))
                .map(|(k, v)| Row::new(k.clone(), v.clone()))
                .collect(),
            None => rows
                .range::<[u8], _>((Bound::Included(range.start()), Bound::Unbounded))
                .map(|(k, v)| Row::new(k.clone(), v.clone()))
                .collect(),
        };

        Ok(Box::new(MemoryScan {
            rows: snapshot.into_iter(),
        }))
    }
}

/// Iterator over a snapshotted range.
struct MemoryScan {
    rows: std::vec::IntoIter<Row>,
}

impl RowIterator for MemoryScan {
    fn next_row(&mut self) -> StoreResult<Option<Row>> {
        Ok(self.rows.next())
    }

    fn close(&mut self) -> StoreResult<()> {
        // Drop any unconsumed snapshot rows.
        self.rows = Vec::new().into_iter();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &[u8], stop: Option<&[u8]>) -> PhysicalScanRange {
        PhysicalScanRange::new(start.to_vec(), stop.map(|s| s.to_vec()))
    }

    #[test]
    fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        store.put(b"k1".to_vec(), b"v1".to_vec()).unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.get(b"k2").unwrap(), None);
    }

    #[test]
    fn test_put_replaces() {
        let store = MemoryStore::new();
        store.put(b"k".to_vec(), b"old".to_vec()).unwrap();
        store.put(b"k".to_vec(), b"new".to_vec()).unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_scan_bounded_in_order() {
        let store = MemoryStore::new();
        for k in [&b"c"[..], b"a", b"e", b"b", b"d"] {
            store.put(k.to_vec(), b"v".to_vec()).unwrap();
        }

        let mut scan = store.open_scan(&range(b"b", Some(b"e"))).unwrap();
        let mut keys = Vec::new();
        while let Some(row) = scan.next_row().unwrap() {
            keys.push(row.key);
        }
        assert_eq!(keys, vec![b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn test_scan_unbounded_stop() {
        let store = MemoryStore::new();
        store.put(b"a".to_vec(), b"v".to_vec()).unwrap();
        store.put(b"z".to_vec(), b"v".to_vec()).unwrap();

        let mut scan = store.open_scan(&range(b"b", None)).unwrap();
        let row = scan.next_row().unwrap().unwrap();
        assert_eq!(row.key, b"z".to_vec());
        assert!(scan.next_row().unwrap().is_none());
    }

    #[test]
    fn test_scan_snapshot_isolated_from_writes() {
        let store = MemoryStore::new();
        store.put(b"a".to_vec(), b"v".to_vec()).unwrap();

        let mut scan = store.open_scan(&range(b"a", None)).unwrap();
        store.put(b"b".to_vec(), b"v".to_vec()).unwrap();

        assert!(scan.next_row().unwrap().is_some());
        assert!(scan.next_row().unwrap().is_none());
    }

    #[test]
    fn test_inverted_range_scans_nothing() {
        let store = MemoryStore::new();
        store.put(b"m".to_vec(), b"v".to_vec()).unwrap();

        let mut scan = store.open_scan(&range(b"z", Some(b"a"))).unwrap();
        assert!(scan.next_row().unwrap().is_none());
    }

    #[test]
    fn test_close_idempotent() {
        let store = MemoryStore::new();
        store.put(b"a".to_vec(), b"v".to_vec()).unwrap();

        let mut scan = store.open_scan(&range(b"a", None)).unwrap();
        scan.close().unwrap();
        scan.close().unwrap();
        assert!(scan.next_row().unwrap().is_none());
    }

    #[test]
    fn test_empty_value_row_flagged() {
        let row = Row::new(b"k".to_vec(), Vec::new());
        assert!(row.is_empty_value());
        let row = Row::new(b"k".to_vec(), b"v".to_vec());
        assert!(!row.is_empty_value());
    }
}
