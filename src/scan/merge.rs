//! Ordered merge over per-bucket scans
//!
//! Each bucket's iterator yields rows in physical-key order, which within a
//! bucket is original-key order. Merging N such streams back into global
//! original-key order is a k-way merge: hold one buffered head row per live
//! iterator, emit the minimum decoded key, refill that iterator.
//!
//! Resource discipline:
//! - all N iterators are opened eagerly at construction, so concurrent
//!   resource usage is bounded at exactly N open range scans
//! - the scanner exclusively owns its children and closes every still-open
//!   one exactly once, on normal exhaustion, early close, drop, or error
//! - any child error aborts the merge, tears the siblings down, and
//!   propagates; nothing is retried or partially returned

use std::sync::Arc;

use super::errors::ScanResult;
use super::range::{RangeSplitter, ScanRange};
use crate::distributor::KeyDistributor;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::store::{BoxRowIterator, Row, ScanSource};

/// One child iterator with its buffered head row.
struct ChildScan {
    bucket: usize,
    /// `None` once exhausted or closed
    iter: Option<BoxRowIterator>,
    /// Next undelivered row, key already decoded
    head: Option<BufferedRow>,
}

struct BufferedRow {
    original_key: Vec<u8>,
    row: Row,
}

/// Single iterator of rows in ascending original-key order, merged from one
/// physical scan per bucket.
///
/// Emitted rows carry the original key; the bucket prefix never escapes this
/// layer. Ties between buckets (possible only if a distributor places one
/// original key in several buckets by construction) break toward the lower
/// bucket id, deterministically.
///
/// Pull-based and synchronous: `next_row` may block on the slowest child's
/// I/O. Fan-out across buckets belongs to the batch layer, not here.
pub struct MergeScanner {
    distributor: Arc<dyn KeyDistributor>,
    children: Vec<ChildScan>,
    closed: bool,
    emitted: u64,
}

impl MergeScanner {
    /// Opens one physical scan per bucket and primes the merge.
    ///
    /// If any open or first pull fails, every already-open child is closed
    /// before the error is returned.
    pub fn open(
        source: &dyn ScanSource,
        distributor: Arc<dyn KeyDistributor>,
        range: &ScanRange,
    ) -> ScanResult<Self> {
        let splitter = RangeSplitter::new(Arc::clone(&distributor));
        let splits = splitter.split(range);

        let mut children: Vec<ChildScan> = Vec::with_capacity(splits.len());
        for split in splits {
            match source.open_scan(&split.range) {
                Ok(iter) => children.push(ChildScan {
                    bucket: split.bucket,
                    iter: Some(iter),
                    head: None,
                }),
                Err(err) => {
                    for child in &mut children {
                        if let Some(mut iter) = child.iter.take() {
                            let _ = iter.close();
                        }
                    }
                    log_event_with_fields(
                        Event::IteratorFailure,
                        &[("bucket", &split.bucket.to_string()), ("error", &err.to_string())],
                    );
                    return Err(err.into());
                }
            }
        }

        let mut scanner = Self {
            distributor,
            children,
            closed: false,
            emitted: 0,
        };
        for idx in 0..scanner.children.len() {
            scanner.advance(idx)?;
        }

        log_event_with_fields(
            Event::ScanOpen,
            &[("buckets", &scanner.children.len().to_string())],
        );
        Ok(scanner)
    }

    /// Number of underlying bucket scans.
    pub fn bucket_count(&self) -> usize {
        self.children.len()
    }

    /// Whether the scanner has been closed (exhaustion, error, or caller).
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the next row in ascending original-key order.
    ///
    /// `Ok(None)` once all buckets are exhausted; the scanner closes itself
    /// at that point. After any error the scanner is closed and every
    /// subsequent call returns `Ok(None)`.
    pub fn next_row(&mut self) -> ScanResult<Option<Row>> {
        if self.closed {
            return Ok(None);
        }

        let mut winner: Option<usize> = None;
        for idx in 0..self.children.len() {
            let Some(key) = self.head_key(idx) else {
                continue;
            };
            winner = match winner {
                None => Some(idx),
                Some(best) => match self.head_key(best) {
                    // Strict less-than keeps the lowest bucket id on ties.
                    Some(best_key) if key < best_key => Some(idx),
                    _ => Some(best),
                },
            };
        }

        let Some(idx) = winner else {
            // All buckets exhausted; their iterators are already closed.
            self.close()?;
            return Ok(None);
        };

        let Some(buffered) = self.children[idx].head.take() else {
            return Ok(None);
        };
        self.advance(idx)?;

        let mut row = buffered.row;
        row.key = buffered.original_key;
        self.emitted += 1;
        Ok(Some(row))
    }

    /// Closes every still-open child iterator. Idempotent.
    ///
    /// The first child close error is reported, after all children have been
    /// closed regardless.
    pub fn close(&mut self) -> ScanResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut first_err = None;
        for child in &mut self.children {
            child.head = None;
            if let Some(mut iter) = child.iter.take() {
                if let Err(err) = iter.close() {
                    first_err.get_or_insert(err);
                }
            }
        }

        log_event_with_fields(Event::ScanClose, &[("rows", &self.emitted.to_string())]);
        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn head_key(&self, idx: usize) -> Option<&[u8]> {
        self.children[idx]
            .head
            .as_ref()
            .map(|buffered| buffered.original_key.as_slice())
    }

    /// Pulls the next row into child `idx`'s buffer, closing the child on
    /// exhaustion. On any failure the whole scanner is torn down first.
    fn advance(&mut self, idx: usize) -> ScanResult<()> {
        let Some(iter) = self.children[idx].iter.as_mut() else {
            return Ok(());
        };

        match iter.next_row() {
            Ok(Some(row)) => match self.distributor.decode(&row.key) {
                Ok(original_key) => {
                    self.children[idx].head = Some(BufferedRow { original_key, row });
                    Ok(())
                }
                Err(err) => {
                    self.fail(idx, &err.to_string());
                    Err(err.into())
                }
            },
            Ok(None) => {
                self.children[idx].head = None;
                if let Some(mut iter) = self.children[idx].iter.take() {
                    if let Err(err) = iter.close() {
                        self.fail(idx, &err.to_string());
                        return Err(err.into());
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.fail(idx, &err.to_string());
                Err(err.into())
            }
        }
    }

    /// Error path: log, then close all children, swallowing their close
    /// errors so the triggering error is the one propagated.
    fn fail(&mut self, bucket_idx: usize, error: &str) {
        log_event_with_fields(
            Event::IteratorFailure,
            &[
                ("bucket", &self.children[bucket_idx].bucket.to_string()),
                ("error", error),
            ],
        );
        self.closed = true;
        for child in &mut self.children {
            child.head = None;
            if let Some(mut iter) = child.iter.take() {
                let _ = iter.close();
            }
        }
        log_event(Event::ScanClose);
    }
}

impl Iterator for MergeScanner {
    type Item = ScanResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl Drop for MergeScanner {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            for child in &mut self.children {
                child.head = None;
                if let Some(mut iter) = child.iter.take() {
                    let _ = iter.close();
                }
            }
        }
    }
}
