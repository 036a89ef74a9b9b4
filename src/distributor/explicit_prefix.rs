//! Explicit-enumeration prefix distribution
//!
//! The caller supplies the prefixes themselves: distinct, equal-length,
//! non-empty byte strings, one per bucket. Useful when bucket boundaries
//! must line up with pre-split partitions or an existing key namespace.
//! Assignment is still a stable hash into the list, so the determinism
//! guarantee is identical to the hash-prefix strategy.

use std::collections::HashSet;

use super::errors::{DistributorError, DistributorResult};
use super::{stable_bucket, DistributorConfig, KeyDistributor};

/// Distributor using a caller-supplied list of fixed-width prefixes.
#[derive(Debug, Clone)]
pub struct ExplicitPrefixDistributor {
    prefixes: Vec<Vec<u8>>,
    /// Shared length of every prefix
    width: usize,
}

impl ExplicitPrefixDistributor {
    /// Creates a distributor over the given prefixes.
    ///
    /// Bucket `b` is the prefix at position `b`. Fails with
    /// `ConfigurationMismatch` if the list is empty, any prefix is empty,
    /// lengths differ, or two prefixes are equal. Equal-length distinct
    /// prefixes are automatically disjoint in value space, which is what
    /// makes decoding unambiguous.
    pub fn new(prefixes: Vec<Vec<u8>>) -> DistributorResult<Self> {
        if prefixes.is_empty() {
            return Err(DistributorError::mismatch("empty prefix list"));
        }
        let width = prefixes[0].len();
        if width == 0 {
            return Err(DistributorError::mismatch("empty prefix"));
        }
        let mut seen: HashSet<&[u8]> = HashSet::with_capacity(prefixes.len());
        for prefix in &prefixes {
            if prefix.len() != width {
                return Err(DistributorError::mismatch(format!(
                    "prefix widths differ: {} and {}",
                    width,
                    prefix.len()
                )));
            }
            if !seen.insert(prefix.as_slice()) {
                return Err(DistributorError::mismatch(format!(
                    "duplicate prefix {:02x?}",
                    prefix
                )));
            }
        }
        Ok(Self { prefixes, width })
    }

    /// Position of a prefix in the configured list.
    fn bucket_of_prefix(&self, prefix: &[u8]) -> Option<usize> {
        self.prefixes.iter().position(|p| p.as_slice() == prefix)
    }
}

impl KeyDistributor for ExplicitPrefixDistributor {
    fn bucket_count(&self) -> usize {
        self.prefixes.len()
    }

    fn prefix_width(&self) -> usize {
        self.width
    }

    fn bucket_prefix(&self, bucket: usize) -> &[u8] {
        &self.prefixes[bucket]
    }

    fn bucket(&self, original: &[u8]) -> DistributorResult<usize> {
        if original.is_empty() {
            return Err(DistributorError::invalid_key("empty original key"));
        }
        Ok(stable_bucket(original, self.prefixes.len()))
    }

    fn decode(&self, physical: &[u8]) -> DistributorResult<Vec<u8>> {
        if physical.len() <= self.width {
            return Err(DistributorError::invalid_key(format!(
                "physical key of {} bytes cannot carry a {}-byte prefix and an original key",
                physical.len(),
                self.width
            )));
        }
        let (prefix, original) = physical.split_at(self.width);
        let claimed = self.bucket_of_prefix(prefix).ok_or_else(|| {
            DistributorError::mismatch(format!(
                "prefix {:02x?} names no bucket in the configured list",
                prefix
            ))
        })?;
        let derived = stable_bucket(original, self.prefixes.len());
        if derived != claimed {
            return Err(DistributorError::mismatch(format!(
                "key assigns to bucket {} but was stored under the prefix of bucket {}",
                derived, claimed
            )));
        }
        Ok(original.to_vec())
    }

    fn params(&self) -> DistributorConfig {
        DistributorConfig::ExplicitPrefix {
            prefixes: self.prefixes.clone(),
        }
    }
}
