//! Hash-derived one-byte prefix distribution
//!
//! The widest write spread with the smallest key overhead: one prefix byte,
//! `bucket = crc32(original) % N`. Rows with related original keys land in
//! unrelated buckets, which is the point; any semantic grouping is
//! sacrificed for write distribution.

use super::errors::{DistributorError, DistributorResult};
use super::{stable_bucket, DistributorConfig, KeyDistributor};

/// Maximum bucket count representable in a one-byte prefix.
pub const MAX_BUCKETS: usize = 256;

/// Distributor using a one-byte crc32-derived bucket prefix.
#[derive(Debug, Clone)]
pub struct HashPrefixDistributor {
    /// Number of buckets, `1..=256`
    buckets: usize,
    /// Prefix bytes, `prefixes[b] == [b as u8]`
    prefixes: Vec<Vec<u8>>,
}

impl HashPrefixDistributor {
    /// Creates a distributor with `buckets` one-byte-prefixed buckets.
    ///
    /// Fails with `ConfigurationMismatch` outside `1..=256`.
    pub fn new(buckets: usize) -> DistributorResult<Self> {
        if buckets == 0 || buckets > MAX_BUCKETS {
            return Err(DistributorError::mismatch(format!(
                "bucket count {} outside 1..={}",
                buckets, MAX_BUCKETS
            )));
        }
        let prefixes = (0..buckets).map(|b| vec![b as u8]).collect();
        Ok(Self { buckets, prefixes })
    }
}

impl KeyDistributor for HashPrefixDistributor {
    fn bucket_count(&self) -> usize {
        self.buckets
    }

    fn prefix_width(&self) -> usize {
        1
    }

    fn bucket_prefix(&self, bucket: usize) -> &[u8] {
        &self.prefixes[bucket]
    }

    fn bucket(&self, original: &[u8]) -> DistributorResult<usize> {
        if original.is_empty() {
            return Err(DistributorError::invalid_key("empty original key"));
        }
        Ok(stable_bucket(original, self.buckets))
    }

    fn decode(&self, physical: &[u8]) -> DistributorResult<Vec<u8>> {
        if physical.len() <= 1 {
            return Err(DistributorError::invalid_key(format!(
                "physical key of {} bytes cannot carry a one-byte prefix and an original key",
                physical.len()
            )));
        }
        let claimed = physical[0] as usize;
        if claimed >= self.buckets {
            return Err(DistributorError::mismatch(format!(
                "prefix 0x{:02x} names no bucket under bucket count {}",
                physical[0], self.buckets
            )));
        }
        let original = &physical[1..];
        let derived = stable_bucket(original, self.buckets);
        if derived != claimed {
            return Err(DistributorError::mismatch(format!(
                "key assigns to bucket {} under bucket count {}, but was stored under prefix 0x{:02x}",
                derived, self.buckets, physical[0]
            )));
        }
        Ok(original.to_vec())
    }

    fn params(&self) -> DistributorConfig {
        DistributorConfig::HashPrefix {
            buckets: self.buckets as u16,
        }
    }
}
