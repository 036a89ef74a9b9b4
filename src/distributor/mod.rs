//! Key distribution subsystem for keyspread
//!
//! Monotonically increasing row keys (time-prefixed keys especially) funnel
//! every write into one partition of a range-partitioned store. The
//! distributor breaks that pattern by prepending a fixed-width bucket prefix
//! to each original key, spreading rows across N disjoint physical key
//! subspaces while keeping the transform reversible.
//!
//! # Invariants Enforced
//!
//! - Round-trip: `decode(encode(k)) == k` for every original key `k`
//! - In-bucket order: `k1 < k2` in the same bucket implies
//!   `encode(k1) < encode(k2)` lexicographically
//! - Determinism: bucket assignment is a pure function of the key for the
//!   lifetime of a configuration; it never depends on time or prior calls
//!
//! Two interchangeable strategies are provided: [`HashPrefixDistributor`]
//! (one-byte crc32-derived prefix) and [`ExplicitPrefixDistributor`]
//! (caller-supplied fixed-width prefix list). The scan and batch layers are
//! agnostic to which one is in use.

mod errors;
mod explicit_prefix;
mod hash_prefix;

pub use errors::{DistributorError, DistributorResult};
pub use explicit_prefix::ExplicitPrefixDistributor;
pub use hash_prefix::HashPrefixDistributor;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Deterministic, reversible transform between original and physical keys.
///
/// Every physical key is laid out as `bucket_prefix ++ original_key`. The
/// prefix width is fixed per distributor, and prefixes of distinct buckets
/// are disjoint in value space, so decoding is unambiguous.
///
/// `decode` accepts exactly the physical keys this distributor's `encode`
/// would produce: the prefix must name a configured bucket, and the decoded
/// original key must re-derive to that same bucket. A disagreement is
/// reported as a configuration mismatch, never silently truncated.
pub trait KeyDistributor: Send + Sync {
    /// Number of buckets N. Fixed at construction.
    fn bucket_count(&self) -> usize;

    /// Width in bytes of every bucket prefix.
    fn prefix_width(&self) -> usize;

    /// Prefix of bucket `b`. Panics if `b >= bucket_count()`.
    fn bucket_prefix(&self, bucket: usize) -> &[u8];

    /// Bucket assignment for an original key.
    ///
    /// Pure and stateless. Fails with `InvalidKey` for an empty key.
    fn bucket(&self, original: &[u8]) -> DistributorResult<usize>;

    /// Transform an original key into its physical key.
    fn encode(&self, original: &[u8]) -> DistributorResult<Vec<u8>> {
        let bucket = self.bucket(original)?;
        let prefix = self.bucket_prefix(bucket);
        let mut physical = Vec::with_capacity(prefix.len() + original.len());
        physical.extend_from_slice(prefix);
        physical.extend_from_slice(original);
        Ok(physical)
    }

    /// Recover the original key from a physical key.
    ///
    /// Fails with `InvalidKey` if the physical key is no longer than the
    /// prefix width, and with `ConfigurationMismatch` if the prefix names no
    /// configured bucket or the decoded key would not have been placed under
    /// that prefix by this distributor.
    fn decode(&self, physical: &[u8]) -> DistributorResult<Vec<u8>>;

    /// The would-be physical key of `original` under every bucket, in
    /// bucket order.
    ///
    /// This is the building block for range splitting: a logical scan bound
    /// applies to every bucket's subspace at once, so each bucket needs the
    /// bound re-prefixed with its own prefix. The entries for buckets other
    /// than `bucket(original)` are synthetic boundaries, not decodable rows.
    fn all_encodings(&self, original: &[u8]) -> Vec<Vec<u8>> {
        let mut keys = Vec::with_capacity(self.bucket_count());
        for bucket in 0..self.bucket_count() {
            let prefix = self.bucket_prefix(bucket);
            let mut physical = Vec::with_capacity(prefix.len() + original.len());
            physical.extend_from_slice(prefix);
            physical.extend_from_slice(original);
            keys.push(physical);
        }
        keys
    }

    /// Serializable parameters from which an identical distributor can be
    /// rebuilt (for handing to remote batch readers).
    fn params(&self) -> DistributorConfig;
}

/// Serializable distributor parameters.
///
/// Batch work units are executed by readers in other processes; they receive
/// these parameters, rebuild the distributor with [`DistributorConfig::build`],
/// and decode rows independently. A reader configured differently from the
/// writer surfaces `ConfigurationMismatch` at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DistributorConfig {
    /// One-byte crc32-derived prefix, `1 <= buckets <= 256`
    HashPrefix {
        /// Number of buckets
        buckets: u16,
    },
    /// Caller-supplied fixed-width prefixes, one per bucket
    ExplicitPrefix {
        /// Distinct, equal-length, non-empty prefixes
        prefixes: Vec<Vec<u8>>,
    },
}

impl DistributorConfig {
    /// Build the distributor described by these parameters.
    pub fn build(&self) -> DistributorResult<Box<dyn KeyDistributor>> {
        match self {
            DistributorConfig::HashPrefix { buckets } => Ok(Box::new(
                HashPrefixDistributor::new(*buckets as usize)?,
            )),
            DistributorConfig::ExplicitPrefix { prefixes } => Ok(Box::new(
                ExplicitPrefixDistributor::new(prefixes.clone())?,
            )),
        }
    }

    /// Build the distributor behind a shared handle.
    ///
    /// Scan and batch layers hold the distributor as `Arc<dyn KeyDistributor>`
    /// so work units can carry it across threads.
    pub fn build_shared(&self) -> DistributorResult<Arc<dyn KeyDistributor>> {
        Ok(Arc::from(self.build()?))
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> DistributorResult<String> {
        serde_json::to_string(self)
            .map_err(|e| DistributorError::mismatch(format!("unserializable parameters: {}", e)))
    }

    /// Deserialize from the JSON wire form.
    pub fn from_json(json: &str) -> DistributorResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DistributorError::mismatch(format!("unreadable parameters: {}", e)))
    }
}

/// Stable bucket assignment shared by both strategies.
///
/// crc32 rather than `std::hash` because assignment must agree across
/// processes and releases; `DefaultHasher` guarantees neither.
pub(crate) fn stable_bucket(original: &[u8], buckets: usize) -> usize {
    crc32fast::hash(original) as usize % buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builds_hash_prefix() {
        let config = DistributorConfig::HashPrefix { buckets: 16 };
        let distributor = config.build().unwrap();
        assert_eq!(distributor.bucket_count(), 16);
        assert_eq!(distributor.prefix_width(), 1);
    }

    #[test]
    fn test_config_builds_explicit_prefix() {
        let prefixes = vec![vec![0xA0, 0x00], vec![0xA0, 0x01], vec![0xA0, 0x02]];
        let config = DistributorConfig::ExplicitPrefix { prefixes };
        let distributor = config.build().unwrap();
        assert_eq!(distributor.bucket_count(), 3);
        assert_eq!(distributor.prefix_width(), 2);
    }

    #[test]
    fn test_params_round_trip_json() {
        let config = DistributorConfig::HashPrefix { buckets: 32 };
        let json = config.to_json().unwrap();
        let restored = DistributorConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_rebuilt_distributor_encodes_identically() {
        let config = DistributorConfig::HashPrefix { buckets: 64 };
        let original = config.build().unwrap();
        let rebuilt = original.params().build().unwrap();

        for i in 0u64..50 {
            let key = i.to_be_bytes();
            assert_eq!(original.encode(&key).unwrap(), rebuilt.encode(&key).unwrap());
        }
    }

    #[test]
    fn test_garbage_params_rejected() {
        let result = DistributorConfig::from_json("{\"strategy\":\"unknown\"}");
        assert!(result.unwrap_err().is_configuration_mismatch());
    }

    #[test]
    fn test_all_encodings_covers_every_bucket() {
        let distributor = HashPrefixDistributor::new(8).unwrap();
        let keys = distributor.all_encodings(b"row-1");
        assert_eq!(keys.len(), 8);
        for (bucket, key) in keys.iter().enumerate() {
            assert_eq!(&key[..1], distributor.bucket_prefix(bucket));
            assert_eq!(&key[1..], b"row-1");
        }
    }

    #[test]
    fn test_stable_bucket_in_range() {
        for i in 0u64..100 {
            let bucket = stable_bucket(&i.to_be_bytes(), 7);
            assert!(bucket < 7);
        }
    }
}
