#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! TTL dataset cache for the status-map system.
//!
//! Holds the most recent normalized dataset under a fixed key. A read after
//! the entry's expiry is a miss, and every write unconditionally replaces
//! the previous entry (last-writer-wins — there is no optimistic
//! concurrency). Backends implement [`CacheStore`]; callers decide how to
//! degrade on backend errors (see the index service).

mod file;
mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use status_map_location_models::Dataset;

/// Cache key under which the location dataset is stored.
pub const DATASET_CACHE_KEY: &str = "locations";

/// How long a cached dataset stays fresh, in seconds (1 hour).
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

/// Errors that can occur against a cache backend.
///
/// These never propagate to API callers: reads degrade to a forced miss and
/// write failures are logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A persisted cache entry: the dataset plus its freshness window.
///
/// At most one record exists per key; writes replace the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// The key this record is stored under.
    pub key: String,
    /// The cached dataset, in fetch order.
    pub dataset: Dataset,
    /// Reads at or after this instant are treated as a miss.
    pub expires_at: DateTime<Utc>,
    /// When the record was last written.
    pub last_updated: DateTime<Utc>,
}

impl CacheRecord {
    /// Builds a record for `dataset` that expires `ttl_secs` from now.
    #[must_use]
    pub fn new(key: &str, dataset: Dataset, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            key: key.to_owned(),
            dataset,
            expires_at: now + Duration::seconds(ttl_secs),
            last_updated: now,
        }
    }

    /// Returns `true` if the record is stale at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Key-value store for datasets with per-entry expiry.
///
/// Backends are expected to be safe for concurrent reads and writes;
/// concurrent writers are resolved by last-writer-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the cached dataset for `key`, or `None` when no entry
    /// exists or the stored entry has expired.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Dataset>, CacheError>;

    /// Stores `dataset` under `key` with a fresh `ttl_secs` window,
    /// unconditionally replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be written.
    async fn put(&self, key: &str, dataset: Dataset, ttl_secs: i64) -> Result<(), CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_expiry_is_inclusive_at_the_boundary() {
        let record = CacheRecord::new(DATASET_CACHE_KEY, Vec::new(), 60);
        assert!(record.is_expired_at(record.expires_at));
        assert!(!record.is_expired_at(record.expires_at - Duration::seconds(1)));
        assert!(record.is_expired_at(record.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn zero_ttl_record_is_immediately_stale() {
        let record = CacheRecord::new(DATASET_CACHE_KEY, Vec::new(), 0);
        assert!(record.is_expired_at(Utc::now()));
    }
}
