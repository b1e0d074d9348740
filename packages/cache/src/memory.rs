//! In-memory cache backend.
//!
//! Backs tests and single-process deployments that don't need the dataset
//! to survive a restart.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use status_map_location_models::Dataset;

use crate::{CacheError, CacheRecord, CacheStore};

/// Cache backend holding records in a `RwLock`-guarded map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    records: RwLock<BTreeMap<String, CacheRecord>>,
}

impl MemoryCache {
    /// Creates an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Dataset>, CacheError> {
        let records = self.records.read().expect("cache lock poisoned");
        Ok(records
            .get(key)
            .filter(|record| !record.is_expired_at(Utc::now()))
            .map(|record| record.dataset.clone()))
    }

    async fn put(&self, key: &str, dataset: Dataset, ttl_secs: i64) -> Result<(), CacheError> {
        let record = CacheRecord::new(key, dataset, ttl_secs);
        let mut records = self.records.write().expect("cache lock poisoned");
        records.insert(key.to_owned(), record);
        Ok(())
    }
}
