//! File-backed cache backend.
//!
//! Stores one JSON [`CacheRecord`] per key under a cache directory. Writes
//! go to a temporary file first and are renamed into place so readers never
//! observe a partially written record. A corrupt or unreadable record is
//! treated as a miss rather than an error — the next successful write
//! replaces it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use status_map_location_models::Dataset;

use crate::{CacheError, CacheRecord, CacheStore};

/// Cache backend persisting records as JSON files.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Creates a file cache rooted at `dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the directory cannot be created.
    pub fn new(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Dataset>, CacheError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)?;
        let record: CacheRecord = match serde_json::from_str(&contents) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Discarding corrupt cache record at {}: {e}", path.display());
                return Ok(None);
            }
        };

        if record.is_expired_at(Utc::now()) {
            return Ok(None);
        }

        Ok(Some(record.dataset))
    }

    async fn put(&self, key: &str, dataset: Dataset, ttl_secs: i64) -> Result<(), CacheError> {
        let record = CacheRecord::new(key, dataset, ttl_secs);
        let json = serde_json::to_string(&record)?;

        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        log::debug!(
            "Cached {} points under '{key}' until {}",
            record.dataset.len(),
            record.expires_at
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use status_map_location_models::{Point, PointStatus};

    use super::*;
    use crate::DATASET_CACHE_KEY;

    static NEXT_DIR: AtomicU32 = AtomicU32::new(0);

    fn test_dir() -> PathBuf {
        let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "status_map_file_cache_{}_{n}",
            std::process::id()
        ))
    }

    fn dataset() -> Dataset {
        vec![Point {
            id: "7".to_owned(),
            name: None,
            city: Some("Decatur".to_owned()),
            region: Some("GA".to_owned()),
            status: PointStatus::Closed,
            lat: 33.77,
            lon: -84.29,
        }]
    }

    #[tokio::test]
    async fn round_trips_a_record_through_disk() {
        let cache = FileCache::new(&test_dir()).unwrap();
        cache.put(DATASET_CACHE_KEY, dataset(), 3600).await.unwrap();

        let cached = cache.get(DATASET_CACHE_KEY).await.unwrap().unwrap();
        assert_eq!(cached, dataset());
    }

    #[tokio::test]
    async fn missing_file_is_a_miss() {
        let cache = FileCache::new(&test_dir()).unwrap();
        assert!(cache.get(DATASET_CACHE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_record_is_a_miss() {
        let cache = FileCache::new(&test_dir()).unwrap();
        cache.put(DATASET_CACHE_KEY, dataset(), 0).await.unwrap();
        assert!(cache.get(DATASET_CACHE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_record_is_a_miss_not_an_error() {
        let dir = test_dir();
        let cache = FileCache::new(&dir).unwrap();
        std::fs::write(dir.join(format!("{DATASET_CACHE_KEY}.json")), "{not json").unwrap();

        assert!(cache.get(DATASET_CACHE_KEY).await.unwrap().is_none());
    }
}
