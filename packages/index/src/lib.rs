#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Cache-backed refresh orchestration and status index service.
//!
//! [`IndexService`] ties the cache store and the location source together:
//! reads serve the cached dataset while it is fresh, a miss (absent entry,
//! expired entry, or unreadable backend) triggers a refetch, and a
//! force-refresh bypasses freshness entirely. Cache backend failures never
//! reach the caller — a read failure degrades to a forced miss and a write
//! failure still returns the freshly fetched dataset.
//!
//! Concurrent misses may each trigger a fetch; all such fetches produce the
//! same logical full-dataset replacement and the cache resolves them by
//! last-writer-wins, so no in-process refresh lock is used.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use status_map_analytics::{StatusIndex, aggregate};
use status_map_cache::{CacheStore, DATASET_CACHE_KEY, DEFAULT_CACHE_TTL_SECS};
use status_map_location_models::Dataset;
use status_map_source::{LocationSource, SourceError};

/// Errors surfaced by the index service.
///
/// Cache backend errors are intentionally absent: they are handled inside
/// the service and never propagate.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The upstream dataset fetch failed.
    #[error("Source fetch failed: {0}")]
    Source(#[from] SourceError),
}

/// Receipt returned by a force-refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReceipt {
    /// Number of points in the refreshed dataset.
    pub locations_count: usize,
    /// When the refresh completed.
    pub updated_at: DateTime<Utc>,
}

/// Serves status index queries from the cached dataset, refreshing it from
/// the source when stale.
///
/// Both collaborators are injected capabilities, so tests can substitute
/// doubles for either side.
pub struct IndexService {
    cache: Arc<dyn CacheStore>,
    source: Arc<dyn LocationSource>,
    ttl_secs: i64,
}

impl IndexService {
    /// Creates a service with the default dataset TTL.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>, source: Arc<dyn LocationSource>) -> Self {
        Self {
            cache,
            source,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }

    /// Overrides the TTL applied to cache writes.
    #[must_use]
    pub const fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Returns the current dataset, serving from cache when fresh and
    /// refetching from the source on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Source`] if a required fetch fails. There is
    /// no stale-data fallback: once a miss is detected, the request
    /// succeeds only if the source does.
    pub async fn dataset(&self) -> Result<Dataset, IndexError> {
        match self.cache.get(DATASET_CACHE_KEY).await {
            Ok(Some(dataset)) => {
                log::debug!("Serving {} points from cache", dataset.len());
                return Ok(dataset);
            }
            Ok(None) => {
                log::info!("Cache miss or expired, fetching fresh data");
            }
            Err(e) => {
                // Treat an unreadable backend as a miss; fresh data beats
                // failing the request.
                log::warn!("Cache read failed, forcing refetch: {e}");
            }
        }

        let dataset = self.source.fetch_dataset().await?;
        self.store(&dataset).await;
        Ok(dataset)
    }

    /// Force-refreshes the dataset: fetches from the source and overwrites
    /// the cache regardless of freshness.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Source`] if the fetch fails.
    pub async fn refresh(&self) -> Result<RefreshReceipt, IndexError> {
        let dataset = self.source.fetch_dataset().await?;
        self.store(&dataset).await;

        Ok(RefreshReceipt {
            locations_count: dataset.len(),
            updated_at: Utc::now(),
        })
    }

    /// Computes the status index for the area around the query point.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Source`] if the dataset had to be refetched
    /// and the fetch failed.
    pub async fn status_index(
        &self,
        lat: f64,
        lon: f64,
        radius_miles: f64,
    ) -> Result<StatusIndex, IndexError> {
        let dataset = self.dataset().await?;
        Ok(aggregate(lat, lon, radius_miles, &dataset))
    }

    /// Best-effort cache write: failures are logged, never surfaced.
    async fn store(&self, dataset: &Dataset) {
        match self
            .cache
            .put(DATASET_CACHE_KEY, dataset.clone(), self.ttl_secs)
            .await
        {
            Ok(()) => log::info!("Cached {} locations", dataset.len()),
            Err(e) => log::error!("Cache write failed (continuing): {e}"),
        }
    }
}
