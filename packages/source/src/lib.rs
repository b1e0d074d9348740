#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Location dataset source adapter.
//!
//! The [`LocationSource`] trait defines how the full point dataset is
//! fetched and normalized. The core never sees raw provider JSON: records
//! missing an identity or coordinates are dropped at this boundary, and a
//! page that cannot be parsed fails the whole call rather than yielding a
//! partial list.

pub mod next_data;

pub use next_data::NextDataSource;

use async_trait::async_trait;
use status_map_location_models::Dataset;

/// Errors that can occur while fetching the dataset from a provider.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The page or payload did not have the expected structure.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}

/// Trait for fetching the full normalized point dataset from a provider.
///
/// Implementations return a complete replacement [`Dataset`] or fail —
/// never a best-effort list silently missing fields.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Fetches and normalizes the full point dataset.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the payload cannot
    /// be parsed.
    async fn fetch_dataset(&self) -> Result<Dataset, SourceError>;
}
