#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API request and response types for the status map server.
//!
//! These types are serialized to JSON for the REST API. Query parameters
//! arrive as strings and are validated by the handlers before the core is
//! invoked, so the parameter structs here stay loosely typed on purpose.

use serde::{Deserialize, Serialize};
use status_map_analytics::StatusIndex;

/// Query parameters for the coordinates endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatesQueryParams {
    /// Query latitude.
    pub lat: Option<f64>,
    /// Query longitude.
    pub lon: Option<f64>,
    /// Radius in miles (defaults to 50 when absent).
    pub radius: Option<f64>,
}

/// Query parameters for the ZIP endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipQueryParams {
    /// 5-digit US ZIP code.
    pub zip: Option<String>,
    /// Radius in miles (defaults to 50 when absent).
    pub radius: Option<f64>,
}

/// Status index response for a ZIP query: the index plus the code that
/// was resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipIndexResponse {
    /// The computed index.
    #[serde(flatten)]
    pub index: StatusIndex,
    /// The ZIP code the query was resolved from.
    pub zip_code: String,
}

/// Receipt returned by the force-refresh endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRefreshReceipt {
    /// Human-readable confirmation.
    pub message: String,
    /// Number of points in the refreshed dataset.
    pub locations_count: usize,
    /// When the refresh completed (ISO 8601).
    pub updated_at: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Machine-distinguishable error class in an error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorClass {
    /// The request itself is invalid; the caller can fix it.
    ValidationError,
    /// An upstream collaborator (source or geocoder) failed.
    UpstreamError,
}

/// Structured error payload.
///
/// Never carries stack traces or backend details — just the class and a
/// human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error class.
    pub error: ApiErrorClass,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    /// Builds a validation error payload.
    #[must_use]
    pub fn validation(message: &str) -> Self {
        Self {
            error: ApiErrorClass::ValidationError,
            message: message.to_owned(),
        }
    }

    /// Builds an upstream error payload.
    #[must_use]
    pub fn upstream(message: &str) -> Self {
        Self {
            error: ApiErrorClass::UpstreamError,
            message: message.to_owned(),
        }
    }
}
