#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Canonical location point types shared across the status-map system.
//!
//! The source adapter normalizes provider records into [`Point`]s; every
//! downstream consumer (cache, aggregation, API) works with this shape and
//! never with raw provider JSON.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Operational status of a tracked location.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum PointStatus {
    /// The location is operating.
    Open,
    /// The location is closed.
    Closed,
}

impl PointStatus {
    /// Returns `true` if the status is [`PointStatus::Open`].
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A single tracked location with coordinates and open/closed status.
///
/// Immutable once fetched; identity is [`Point::id`]. Coordinates are WGS84
/// with `lat` in `[-90, 90]` and `lon` in `[-180, 180]` — the source adapter
/// guarantees both are present, so they are not `Option`s here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// Unique, non-empty identifier from the provider.
    pub id: String,
    /// Display name, if the provider supplied one.
    pub name: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// State / region abbreviation.
    pub region: Option<String>,
    /// Open/closed status at fetch time.
    pub status: PointStatus,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
}

/// The full ordered collection of points produced by one fetch.
///
/// A fetch yields a complete replacement list or fails — never a partial
/// list silently missing records.
pub type Dataset = Vec<Point>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let json = serde_json::to_string(&PointStatus::Open).unwrap();
        assert_eq!(json, "\"Open\"");
        let back: PointStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PointStatus::Open);
    }

    #[test]
    fn status_parses_from_string() {
        assert_eq!("Closed".parse::<PointStatus>().unwrap(), PointStatus::Closed);
        assert!("Unknown".parse::<PointStatus>().is_err());
    }

    #[test]
    fn point_serializes_camel_case() {
        let point = Point {
            id: "1187".to_owned(),
            name: Some("Store #1187".to_owned()),
            city: Some("Decatur".to_owned()),
            region: Some("GA".to_owned()),
            status: PointStatus::Open,
            lat: 33.77,
            lon: -84.29,
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["id"], "1187");
        assert_eq!(value["status"], "Open");
        assert!(value.get("region").is_some());
    }
}
