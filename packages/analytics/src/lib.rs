#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Proximity aggregation engine.
//!
//! Given a query point, a radius, and a dataset of [`Point`]s, computes the
//! open/closed status index: counts, percentages, and the matching points
//! sorted by distance. Pure computation over model types — no I/O, no
//! awareness of where the dataset came from.

use serde::{Deserialize, Serialize};
use status_map_location_models::{Dataset, Point, PointStatus};
use status_map_spatial::distance_miles;
use strum_macros::{AsRefStr, Display, EnumString};

/// Default query radius in statute miles.
pub const DEFAULT_RADIUS_MILES: f64 = 50.0;

/// Coarse severity rollup derived from the closed percentage.
///
/// Thresholds: more than 66% closed is `Red`, more than 33% is `Yellow`,
/// anything else (including an empty result) is `Green`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum SeverityLevel {
    /// Most nearby locations are operating.
    Green,
    /// A significant share of nearby locations are closed.
    Yellow,
    /// Most nearby locations are closed.
    Red,
}

impl SeverityLevel {
    /// Derives the severity level from a closed percentage in `[0, 100]`.
    #[must_use]
    pub fn from_closed_percentage(closed_percentage: f64) -> Self {
        if closed_percentage > 66.0 {
            Self::Red
        } else if closed_percentage > 33.0 {
            Self::Yellow
        } else {
            Self::Green
        }
    }
}

/// A point paired with its distance from the query coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDistance {
    /// The matched point.
    #[serde(flatten)]
    pub point: Point,
    /// Great-circle distance from the query point, in miles.
    pub distance_miles: f64,
}

/// Aggregated open/closed status for the area around a query point.
///
/// Derived on every request, never persisted. `open_count + closed_count`
/// always equals `total`, and both percentages are `0.0` when no points
/// fall within the radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusIndex {
    /// Number of points within the radius.
    pub total: usize,
    /// Points within the radius reporting open.
    pub open_count: usize,
    /// Points within the radius reporting closed.
    pub closed_count: usize,
    /// `open_count / total * 100`, or `0.0` when `total` is zero.
    pub open_percentage: f64,
    /// `closed_count / total * 100`, or `0.0` when `total` is zero.
    pub closed_percentage: f64,
    /// Severity rollup derived from `closed_percentage`.
    pub severity: SeverityLevel,
    /// Matched points, ascending by distance (ties keep dataset order).
    pub points: Vec<PointDistance>,
    /// Query latitude.
    pub query_lat: f64,
    /// Query longitude.
    pub query_lon: f64,
    /// Query radius in miles.
    pub radius_miles: f64,
}

/// Computes the status index for the area within `radius_miles` of the
/// query coordinates.
///
/// The radius boundary is inclusive. A non-positive radius is not an error;
/// it simply matches only points coincident with the query (usually none).
/// The sort is stable, so points at equal distance keep their dataset order.
#[must_use]
pub fn aggregate(query_lat: f64, query_lon: f64, radius_miles: f64, dataset: &Dataset) -> StatusIndex {
    let mut points: Vec<PointDistance> = dataset
        .iter()
        .filter_map(|point| {
            let distance = distance_miles(query_lat, query_lon, point.lat, point.lon);
            (distance <= radius_miles).then(|| PointDistance {
                point: point.clone(),
                distance_miles: distance,
            })
        })
        .collect();

    points.sort_by(|a, b| {
        a.distance_miles
            .partial_cmp(&b.distance_miles)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total = points.len();
    let open_count = points.iter().filter(|p| p.point.status.is_open()).count();
    let closed_count = total - open_count;

    #[allow(clippy::cast_precision_loss)]
    let (open_percentage, closed_percentage) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            open_count as f64 / total as f64 * 100.0,
            closed_count as f64 / total as f64 * 100.0,
        )
    };

    log::debug!(
        "Aggregated {total} of {} points within {radius_miles}mi of ({query_lat}, {query_lon})",
        dataset.len()
    );

    StatusIndex {
        total,
        open_count,
        closed_count,
        open_percentage,
        closed_percentage,
        severity: SeverityLevel::from_closed_percentage(closed_percentage),
        points,
        query_lat,
        query_lon,
        radius_miles,
    }
}
