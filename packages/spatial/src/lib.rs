#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Great-circle distance calculations for proximity filtering.
//!
//! Haversine formula on a spherical Earth model. Distances are returned in
//! statute miles since that is the unit the query API exposes.

/// Mean Earth radius in kilometers (spherical model).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Conversion factor from kilometers to statute miles.
pub const MILES_PER_KM: f64 = 0.621_371;

/// Computes the great-circle distance between two WGS84 coordinates,
/// in kilometers.
///
/// Symmetric and non-negative; zero (up to floating precision) when both
/// points coincide. NaN or infinite inputs propagate unchanged — callers
/// are responsible for validating coordinates first.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Computes the great-circle distance between two WGS84 coordinates,
/// in statute miles.
#[must_use]
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance_km(lat1, lon1, lat2, lon2) * MILES_PER_KM
}
