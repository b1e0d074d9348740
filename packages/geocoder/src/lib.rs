#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Postal code geocoding client.
//!
//! Resolves a 5-digit US ZIP code to WGS84 coordinates via the free
//! Zippopotam.us lookup service (`GET {base}/us/{zip}`, no API key).
//!
//! See <https://www.zippopotam.us/>

/// Default base URL of the lookup service.
pub const DEFAULT_BASE_URL: &str = "https://api.zippopotam.us";

/// Timeout for a single geocode request.
const GEOCODE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// Errors from geocoding operations.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The service has no result for the requested code.
    #[error("No geocoding result for ZIP {zip}")]
    NotFound {
        /// The ZIP code that could not be resolved.
        zip: String,
    },
}

/// Builds a [`reqwest::Client`] configured for geocode lookups.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the client cannot be built.
pub fn build_client() -> Result<reqwest::Client, GeocodeError> {
    Ok(reqwest::Client::builder().timeout(GEOCODE_TIMEOUT).build()?)
}

/// Resolves a US ZIP code to `(lat, lon)`.
///
/// The caller is expected to have validated the code format (exactly 5
/// ASCII digits) — this function only handles the lookup itself.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the request fails, the response cannot be
/// parsed, or the service has no result for the code.
pub async fn geocode_zip(
    client: &reqwest::Client,
    base_url: &str,
    zip: &str,
) -> Result<(f64, f64), GeocodeError> {
    let url = format!("{base_url}/us/{zip}");
    log::debug!("Geocoding ZIP {zip} via {url}");

    let resp = client.get(&url).send().await?;
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(GeocodeError::NotFound {
            zip: zip.to_owned(),
        });
    }

    let body: serde_json::Value = resp.error_for_status()?.json().await?;
    parse_response(&body, zip)
}

/// Parses a lookup response into `(lat, lon)`.
///
/// Coordinates come back as strings in the `places` array.
fn parse_response(body: &serde_json::Value, zip: &str) -> Result<(f64, f64), GeocodeError> {
    let places = body["places"].as_array().ok_or_else(|| GeocodeError::Parse {
        message: "missing places array in geocode response".to_owned(),
    })?;

    let Some(first) = places.first() else {
        return Err(GeocodeError::NotFound {
            zip: zip.to_owned(),
        });
    };

    let lat = first["latitude"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing latitude in geocode response".to_owned(),
        })?;

    let lon = first["longitude"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing longitude in geocode response".to_owned(),
        })?;

    Ok((lat, lon))
}
