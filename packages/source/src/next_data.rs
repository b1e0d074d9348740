//! Source adapter for providers that embed their location directory in a
//! Next.js `__NEXT_DATA__` script tag.
//!
//! Fetches the directory page, extracts the embedded JSON document, and
//! normalizes `props.pageProps.locations` into [`Point`]s.

use scraper::{Html, Selector};
use status_map_location_models::{Dataset, Point, PointStatus};

use crate::{LocationSource, SourceError};

/// Browser User-Agent sent with page requests; some providers reject
/// default client identifiers.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Timeout for the directory page request.
const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Fetches the point dataset from a Next.js location directory page.
#[derive(Debug, Clone)]
pub struct NextDataSource {
    url: String,
    client: reqwest::Client,
}

impl NextDataSource {
    /// Creates a source for the directory page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn new(url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            url: url.to_owned(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl LocationSource for NextDataSource {
    async fn fetch_dataset(&self) -> Result<Dataset, SourceError> {
        log::debug!("Fetching location directory from {}", self.url);
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let body = response.text().await?;

        let data = extract_next_data(&body)?;
        let dataset = normalize_locations(&data)?;

        log::info!("Fetched {} locations from source", dataset.len());
        Ok(dataset)
    }
}

/// Extracts and parses the JSON document embedded in the page's
/// `<script id="__NEXT_DATA__">` tag.
fn extract_next_data(html: &str) -> Result<serde_json::Value, SourceError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script#__NEXT_DATA__").map_err(|e| SourceError::Parse {
            message: format!("invalid CSS selector: {e}"),
        })?;

    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| SourceError::Parse {
            message: "no __NEXT_DATA__ script tag found in page".to_owned(),
        })?;

    let text: String = script.text().collect();
    Ok(serde_json::from_str(text.trim())?)
}

/// Normalizes `props.pageProps.locations` into [`Point`]s.
///
/// Records missing an identity or coordinates are dropped. A missing or
/// empty `locations` field yields an empty dataset; any other shape is a
/// parse error.
fn normalize_locations(data: &serde_json::Value) -> Result<Dataset, SourceError> {
    let locations = &data["props"]["pageProps"]["locations"];

    if locations.is_null() {
        log::warn!("No locations field in page data; returning empty dataset");
        return Ok(Vec::new());
    }

    let entries = locations.as_array().ok_or_else(|| SourceError::Parse {
        message: "locations field is not an array".to_owned(),
    })?;

    let mut dataset = Vec::with_capacity(entries.len());
    let mut dropped: usize = 0;

    for entry in entries {
        let Some(point) = normalize_record(entry) else {
            dropped += 1;
            continue;
        };
        dataset.push(point);
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} records missing identity or coordinates");
    }

    Ok(dataset)
}

/// Normalizes a single raw record, or `None` when it lacks an identity or
/// coordinates.
fn normalize_record(entry: &serde_json::Value) -> Option<Point> {
    let id = entry["storeCode"].as_str()?.trim();
    if id.is_empty() {
        return None;
    }

    let lat = entry["latitude"].as_f64()?;
    let lon = entry["longitude"].as_f64()?;

    // Provider convention: "A" means active/open, anything else is closed.
    let status = if entry["_status"].as_str() == Some("A") {
        PointStatus::Open
    } else {
        PointStatus::Closed
    };

    Some(Point {
        id: id.to_owned(),
        name: non_empty(&entry["businessName"]),
        city: non_empty(&entry["city"]),
        region: non_empty(&entry["state"]),
        status,
        lat,
        lon,
    })
}

/// Returns the string value, or `None` when absent or empty.
fn non_empty(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
