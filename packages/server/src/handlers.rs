//! HTTP handler functions for the status map API.
//!
//! Validation happens here, before any cache or network access; the error
//! taxonomy is: invalid parameters → 400 with a `validation_error` payload,
//! upstream fetch/geocode failures → 502 with an `upstream_error` payload.
//! Cache backend problems never surface — the index service degrades them
//! to a forced refetch.

use actix_web::{HttpResponse, web};
use status_map_analytics::DEFAULT_RADIUS_MILES;
use status_map_server_models::{
    ApiError, ApiHealth, ApiRefreshReceipt, CoordinatesQueryParams, ZipIndexResponse,
    ZipQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        service: "status-map".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/index/coordinates`
///
/// Computes the status index around a `lat`/`lon` pair, with an optional
/// `radius` in miles (default 50).
pub async fn index_by_coordinates(
    state: web::Data<AppState>,
    params: web::Query<CoordinatesQueryParams>,
) -> HttpResponse {
    let lat = match validate_latitude(params.lat) {
        Ok(lat) => lat,
        Err(message) => return HttpResponse::BadRequest().json(ApiError::validation(&message)),
    };
    let lon = match validate_longitude(params.lon) {
        Ok(lon) => lon,
        Err(message) => return HttpResponse::BadRequest().json(ApiError::validation(&message)),
    };
    let radius = params.radius.unwrap_or(DEFAULT_RADIUS_MILES);

    match state.index.status_index(lat, lon, radius).await {
        Ok(index) => HttpResponse::Ok().json(index),
        Err(e) => {
            log::error!("Failed to compute status index: {e}");
            HttpResponse::BadGateway().json(ApiError::upstream("Failed to fetch location data"))
        }
    }
}

/// `GET /api/index/zip`
///
/// Resolves a 5-digit ZIP code to coordinates, then computes the status
/// index around it.
pub async fn index_by_zip(
    state: web::Data<AppState>,
    params: web::Query<ZipQueryParams>,
) -> HttpResponse {
    let zip = match validate_zip(params.zip.as_deref()) {
        Ok(zip) => zip,
        Err(message) => return HttpResponse::BadRequest().json(ApiError::validation(&message)),
    };
    let radius = params.radius.unwrap_or(DEFAULT_RADIUS_MILES);

    let (lat, lon) = match status_map_geocoder::geocode_zip(
        &state.geocode_client,
        &state.geocoder_base_url,
        zip,
    )
    .await
    {
        Ok(coords) => coords,
        Err(e) => {
            log::error!("Failed to geocode ZIP {zip}: {e}");
            return HttpResponse::BadGateway()
                .json(ApiError::upstream(&format!("Failed to geocode ZIP {zip}")));
        }
    };

    match state.index.status_index(lat, lon, radius).await {
        Ok(index) => HttpResponse::Ok().json(ZipIndexResponse {
            index,
            zip_code: zip.to_owned(),
        }),
        Err(e) => {
            log::error!("Failed to compute status index: {e}");
            HttpResponse::BadGateway().json(ApiError::upstream("Failed to fetch location data"))
        }
    }
}

/// `POST /api/refresh`
///
/// Force-refreshes the cached dataset, bypassing freshness. Returns the
/// refreshed point count without aggregation.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    match state.index.refresh().await {
        Ok(receipt) => HttpResponse::Ok().json(ApiRefreshReceipt {
            message: "Cache refreshed successfully".to_string(),
            locations_count: receipt.locations_count,
            updated_at: receipt.updated_at.to_rfc3339(),
        }),
        Err(e) => {
            log::error!("Failed to refresh dataset: {e}");
            HttpResponse::BadGateway().json(ApiError::upstream("Failed to fetch location data"))
        }
    }
}

/// Validates the query latitude.
fn validate_latitude(lat: Option<f64>) -> Result<f64, String> {
    let lat = lat.ok_or_else(|| "Latitude is required".to_string())?;
    if (-90.0..=90.0).contains(&lat) {
        Ok(lat)
    } else {
        Err("Latitude must be between -90 and 90".to_string())
    }
}

/// Validates the query longitude.
fn validate_longitude(lon: Option<f64>) -> Result<f64, String> {
    let lon = lon.ok_or_else(|| "Longitude is required".to_string())?;
    if (-180.0..=180.0).contains(&lon) {
        Ok(lon)
    } else {
        Err("Longitude must be between -180 and 180".to_string())
    }
}

/// Validates the ZIP code format: exactly 5 ASCII digits.
fn validate_zip(zip: Option<&str>) -> Result<&str, String> {
    let zip = zip.ok_or_else(|| "ZIP code is required".to_string())?;
    if zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit()) {
        Ok(zip)
    } else {
        Err("Invalid ZIP code format. Must be 5 digits.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test};
    use async_trait::async_trait;
    use status_map_cache::{CacheStore, DATASET_CACHE_KEY, MemoryCache};
    use status_map_index::IndexService;
    use status_map_location_models::{Dataset, Point, PointStatus};
    use status_map_source::{LocationSource, SourceError};

    use super::*;

    /// Source double returning a fixed dataset.
    struct StaticSource(Dataset);

    #[async_trait]
    impl LocationSource for StaticSource {
        async fn fetch_dataset(&self) -> Result<Dataset, SourceError> {
            Ok(self.0.clone())
        }
    }

    /// Source double that always fails.
    struct FailingSource;

    #[async_trait]
    impl LocationSource for FailingSource {
        async fn fetch_dataset(&self) -> Result<Dataset, SourceError> {
            Err(SourceError::Parse {
                message: "provider unreachable".to_owned(),
            })
        }
    }

    fn point(id: &str, status: PointStatus, lat: f64) -> Point {
        Point {
            id: id.to_owned(),
            name: None,
            city: None,
            region: None,
            status,
            lat,
            lon: 0.0,
        }
    }

    fn state_with_source(source: Arc<dyn LocationSource>) -> web::Data<AppState> {
        web::Data::new(AppState {
            index: IndexService::new(Arc::new(MemoryCache::new()), source),
            geocode_client: reqwest::Client::new(),
            // Unroutable per RFC 5737; geocode calls in these tests must
            // never be reached.
            geocoder_base_url: "http://192.0.2.1".to_string(),
        })
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state)
                    .configure(crate::configure_api),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_reports_service_and_version() {
        let app = init_app!(state_with_source(Arc::new(StaticSource(Vec::new()))));

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["healthy"], true);
        assert_eq!(body["service"], "status-map");
    }

    #[actix_web::test]
    async fn coordinates_query_returns_the_index() {
        let dataset = vec![
            point("near-open", PointStatus::Open, 0.0289),
            point("mid-closed", PointStatus::Closed, 0.1446),
            point("far-open", PointStatus::Open, 0.8674),
        ];
        let app = init_app!(state_with_source(Arc::new(StaticSource(dataset))));

        let req = test::TestRequest::get()
            .uri("/api/index/coordinates?lat=0.0&lon=0.0&radius=50")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total"], 2);
        assert_eq!(body["openCount"], 1);
        assert_eq!(body["closedCount"], 1);
        assert_eq!(body["points"][0]["id"], "near-open");
    }

    #[actix_web::test]
    async fn out_of_range_latitude_is_a_validation_error() {
        let app = init_app!(state_with_source(Arc::new(StaticSource(Vec::new()))));

        let req = test::TestRequest::get()
            .uri("/api/index/coordinates?lat=95&lon=0.0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "Latitude must be between -90 and 90");
    }

    #[actix_web::test]
    async fn non_numeric_latitude_is_a_structured_validation_error() {
        let app = init_app!(state_with_source(Arc::new(StaticSource(Vec::new()))));

        let req = test::TestRequest::get()
            .uri("/api/index/coordinates?lat=abc&lon=0.0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Invalid query parameter")
        );
    }

    #[actix_web::test]
    async fn non_numeric_radius_is_a_structured_validation_error() {
        let app = init_app!(state_with_source(Arc::new(StaticSource(Vec::new()))));

        let req = test::TestRequest::get()
            .uri("/api/index/zip?zip=30030&radius=wide")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
    }

    #[actix_web::test]
    async fn out_of_range_longitude_is_a_validation_error() {
        let app = init_app!(state_with_source(Arc::new(StaticSource(Vec::new()))));

        let req = test::TestRequest::get()
            .uri("/api/index/coordinates?lat=0.0&lon=181")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Longitude must be between -180 and 180");
    }

    #[actix_web::test]
    async fn short_zip_fails_validation_before_any_network_access() {
        // The failing source and unroutable geocoder prove nothing past
        // validation is touched.
        let app = init_app!(state_with_source(Arc::new(FailingSource)));

        let req = test::TestRequest::get()
            .uri("/api/index/zip?zip=1234")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "Invalid ZIP code format. Must be 5 digits.");
    }

    #[actix_web::test]
    async fn missing_zip_is_a_validation_error() {
        let app = init_app!(state_with_source(Arc::new(FailingSource)));

        let req = test::TestRequest::get().uri("/api/index/zip").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "ZIP code is required");
    }

    #[actix_web::test]
    async fn upstream_fetch_failure_is_a_bad_gateway() {
        let app = init_app!(state_with_source(Arc::new(FailingSource)));

        let req = test::TestRequest::get()
            .uri("/api/index/coordinates?lat=0.0&lon=0.0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_GATEWAY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "upstream_error");
    }

    #[actix_web::test]
    async fn coordinates_query_serves_from_a_seeded_cache() {
        // Seed the cache directly; the failing source proves the handler
        // never needed the provider.
        let cache = Arc::new(MemoryCache::new());
        cache
            .put(
                DATASET_CACHE_KEY,
                vec![point("cached", PointStatus::Open, 0.0)],
                3600,
            )
            .await
            .unwrap();
        let state = web::Data::new(AppState {
            index: IndexService::new(cache, Arc::new(FailingSource)),
            geocode_client: reqwest::Client::new(),
            geocoder_base_url: "http://192.0.2.1".to_string(),
        });
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri("/api/index/coordinates?lat=0.0&lon=0.0")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total"], 1);
        assert_eq!(body["points"][0]["id"], "cached");
    }

    #[actix_web::test]
    async fn refresh_returns_counts_without_aggregation() {
        let dataset = vec![
            point("1", PointStatus::Open, 0.0),
            point("2", PointStatus::Closed, 0.0),
        ];
        let app = init_app!(state_with_source(Arc::new(StaticSource(dataset))));

        let req = test::TestRequest::post().uri("/api/refresh").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["message"], "Cache refreshed successfully");
        assert_eq!(body["locationsCount"], 2);
        assert!(body["updatedAt"].is_string());
        assert!(body.get("openCount").is_none());
    }

    #[actix_web::test]
    async fn zip_validation_rejects_non_digit_codes() {
        assert!(validate_zip(Some("30030")).is_ok());
        assert!(validate_zip(Some("1234")).is_err());
        assert!(validate_zip(Some("123456")).is_err());
        assert!(validate_zip(Some("3003o")).is_err());
        assert!(validate_zip(None).is_err());
    }

    #[actix_web::test]
    async fn latitude_bounds_are_inclusive() {
        assert!(validate_latitude(Some(90.0)).is_ok());
        assert!(validate_latitude(Some(-90.0)).is_ok());
        assert!(validate_latitude(Some(90.0001)).is_err());
    }

    #[actix_web::test]
    async fn longitude_bounds_are_inclusive() {
        assert!(validate_longitude(Some(180.0)).is_ok());
        assert!(validate_longitude(Some(-180.0)).is_ok());
        assert!(validate_longitude(Some(-180.0001)).is_err());
    }
}
