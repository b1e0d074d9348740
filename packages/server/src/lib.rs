#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the status map application.
//!
//! Serves the REST API for querying the open/closed status index around a
//! coordinate or ZIP code. All interesting work happens in the injected
//! [`IndexService`]; the handlers here only validate parameters, invoke the
//! core, and shape responses.

mod handlers;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use status_map_cache::FileCache;
use status_map_index::IndexService;
use status_map_server_models::ApiError;
use status_map_source::NextDataSource;

/// Registers the API routes on an Actix service config.
///
/// Split out from [`run_server`] so tests can mount the same routes on an
/// in-memory test service. Query extractor failures (e.g. a non-numeric
/// `lat`) are caller-fixable, so they are mapped to the same structured
/// validation payload the handlers produce.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid query parameter: {err}");
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiError::validation(&message)),
        )
        .into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route(
                "/index/coordinates",
                web::get().to(handlers::index_by_coordinates),
            )
            .route("/index/zip", web::get().to(handlers::index_by_zip))
            .route("/refresh", web::post().to(handlers::refresh)),
    );
}

/// Shared application state.
pub struct AppState {
    /// Cache-backed index service.
    pub index: IndexService,
    /// HTTP client for geocode lookups.
    pub geocode_client: reqwest::Client,
    /// Base URL of the geocoding service.
    pub geocoder_base_url: String,
}

/// Starts the status map API server.
///
/// Builds the file-backed dataset cache and the location source from the
/// environment, wires them into an [`IndexService`], and starts the
/// Actix-Web HTTP server. This is a regular async function — the caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// Environment:
/// - `SOURCE_URL` (required) — location directory page to scrape.
/// - `GEOCODER_URL` — geocoder base URL, defaults to Zippopotam.us.
/// - `CACHE_DIR` — dataset cache directory, defaults to `data/cache`.
/// - `BIND_ADDR` / `PORT` — listen address, defaults to `127.0.0.1:8080`.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if `SOURCE_URL` is unset, the cache directory cannot be created,
/// or an HTTP client cannot be built.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let source_url = std::env::var("SOURCE_URL").expect("SOURCE_URL must be set");
    let geocoder_base_url = std::env::var("GEOCODER_URL")
        .unwrap_or_else(|_| status_map_geocoder::DEFAULT_BASE_URL.to_string());
    let cache_dir = std::env::var("CACHE_DIR").unwrap_or_else(|_| "data/cache".to_string());

    log::info!("Opening dataset cache at {cache_dir}...");
    let cache = FileCache::new(Path::new(&cache_dir)).expect("Failed to open dataset cache");

    let source = NextDataSource::new(&source_url).expect("Failed to build location source");
    let geocode_client =
        status_map_geocoder::build_client().expect("Failed to build geocode client");

    let state = web::Data::new(AppState {
        index: IndexService::new(Arc::new(cache), Arc::new(source)),
        geocode_client,
        geocoder_base_url,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
