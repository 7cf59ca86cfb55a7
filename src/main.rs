use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use dormmatch::config::Settings;
use dormmatch::core::{MatchEngine, Ranker};
use dormmatch::models::{Coordinates, ScoringWeights};
use dormmatch::routes::{self, search::AppState};
use dormmatch::services::{CatalogStore, EntityResolver, PlacesClient, QualityCache, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting DormMatch ranking service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize the places directory client
    let places = Arc::new(PlacesClient::new(
        settings.places.endpoint.clone(),
        settings.places.api_key.clone(),
        Duration::from_secs(settings.places.timeout_secs),
    ));

    info!("Places client initialized");

    let reference = Coordinates {
        lat: settings.places.reference.lat,
        lng: settings.places.reference.lng,
    };

    let resolver = Arc::new(EntityResolver::new(
        Arc::clone(&places),
        settings.places.institution.clone(),
        settings.places.locality.clone(),
        settings.places.radius_m,
        settings.places.aliases.clone(),
    ));

    // Initialize the quality cache
    let quality = Arc::new(QualityCache::new(
        settings.cache.max_capacity,
        Duration::from_secs(settings.cache.ttl_secs),
        Duration::from_secs(settings.cache.negative_ttl_secs),
    ));

    info!(
        "Quality cache initialized (capacity: {}, TTL: {}s, negative TTL: {}s)",
        settings.cache.max_capacity, settings.cache.ttl_secs, settings.cache.negative_ttl_secs
    );

    // Initialize the catalog store
    let catalog = Arc::new(CatalogStore::new(
        settings.catalog.dorms_path.clone(),
        settings.catalog.coords_path.clone(),
        Duration::from_secs(settings.catalog.ttl_secs),
    ));

    if settings.catalog.preload {
        match catalog.load().await {
            Ok(dorms) => info!("Catalog preloaded ({} dorms)", dorms.len()),
            Err(e) => {
                error!("Failed to preload catalog: {}", e);
                panic!("Catalog error: {}", e);
            }
        }
    }

    // Initialize the ranker with configured weights
    let weights = ScoringWeights {
        room_type: settings.scoring.weights.room_type,
        price: settings.scoring.weights.price,
        zone: settings.scoring.weights.zone,
        building: settings.scoring.weights.building,
        quality: settings.scoring.weights.quality,
    };

    let ranker = Arc::new(Ranker::new(
        MatchEngine::new(weights),
        resolver,
        Arc::clone(&quality),
        reference,
        settings.matching.concurrency,
    ));

    info!(
        "Ranker initialized (weights: {:?}, concurrency: {})",
        weights, settings.matching.concurrency
    );

    let limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(settings.rate_limit.window_secs),
        settings.rate_limit.max_requests,
    ));

    // Build application state
    let app_state = AppState {
        catalog,
        ranker,
        limiter,
        max_limit: settings.matching.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
