use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::{Validate, ValidationErrors};

use crate::core::Ranker;
use crate::models::{ErrorResponse, HealthResponse, SearchRequest, SearchResponse};
use crate::services::{CatalogStore, RateLimiter};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub ranker: Arc<Ranker>,
    pub limiter: Arc<RateLimiter>,
    pub max_limit: u16,
}

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search))
        .route("/rank-dorms", web::post().to(search))
        .route("/dorms", web::get().to(list_dorms))
        .route("/map", web::get().to(map_data));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Ranking endpoint
///
/// POST /search (alias: /rank-dorms)
///
/// Request body:
/// ```json
/// {
///   "roomType": "Double",
///   "maxBudget": 4000,
///   "location": "North Campus",
///   "limit": 10
/// }
/// ```
async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let client = http_req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    if !state.limiter.try_acquire(&client).await {
        tracing::info!("rate limit exceeded for {}", client);
        return HttpResponse::TooManyRequests().json(ErrorResponse::with_details(
            "Too many requests",
            "Request limit reached, please try again later",
        ));
    }

    // Validate request
    if let Err(errors) = req.validate() {
        let details = field_details(&errors);
        tracing::info!("validation failed for search request: {:?}", details);
        return HttpResponse::BadRequest().json(ErrorResponse::with_details(
            "Missing or invalid fields",
            details,
        ));
    }

    let query = req.to_query();
    tracing::info!(
        "search request: roomType={}, maxBudget={}, location={}",
        query.room_type,
        query.max_budget,
        query.zone
    );

    let catalog = match state.catalog.load().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("failed to load catalog: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                "Unable to load dorm data",
                "Please try again later",
            ));
        }
    };

    let top_k = req.limit.map(|limit| limit.min(state.max_limit) as usize);
    let outcome = state.ranker.rank(&catalog, &query, top_k).await;

    tracing::info!(
        "returning {} dorms (from {} catalog records)",
        outcome.ranked.len(),
        outcome.total_considered
    );

    if outcome.ranked.is_empty() {
        return HttpResponse::Ok().json(SearchResponse {
            dorms: vec![],
            message: Some(
                "No dorms found matching your criteria. Try adjusting your room type, budget, or location."
                    .to_string(),
            ),
        });
    }

    HttpResponse::Ok().json(SearchResponse {
        dorms: outcome.ranked,
        message: None,
    })
}

/// Normalized catalog endpoint
///
/// GET /dorms
async fn list_dorms(state: web::Data<AppState>) -> impl Responder {
    match state.catalog.load().await {
        Ok(catalog) => HttpResponse::Ok().json(&*catalog),
        Err(e) => {
            tracing::error!("failed to load catalog: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                "Unable to load dorm data",
                "Please try again later",
            ))
        }
    }
}

/// Map data endpoint: the same normalized catalog, coordinates merged
///
/// GET /map
async fn map_data(state: web::Data<AppState>) -> impl Responder {
    match state.catalog.load().await {
        Ok(catalog) => HttpResponse::Ok().json(&*catalog),
        Err(e) => {
            tracing::error!("failed to load catalog for map: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                "Unable to load map data",
                "Please try again later",
            ))
        }
    }
}

/// Flatten validator errors into a field-keyed detail map using the wire
/// field names.
fn field_details(errors: &ValidationErrors) -> HashMap<String, String> {
    errors
        .field_errors()
        .iter()
        .map(|(field, field_errors)| {
            let name = match *field {
                "room_type" => "roomType",
                "max_budget" => "maxBudget",
                other => other,
            };
            let message = field_errors
                .first()
                .and_then(|error| error.message.clone())
                .map(|message| message.into_owned())
                .unwrap_or_else(|| format!("{} is invalid", name));
            (name.to_string(), message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_details_use_wire_names() {
        let request = SearchRequest {
            room_type: None,
            max_budget: Some(-5.0),
            location: None,
            limit: None,
        };
        let errors = request.validate().unwrap_err();
        let details = field_details(&errors);

        assert!(details.contains_key("roomType"));
        assert!(details.contains_key("maxBudget"));
        assert!(details.contains_key("location"));
        assert_eq!(details["maxBudget"], "Budget must be a positive number");
    }

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
