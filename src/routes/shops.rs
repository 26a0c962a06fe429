use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

use crate::config::RankingSettings;
use crate::core::Ranker;
use crate::error::RankError;
use crate::models::{ErrorResponse, HealthResponse, NearbyRequest, NearbyResponse, RankQuery, ShopResult};
use crate::services::{RateDecision, RateLimitStore, ShopSource};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub ranker: Ranker,
    pub source: Arc<ShopSource>,
    pub rate_limiter: Arc<RateLimitStore>,
    pub ranking: RankingSettings,
    pub sweep_threshold: usize,
}

/// Configure all shop-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/shops/nearby", web::post().to(find_nearby));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn rank_error_response(err: &RankError) -> HttpResponse {
    use actix_web::http::StatusCode;

    if err.is_validation() {
        error_response(StatusCode::BAD_REQUEST, "invalid_query", err.to_string())
    } else {
        error_response(StatusCode::BAD_GATEWAY, "retrieval_failed", err.to_string())
    }
}

/// Find nearby shops endpoint
///
/// POST /api/v1/shops/nearby
///
/// Request body:
/// ```json
/// {
///   "latitude": 52.3676,
///   "longitude": 4.9041,
///   "radiusKm": 5.0,
///   "limit": 20,
///   "preferences": {
///     "preferredPriceTiers": ["BUDGET"],
///     "maxTravelDistanceKm": 2.0,
///     "favoriteFeatures": ["wifi"]
///   }
/// }
/// ```
async fn find_nearby(
    state: web::Data<AppState>,
    req: web::Json<NearbyRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let client = http_req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    state.rate_limiter.sweep_if_due(state.sweep_threshold);

    if let RateDecision::Limited { retry_after_secs } = state.rate_limiter.check(&client) {
        tracing::info!("Rate limited client {}", client);
        return HttpResponse::TooManyRequests()
            .insert_header(("Retry-After", retry_after_secs.to_string()))
            .json(ErrorResponse {
                error: "rate_limited".to_string(),
                message: format!("Too many requests, retry in {}s", retry_after_secs),
                status_code: 429,
            });
    }

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for nearby request: {}", errors);
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "validation_failed",
            errors.to_string(),
        );
    }

    let request = req.into_inner();
    let limit = request
        .limit
        .unwrap_or(state.ranking.default_limit)
        .min(state.ranking.max_limit) as usize;

    let query = RankQuery {
        center: request.center(),
        radius_km: request.radius_km.unwrap_or(state.ranking.default_radius_km),
        preferences: request.preferences.into(),
        limit,
    };

    let span = tracing::info_span!("find_nearby", request_id = %uuid::Uuid::new_v4(), client = %client);

    async move {
        tracing::info!(
            "Ranking shops around ({}, {}) within {}km, limit {}",
            query.center.latitude,
            query.center.longitude,
            query.radius_km,
            query.limit
        );

        match state.ranker.rank(&query, state.source.as_ref()).await {
            Ok(result) => {
                tracing::info!(
                    "Returning {} shops ({} in radius, {} fetched)",
                    result.matches.len(),
                    result.within_radius,
                    result.total_candidates
                );

                HttpResponse::Ok().json(NearbyResponse {
                    results: result.matches.into_iter().map(ShopResult::from).collect(),
                    total_candidates: result.total_candidates,
                    within_radius: result.within_radius,
                })
            }
            Err(e) => {
                if e.is_validation() {
                    tracing::info!("Rejected nearby query: {}", e);
                } else {
                    tracing::error!("Nearby query failed: {}", e);
                }
                rank_error_response(&e)
            }
        }
    }
    .instrument(span)
    .await
}
