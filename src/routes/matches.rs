use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::config::{DiscoverySettings, RateLimitSettings};
use crate::core::{
    calculate_bounding_box, CompatibilityEngine, DiscoveryEngine, EngineError, MatchEngine,
    RateLimiter,
};
use crate::models::{
    ActionRequest, ActionResponse, DiscoverRequest, DiscoverResponse, DiscoveryBounds,
    ErrorResponse, EvaluateRequest, EvaluateResponse, GeoQuery, HealthResponse, MatchAction,
    ThrottledResponse,
};
use crate::services::ProfileStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub matcher: Arc<MatchEngine>,
    pub compat: CompatibilityEngine,
    pub discovery: DiscoveryEngine,
    pub limiter: Arc<RateLimiter>,
    pub rate_limits: RateLimitSettings,
    pub discovery_settings: DiscoverySettings,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/compatibility", web::post().to(evaluate_compatibility))
        .route("/discover", web::post().to(discover))
        .route("/matches/action", web::post().to(apply_action));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.profiles.health_check().await.unwrap_or(false);
    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Admission check shared by every throttled endpoint. Returns the 429
/// response when the caller is over its window.
fn throttle(state: &AppState, bucket: &str, user_id: &str) -> Option<HttpResponse> {
    let key = format!("{}:{}", bucket, user_id);
    let window = Duration::from_millis(state.rate_limits.window_ms);

    if state
        .limiter
        .allow(&key, state.rate_limits.max_requests, window)
    {
        return None;
    }

    let retry_after_secs = state.rate_limits.window_ms.div_ceil(1000);
    tracing::info!("Rate limit hit for {}", key);

    Some(
        HttpResponse::TooManyRequests()
            .append_header(("Retry-After", retry_after_secs.to_string()))
            .json(ThrottledResponse {
                error: "rate_limited".to_string(),
                message: "Too many requests, slow down".to_string(),
                retry_after_secs,
            }),
    )
}

fn engine_error_response(err: EngineError) -> HttpResponse {
    match &err {
        EngineError::InvalidProfile { .. } => HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_profile".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        EngineError::SelfAction => HttpResponse::BadRequest().json(ErrorResponse {
            error: "self_action".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        EngineError::InvalidAction(_) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_action".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        EngineError::UserNotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "user_not_found".to_string(),
            message: err.to_string(),
            status_code: 404,
        }),
        EngineError::Store(e) => {
            tracing::error!("Persistence failure: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "storage_unavailable".to_string(),
                message: "Internal server error".to_string(),
                status_code: 500,
            })
        }
    }
}

/// Evaluate compatibility for one pair
///
/// POST /api/v1/compatibility
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string",
///   "mode": "standard|detailed"
/// }
/// ```
async fn evaluate_compatibility(
    state: web::Data<AppState>,
    req: web::Json<EvaluateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if let Some(throttled) = throttle(&state, "compat", &req.user_id) {
        return throttled;
    }

    if req.user_id == req.target_user_id {
        return engine_error_response(EngineError::SelfAction);
    }

    let user = match state.profiles.find_user(&req.user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return engine_error_response(EngineError::UserNotFound(req.user_id.clone())),
        Err(e) => return engine_error_response(EngineError::Store(e)),
    };
    let target = match state.profiles.find_user(&req.target_user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return engine_error_response(EngineError::UserNotFound(req.target_user_id.clone()))
        }
        Err(e) => return engine_error_response(EngineError::Store(e)),
    };

    match state.compat.evaluate(&user, &target, req.mode).await {
        Ok(result) => HttpResponse::Ok().json(EvaluateResponse {
            user_id: req.user_id.clone(),
            target_user_id: req.target_user_id.clone(),
            score: result.score,
            band: result.band,
            enrichment: result.enrichment,
        }),
        Err(e) => engine_error_response(e),
    }
}

/// Find compatible candidates around the seeker
///
/// POST /api/v1/discover
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "maxDistanceMi": 50,
///   "limit": 20,
///   "preferredGenders": ["string"],
///   "minAge": 21,
///   "maxAge": 35
/// }
/// ```
async fn discover(state: web::Data<AppState>, req: web::Json<DiscoverRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for discover request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if let Some(throttled) = throttle(&state, "discover", &req.user_id) {
        return throttled;
    }

    let limit = req.limit.min(state.discovery_settings.max_limit) as usize;
    let max_distance_mi = req
        .max_distance_mi
        .unwrap_or(state.discovery_settings.max_distance_mi);

    tracing::info!(
        "Discovery for user {}, radius {}mi, limit {}",
        req.user_id,
        max_distance_mi,
        limit
    );

    let seeker = match state.profiles.find_user(&req.user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return engine_error_response(EngineError::UserNotFound(req.user_id.clone())),
        Err(e) => return engine_error_response(EngineError::Store(e)),
    };

    // Cheap bounding-box pre-filter at the store; the precise great-circle
    // cut happens in the pipeline.
    let query = GeoQuery {
        bounding_box: calculate_bounding_box(seeker.latitude, seeker.longitude, max_distance_mi),
        exclude_user_ids: vec![seeker.user_id.clone()],
        limit: limit * 5,
    };

    let candidates = match state.profiles.find_candidates(&query).await {
        Ok(candidates) => candidates,
        Err(e) => return engine_error_response(EngineError::Store(e)),
    };

    tracing::debug!(
        "Fetched {} candidates for {}",
        candidates.len(),
        req.user_id
    );

    let bounds = DiscoveryBounds {
        preferred_genders: req.preferred_genders.clone(),
        min_age: req.min_age,
        max_age: req.max_age,
    };

    match state
        .discovery
        .discover(&seeker, candidates, max_distance_mi, &bounds, limit)
    {
        Ok(result) => {
            tracing::info!(
                "Returning {} matches for user {} (from {} candidates)",
                result.matches.len(),
                req.user_id,
                result.total_candidates
            );
            HttpResponse::Ok().json(DiscoverResponse {
                matches: result.matches,
                total_candidates: result.total_candidates,
            })
        }
        Err(e) => engine_error_response(e),
    }
}

/// Record a like/pass/super-like and report whether the pair went mutual
///
/// POST /api/v1/matches/action
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string",
///   "action": "like|pass|super_like"
/// }
/// ```
async fn apply_action(state: web::Data<AppState>, req: web::Json<ActionRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if let Some(throttled) = throttle(&state, "action", &req.user_id) {
        return throttled;
    }

    let action = match req.action.to_lowercase().as_str() {
        "like" => MatchAction::Like,
        "pass" => MatchAction::Pass,
        "super_like" => MatchAction::SuperLike,
        other => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_action".to_string(),
                message: format!(
                    "Action must be one of: like, pass, super_like (got {})",
                    other
                ),
                status_code: 400,
            });
        }
    };

    match state
        .matcher
        .apply_action(&req.user_id, &req.target_user_id, action)
        .await
    {
        Ok(outcome) => {
            if outcome.matched {
                tracing::info!(
                    "Mutual match: {} and {}",
                    req.user_id,
                    req.target_user_id
                );
            }
            HttpResponse::Ok().json(ActionResponse {
                matched: outcome.matched,
                record: outcome.record,
            })
        }
        Err(e) => engine_error_response(e),
    }
}
