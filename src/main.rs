mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::Settings;
use crate::core::compatibility::BlendWeights;
use crate::core::{CompatibilityEngine, DiscoveryEngine, MatchEngine, RateLimiter};
use crate::routes::matches::AppState;
use crate::services::{
    CompatibilityCache, HttpInsightClient, InsightProvider, NoopInsight, PgStore,
};

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
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
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

    info!("Starting Amora matching engine...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL-backed store
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let store = Arc::new(
        PgStore::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);

    // Initialize the enrichment provider (optional - the engine degrades
    // gracefully whenever it is unavailable)
    let insights: Arc<dyn InsightProvider> = if settings.enrichment.enabled {
        match HttpInsightClient::new(
            settings.enrichment.base_url.clone(),
            settings.enrichment.api_key.clone(),
            Duration::from_secs(settings.enrichment.timeout_secs),
        ) {
            Ok(client) => {
                info!(
                    "Enrichment provider configured ({}s timeout)",
                    settings.enrichment.timeout_secs
                );
                Arc::new(client)
            }
            Err(e) => {
                error!("Failed to build enrichment client ({}), running without", e);
                Arc::new(NoopInsight)
            }
        }
    } else {
        info!("Enrichment disabled");
        Arc::new(NoopInsight)
    };

    // Result cache for the pure scoring phase
    let cache = Arc::new(CompatibilityCache::new(
        settings.cache.capacity,
        settings.cache.ttl_secs,
    ));

    info!(
        "Compatibility cache initialized ({} entries, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    // Wire the engines
    let blend = BlendWeights {
        personality: settings.scoring.blend.personality,
        lifestyle: settings.scoring.blend.lifestyle,
        deal_breakers: settings.scoring.blend.deal_breakers,
    };

    let compat = CompatibilityEngine::new(blend, insights.clone(), cache);
    let discovery = DiscoveryEngine::new(compat.clone());
    let matcher = Arc::new(MatchEngine::new(
        store.clone(),
        store.clone(),
        insights,
        compat.clone(),
    ));

    info!("Engines initialized with blend weights: {:?}", blend);

    let limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(settings.rate_limit.idle_ttl_secs),
        Duration::from_secs(settings.rate_limit.sweep_interval_secs),
    ));

    // Build application state
    let app_state = AppState {
        profiles: store,
        matcher,
        compat,
        discovery,
        limiter,
        rate_limits: settings.rate_limit.clone(),
        discovery_settings: settings.discovery.clone(),
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
