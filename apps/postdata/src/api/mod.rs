//! # POSTDATA HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /info` - Information about the service
//! - `GET /corpora` - List corpora (`?include=metrics` adds poem and author counts)
//! - `GET /corpora/{corpus}/poems` - Basic metadata of every poem
//! - `GET /corpora/{corpus}/poems/{id}` - Poem metadata with authors
//! - `GET /corpora/{corpus}/poems/{id}/analysis` - Metrical analysis of a poem
//! - `GET /corpora/{corpus}/poems/{id}/syllables/{kind}` - Syllable counts of one kind
//!
//! ## Configuration
//!
//! - `ServiceConfig::rate_limit`: Requests per second (default: 50, 0 to disable)
//! - `POSTDATA_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod middleware;
mod types;

pub use middleware::RequestBudget;
// Re-export handlers and types for integration tests (via `postdata::api::*`)
pub use handlers::{
    analysis_handler, corpora_handler, health_handler, info_handler, poem_handler, poems_handler,
    syllables_handler,
};
pub use types::{
    ApiError, CorporaParams, ErrorResponse, HealthResponse, InfoResponse, SyllablesResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use postdata_core::{PostdataError, QueryExecutor};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the query executor and the service settings.
///
/// The executor is read-only and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn QueryExecutor>,
    pub service: Arc<ServiceConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(executor: Arc<dyn QueryExecutor>, service: ServiceConfig) -> Self {
        Self {
            executor,
            service: Arc::new(service),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `POSTDATA_CORS_ORIGINS`.
///
/// - `*`: allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("POSTDATA_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (POSTDATA_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in POSTDATA_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            }
        }
        None => {
            tracing::info!("CORS: No POSTDATA_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// CORS layer that only allows localhost frontends.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ];
    let origins: Vec<HeaderValue> = localhost_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Request budget (if `rate_limit` is non-zero)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let budget = RequestBudget::per_second(state.service.rate_limit);
    match &budget {
        Some(budget) => {
            tracing::info!("Rate limiting enabled: {} requests/second", budget.limit())
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/info", get(handlers::info_handler))
        .route("/corpora", get(handlers::corpora_handler))
        .route("/corpora/{corpus}/poems", get(handlers::poems_handler))
        .route("/corpora/{corpus}/poems/{id}", get(handlers::poem_handler))
        .route(
            "/corpora/{corpus}/poems/{id}/analysis",
            get(handlers::analysis_handler),
        )
        .route(
            "/corpora/{corpus}/poems/{id}/syllables/{kind}",
            get(handlers::syllables_handler),
        );

    if let Some(budget) = budget {
        router = router.layer(axum_middleware::from_fn_with_state(
            budget,
            middleware::enforce_budget,
        ));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), PostdataError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PostdataError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("POSTDATA HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| PostdataError::IoError(format!("Server error: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================
