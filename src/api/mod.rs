//! REST API module using Axum
//!
//! Provides the HTTP boundary of the blend optimizer:
//! - `/api/v1` endpoints wrapped in a consistent `{data, meta}` envelope
//! - a bare `/health` for load balancers
//!
//! Request validation happens here; the engine behind it never rejects input.

pub mod envelope;
pub mod handlers;
pub mod request;
mod routes;

pub use handlers::ApiState;
pub use request::{BlendRequest, RequestError};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Environment variable listing allowed cross-origin callers.
pub const CORS_ENV_VAR: &str = "BLENDIQ_CORS_ORIGINS";

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `BLENDIQ_CORS_ORIGINS` to a comma-separated list of allowed origins
/// (e.g. `http://localhost:5173` for a local front-end dev server).
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match std::env::var(CORS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    let cors = build_cors_layer();
    let body_limit = state.max_body_bytes;

    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        // Legacy health endpoint at /health
        .merge(routes::legacy_routes(state))
        // Middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
