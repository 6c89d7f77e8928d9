//! API route definitions
//!
//! - /api/v1/optimize  - run the blend optimizer
//! - /api/v1/reference - standard limits, zero-seeking set, categories
//! - /api/v1/health    - service health
//! - /health           - bare health check

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, ApiState};

/// Versioned API routes, nested under `/api/v1`
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/optimize", post(handlers::optimize))
        .route("/reference", get(handlers::get_reference))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

/// Legacy health endpoint at root level
pub fn legacy_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::legacy_health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlendiqConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn create_test_state() -> ApiState {
        ApiState::from_config(&BlendiqConfig::default())
    }

    #[tokio::test]
    async fn test_api_routes_health() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_reference() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/reference").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_optimize_requires_post() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/optimize").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_legacy_health() {
        let app = legacy_routes(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
