//! Blend optimization endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::super::envelope::{ApiErrorResponse, ApiResponse};
use super::super::request::BlendRequest;
use super::ApiState;

/// POST /api/v1/optimize - Run the blend optimizer
///
/// The engine is CPU-bound, so it runs on the blocking pool under the
/// configured wall-clock budget. A timed-out run is abandoned, not aborted.
pub async fn optimize(
    State(state): State<ApiState>,
    payload: Result<Json<BlendRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected optimization request body");
            return if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiErrorResponse::payload_too_large(rejection.body_text())
            } else {
                ApiErrorResponse::bad_request(rejection.body_text())
            };
        }
    };

    if let Err(e) = request.validate(state.max_materials) {
        warn!(error = %e, "Invalid optimization request");
        return ApiErrorResponse::bad_request(e.to_string());
    }

    let materials = request.materials.len();
    let parameters = request.config.selected_parameters.len();
    let started = Instant::now();

    let optimizer = Arc::clone(&state.optimizer);
    let task = tokio::task::spawn_blocking(move || {
        optimizer.optimize(&request.materials, &request.config)
    });

    match tokio::time::timeout(state.optimize_timeout, task).await {
        Ok(Ok(result)) => {
            info!(
                materials,
                parameters,
                success = result.success,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Optimization request served"
            );
            ApiResponse::ok(result)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Optimization task failed");
            ApiErrorResponse::internal(format!("Optimization failed: {e}"))
        }
        Err(_) => {
            warn!(
                materials,
                parameters,
                timeout_secs = state.optimize_timeout.as_secs_f64(),
                "Optimization exceeded time budget"
            );
            ApiErrorResponse::gateway_timeout(format!(
                "Optimization did not finish within {:.1}s",
                state.optimize_timeout.as_secs_f64()
            ))
        }
    }
}
