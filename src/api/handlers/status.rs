//! Service state endpoints: health, reference tables

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::config::reference::{CLAY_RANGE, SAND_RANGE, SILT_RANGE};
use crate::config::ReferenceData;

use super::super::envelope::ApiResponse;
use super::ApiState;

// ============================================================================
// Health Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

fn build_health(state: &ApiState) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
    }
}

/// GET /api/v1/health
pub async fn get_health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(build_health(&state))
}

/// GET /health - Bare health check for load balancers
pub async fn legacy_health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(build_health(&state))
}

// ============================================================================
// Reference Endpoint
// ============================================================================

/// Fixed clay/silt/sand acceptance window (%).
#[derive(Debug, Serialize)]
pub struct TextureRanges {
    pub clay: (f64, f64),
    pub silt: (f64, f64),
    pub sand: (f64, f64),
}

#[derive(Debug, Serialize)]
pub struct ReferenceResponse<'a> {
    #[serde(flatten)]
    pub tables: &'a ReferenceData,
    pub soil_texture: TextureRanges,
}

/// GET /api/v1/reference - Standard limits, zero-seeking set and categories
pub async fn get_reference(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(ReferenceResponse {
        tables: state.optimizer.reference(),
        soil_texture: TextureRanges {
            clay: CLAY_RANGE,
            silt: SILT_RANGE,
            sand: SAND_RANGE,
        },
    })
}
