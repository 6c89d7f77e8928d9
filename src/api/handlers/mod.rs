//! API route handlers
//!
//! - Blend optimization (`POST /api/v1/optimize`)
//! - Reference tables and service health

mod optimize;
mod status;

pub use optimize::*;
pub use status::*;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::BlendiqConfig;
use crate::optimization::BlendOptimizer;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Engine instance shared by every request
    pub optimizer: Arc<BlendOptimizer>,
    /// Largest material list accepted per request
    pub max_materials: usize,
    /// Request body size cap in bytes
    pub max_body_bytes: usize,
    /// Wall-clock budget for one optimization
    pub optimize_timeout: Duration,
    /// Server start, for uptime reporting
    pub started_at: Instant,
}

impl ApiState {
    /// Build handler state from the loaded service configuration.
    pub fn from_config(config: &BlendiqConfig) -> Self {
        Self {
            optimizer: Arc::new(BlendOptimizer::new(
                config.reference.clone(),
                config.solver.clone(),
            )),
            max_materials: config.server.max_materials,
            max_body_bytes: config.server.max_body_bytes,
            optimize_timeout: Duration::from_secs(config.server.optimize_timeout_secs),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_mirrors_server_config() {
        let mut config = BlendiqConfig::default();
        config.server.max_materials = 7;
        config.server.optimize_timeout_secs = 12;
        let state = ApiState::from_config(&config);
        assert_eq!(state.max_materials, 7);
        assert_eq!(state.optimize_timeout, Duration::from_secs(12));
        assert_eq!(state.max_body_bytes, 2 * 1024 * 1024);
        assert!(state.uptime_secs() < 5);
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = ApiState::from_config(&BlendiqConfig::default());
        let response = legacy_health_check(axum::extract::State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }
}
