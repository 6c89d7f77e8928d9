//! System-wide default constants.
//!
//! Centralises the solver and service numbers so `SolverSettings` and
//! `ServerConfig` defaults share one source. Grouped by subsystem.

// ============================================================================
// Search Driver
// ============================================================================

/// Iteration cap per tolerance attempt.
pub const MAX_ITERATIONS: usize = 1_000;

/// Fixed gradient-descent step size.
pub const LEARNING_RATE: f64 = 0.01;

/// Forward-difference perturbation applied to each ratio component.
pub const GRADIENT_STEP: f64 = 1e-6;

/// Objective change below which an iteration counts as stagnant.
pub const CONVERGENCE_THRESHOLD: f64 = 1e-9;

/// Stop once more than this many consecutive iterations are stagnant.
pub const STAGNATION_WINDOW: usize = 10;

/// An attempt succeeds when `objective < tolerance * SUCCESS_MULTIPLIER`.
pub const SUCCESS_MULTIPLIER: f64 = 10.0;

/// Weight applied to squared residuals that exceed the tolerance fraction.
pub const OUT_OF_MARGIN_PENALTY: f64 = 10.0;

/// Tolerance fractions tried, in order, when auto-relax is enabled.
pub const RELAX_SCHEDULE: [f64; 5] = [0.4, 0.5, 0.6, 0.8, 1.0];

/// Maximum bisection steps on the projection shift.
pub const PROJECTION_PASSES: usize = 100;

/// Per-material bound slack accepted by the projection.
pub const PROJECTION_BOUND_EPSILON: f64 = 1e-12;

// ============================================================================
// Result Assembly
// ============================================================================

/// Missing-data warnings list at most this many parameter names.
pub const MISSING_PARAMETER_DISPLAY_LIMIT: usize = 5;

/// Method tag reported in `optimizationDetails`.
pub const METHOD_NAME: &str = "projected-gradient";

// ============================================================================
// HTTP Server
// ============================================================================

/// Default bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

/// Wall-clock budget for one optimization request (seconds).
pub const OPTIMIZE_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted request body (bytes). 2 MiB.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Maximum materials accepted in one request.
pub const MAX_MATERIALS: usize = 50;

/// Fewest materials a blend request may carry.
pub const MIN_MATERIALS: usize = 2;
