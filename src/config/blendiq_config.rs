//! BlendIQ service configuration - solver tuning, reference tables and server
//! settings as operator-tunable TOML values.
//!
//! Every struct implements `Default` with the engine's standard constants, so
//! a missing file or section changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use super::reference::ReferenceData;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "BLENDIQ_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "blendiq.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a BlendIQ deployment.
///
/// Load with `BlendiqConfig::load()` which searches:
/// 1. `$BLENDIQ_CONFIG` env var
/// 2. `./blendiq.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendiqConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search driver tuning
    #[serde(default)]
    pub solver: SolverSettings,

    /// Standard limits, zero-seeking set and categories
    #[serde(default)]
    pub reference: ReferenceData,
}

impl BlendiqConfig {
    /// Load configuration using the standard search order:
    /// 1. `$BLENDIQ_CONFIG` environment variable
    /// 2. `./blendiq.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from BLENDIQ_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from BLENDIQ_CONFIG, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "BLENDIQ_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./blendiq.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./blendiq.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./blendiq.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No blendiq.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate settings for internal consistency.
    ///
    /// Rules:
    /// - Solver step sizes and budgets must be positive and finite
    /// - The relax schedule must be non-empty, strictly increasing, within (0, 1]
    /// - Reference limits must have lower <= upper
    /// - The request timeout must be non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.solver;
        Self::check_positive(s.learning_rate, "solver.learning_rate", &mut errors);
        Self::check_positive(s.gradient_step, "solver.gradient_step", &mut errors);
        Self::check_positive(s.convergence_threshold, "solver.convergence_threshold", &mut errors);
        Self::check_positive(s.success_multiplier, "solver.success_multiplier", &mut errors);
        Self::check_positive(s.out_of_margin_penalty, "solver.out_of_margin_penalty", &mut errors);
        if s.max_iterations == 0 {
            errors.push("solver.max_iterations must be > 0".to_string());
        }
        if s.projection_passes == 0 {
            errors.push("solver.projection_passes must be > 0".to_string());
        }

        if s.relax_schedule.is_empty() {
            errors.push("solver.relax_schedule must contain at least one tolerance".to_string());
        }
        for (i, t) in s.relax_schedule.iter().enumerate() {
            if !t.is_finite() || *t <= 0.0 || *t > 1.0 {
                errors.push(format!(
                    "solver.relax_schedule[{i}] = {t} must be within (0, 1]"
                ));
            }
        }
        if s.relax_schedule.windows(2).any(|w| w[1] <= w[0]) {
            errors.push("solver.relax_schedule must be strictly increasing".to_string());
        }

        for (name, limit) in &self.reference.limits {
            for side in [limit.lower, limit.upper].into_iter().flatten() {
                if !side.is_finite() {
                    errors.push(format!("reference.limits.\"{name}\" must be finite"));
                }
            }
            if let (Some(l), Some(u)) = (limit.lower, limit.upper) {
                if l > u {
                    errors.push(format!(
                        "reference.limits.\"{name}\": lower ({l}) must be <= upper ({u})"
                    ));
                }
            }
        }

        if self.server.optimize_timeout_secs == 0 {
            errors.push("server.optimize_timeout_secs must be > 0".to_string());
        }
        if self.server.max_materials < defaults::MIN_MATERIALS {
            errors.push(format!(
                "server.max_materials must be >= {}",
                defaults::MIN_MATERIALS
            ));
        }

        for w in &super::validation::validate_ranges(self) {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, catch them explicitly
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a finite number > 0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Solver Settings
// ============================================================================

/// Gradient estimator used by the search driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMethod {
    /// `(f(x + h e_i) - f(x)) / h`
    #[default]
    Forward,
    /// `(f(x + h e_i) - f(x - h e_i)) / 2h`
    Central,
}

/// Projected-gradient search tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Iteration cap per tolerance attempt
    pub max_iterations: usize,
    /// Fixed gradient-descent step size
    pub learning_rate: f64,
    /// Finite-difference perturbation
    pub gradient_step: f64,
    pub gradient: GradientMethod,
    /// Objective change counted as stagnant
    pub convergence_threshold: f64,
    /// Early stop after more than this many consecutive stagnant iterations
    pub stagnation_window: usize,
    /// Attempt succeeds when objective < tolerance * multiplier
    pub success_multiplier: f64,
    /// Weight on squared residuals beyond the tolerance fraction
    pub out_of_margin_penalty: f64,
    /// Tolerance fractions tried in order under auto-relax
    pub relax_schedule: Vec<f64>,
    /// Bisection step budget per projection
    pub projection_passes: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: defaults::MAX_ITERATIONS,
            learning_rate: defaults::LEARNING_RATE,
            gradient_step: defaults::GRADIENT_STEP,
            gradient: GradientMethod::Forward,
            convergence_threshold: defaults::CONVERGENCE_THRESHOLD,
            stagnation_window: defaults::STAGNATION_WINDOW,
            success_multiplier: defaults::SUCCESS_MULTIPLIER,
            out_of_margin_penalty: defaults::OUT_OF_MARGIN_PENALTY,
            relax_schedule: defaults::RELAX_SCHEDULE.to_vec(),
            projection_passes: defaults::PROJECTION_PASSES,
        }
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `BLENDIQ_SERVER_ADDR` env var or `--addr` CLI flag.
    pub addr: String,
    /// Wall-clock budget for one optimization request
    pub optimize_timeout_secs: u64,
    /// Request body size cap
    pub max_body_bytes: usize,
    /// Largest material list accepted per request
    pub max_materials: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::SERVER_ADDR.to_string(),
            optimize_timeout_secs: defaults::OPTIMIZE_TIMEOUT_SECS,
            max_body_bytes: defaults::MAX_BODY_BYTES,
            max_materials: defaults::MAX_MATERIALS,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
