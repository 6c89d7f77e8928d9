//! Core BlendOptimizer - entry point tying the engine stages together

use tracing::{info, warn};

use crate::config::{ReferenceData, SolverSettings};
use crate::types::{BlendConfig, Material, OptimizationResult};

use super::assembler::assemble;
use super::normalizer::normalize;
use super::solver::SearchDriver;

/// Blend-ratio optimizer.
///
/// Holds only read-only reference tables and solver tuning, so one instance
/// can serve any number of concurrent runs. Each call to [`optimize`] is a
/// pure function of its inputs.
///
/// [`optimize`]: BlendOptimizer::optimize
#[derive(Debug, Clone, Default)]
pub struct BlendOptimizer {
    reference: ReferenceData,
    settings: SolverSettings,
}

impl BlendOptimizer {
    pub fn new(reference: ReferenceData, settings: SolverSettings) -> Self {
        Self {
            reference,
            settings,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Find blend ratios for `materials` under `config`.
    ///
    /// Never fails: when no tolerance level succeeds the best-effort ratios
    /// come back with `success: false`.
    pub fn optimize(&self, materials: &[Material], config: &BlendConfig) -> OptimizationResult {
        let problem = normalize(materials, config, &self.reference);
        let tolerance = config.tolerance_fraction();

        let outcome =
            SearchDriver::new(&problem, &self.settings).search(tolerance, config.auto_relax);

        if outcome.success {
            info!(
                materials = materials.len(),
                parameters = problem.parameters.len(),
                attempts = outcome.attempts,
                relaxed_tolerance = ?outcome.relaxed_tolerance.map(|t| t * 100.0),
                objective = outcome.final_objective,
                "Blend optimization succeeded"
            );
        } else {
            warn!(
                materials = materials.len(),
                parameters = problem.parameters.len(),
                attempts = outcome.attempts,
                objective = outcome.final_objective,
                "No tolerance level produced an acceptable blend, returning best effort"
            );
        }

        assemble(materials, &problem, tolerance, &outcome)
    }
}

/// Optimize with the BS3882 reference tables and default solver settings.
pub fn optimize(materials: &[Material], config: &BlendConfig) -> OptimizationResult {
    BlendOptimizer::default().optimize(materials, config)
}
