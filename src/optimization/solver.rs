//! Constrained search driver
//!
//! Projected gradient descent over the blend simplex. Each attempt starts
//! from the uniform blend, takes fixed-size gradient steps, re-projects after
//! every step and stops early once the objective has stalled. When the
//! configured tolerance fails and auto-relax is on, fresh attempts run at
//! each relax-schedule tolerance in order until one succeeds.

use tracing::debug;

use crate::config::SolverSettings;

use super::normalizer::BlendProblem;
use super::objective::{gradient_strategy, BlendObjective, GradientStrategy, Objective};
use super::projection::{project, uniform};

/// Result of one attempt at a single tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// Tolerance fraction used by this attempt
    pub tolerance: f64,
    pub ratios: Vec<f64>,
    /// Objective at `ratios`
    pub objective: f64,
    pub iterations: usize,
    /// Stopped because the objective stalled rather than at the iteration cap
    pub stalled: bool,
    pub success: bool,
}

/// Outcome of the full search, including any relax attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Ratios from the last attempt run, successful or not
    pub ratios: Vec<f64>,
    pub success: bool,
    /// Relax-schedule tolerance fraction that succeeded, if relaxation was needed
    pub relaxed_tolerance: Option<f64>,
    /// Iterations of the last attempt
    pub iterations: usize,
    pub attempts: usize,
    pub final_objective: f64,
}

impl SearchOutcome {
    fn from_attempt(attempt: Attempt, attempts: usize, relaxed_tolerance: Option<f64>) -> Self {
        Self {
            ratios: attempt.ratios,
            success: attempt.success,
            relaxed_tolerance,
            iterations: attempt.iterations,
            attempts,
            final_objective: attempt.objective,
        }
    }
}

/// Runs attempts against one [`BlendProblem`].
pub struct SearchDriver<'a> {
    problem: &'a BlendProblem,
    settings: &'a SolverSettings,
    gradient: Box<dyn GradientStrategy>,
}

impl<'a> SearchDriver<'a> {
    pub fn new(problem: &'a BlendProblem, settings: &'a SolverSettings) -> Self {
        Self {
            problem,
            settings,
            gradient: gradient_strategy(settings.gradient, settings.gradient_step),
        }
    }

    /// Swap the gradient estimator.
    #[must_use]
    pub fn with_gradient(mut self, gradient: Box<dyn GradientStrategy>) -> Self {
        self.gradient = gradient;
        self
    }

    /// One projected-gradient run at tolerance fraction `tolerance`,
    /// starting from the uniform blend.
    pub fn run_attempt(&self, tolerance: f64) -> Attempt {
        let s = self.settings;
        let objective = BlendObjective::new(self.problem, tolerance, s.out_of_margin_penalty);
        let mut ratios = uniform(self.problem.material_count());

        let mut previous: Option<f64> = None;
        let mut stagnant = 0usize;
        let mut iterations = 0usize;
        let mut stalled = false;

        while iterations < s.max_iterations {
            iterations += 1;

            let value = objective.evaluate(&ratios);
            let gradient = self.gradient.gradient(&objective, &ratios, value);
            for (r, g) in ratios.iter_mut().zip(&gradient) {
                *r -= s.learning_rate * g;
            }
            project(&mut ratios, &self.problem.bounds, s.projection_passes);

            if let Some(prev) = previous {
                if (value - prev).abs() < s.convergence_threshold {
                    stagnant += 1;
                } else {
                    stagnant = 0;
                }
            }
            previous = Some(value);

            if stagnant > s.stagnation_window {
                stalled = true;
                break;
            }
        }

        let final_objective = objective.evaluate(&ratios);
        let success = final_objective < objective.tolerance() * s.success_multiplier;

        debug!(
            tolerance,
            iterations,
            stalled,
            objective = final_objective,
            success,
            "Blend attempt finished"
        );

        Attempt {
            tolerance,
            ratios,
            objective: final_objective,
            iterations,
            stalled,
            success,
        }
    }

    /// Run at `tolerance`, then, if that fails and `auto_relax` is set, at
    /// each relax-schedule tolerance until one succeeds.
    ///
    /// Every attempt restarts from the uniform blend. The last attempt's
    /// ratios are reported whether or not any attempt succeeded.
    pub fn search(&self, tolerance: f64, auto_relax: bool) -> SearchOutcome {
        let mut attempt = self.run_attempt(tolerance);
        let mut attempts = 1;

        if attempt.success || !auto_relax {
            return SearchOutcome::from_attempt(attempt, attempts, None);
        }

        for &relaxed in &self.settings.relax_schedule {
            attempt = self.run_attempt(relaxed);
            attempts += 1;
            if attempt.success {
                return SearchOutcome::from_attempt(attempt, attempts, Some(relaxed));
            }
        }

        SearchOutcome::from_attempt(attempt, attempts, None)
    }
}
