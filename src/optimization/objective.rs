//! Objective and gradient evaluation
//!
//! The objective is a pure function of the ratio vector: blend every
//! parameter, measure how far each blended value sits from its safety-margin
//! window (or from its target when inside the window), and sum the squared
//! normalized deviations. Deviations larger than the tolerance fraction are
//! weighted by the out-of-margin penalty.
//!
//! Gradient estimators sit behind [`GradientStrategy`] so the search driver
//! does not care how the slope is obtained.

use crate::config::GradientMethod;
use crate::types::{Limit, NEAR_ZERO};

use super::normalizer::BlendProblem;

/// Availability-weighted mean of one parameter.
///
/// Materials without a reading are excluded from both numerator and
/// denominator. Returns `None` when no material with data carries weight.
pub fn blend_value(ratios: &[f64], values: &[Option<f64>]) -> Option<f64> {
    let (weighted, weight) = ratios
        .iter()
        .zip(values)
        .filter_map(|(r, v)| v.map(|v| (r * v, *r)))
        .fold((0.0, 0.0), |(sv, sw), (rv, r)| (sv + rv, sw + r));

    (weight > 0.0).then(|| weighted / weight)
}

/// Where a blended value sits relative to a limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Below,
    Above,
    Within,
}

/// Deviation of a blended value, in parameter units, plus its normalizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub position: Position,
    /// `value - bound` when outside the window, `value - target` inside it
    pub signed: f64,
    pub divisor: f64,
}

impl Deviation {
    pub fn normalized(&self) -> f64 {
        self.signed / self.divisor
    }
}

fn nonzero(divisor: f64) -> f64 {
    if divisor < NEAR_ZERO {
        1.0
    } else {
        divisor
    }
}

/// Measure `value` against `window`.
///
/// Outside the window the deviation is taken from the violated bound and
/// normalized by that bound's magnitude. Inside it, the deviation is from
/// `target`, normalized by the width of the `original` limit when both sides
/// exist, by the upper limit for zero-target upper-only parameters, and by
/// the target otherwise. Near-zero divisors fall back to 1.
pub fn deviation(value: f64, target: f64, original: &Limit, window: &Limit) -> Deviation {
    if let Some(lower) = window.lower {
        if value < lower {
            return Deviation {
                position: Position::Below,
                signed: value - lower,
                divisor: nonzero(lower.abs()),
            };
        }
    }
    if let Some(upper) = window.upper {
        if value > upper {
            return Deviation {
                position: Position::Above,
                signed: value - upper,
                divisor: nonzero(upper.abs()),
            };
        }
    }

    let divisor = match (original.lower, original.upper) {
        (Some(l), Some(u)) => (u - l).abs(),
        (None, Some(u)) if target.abs() < NEAR_ZERO => u.abs(),
        _ => target.abs(),
    };
    Deviation {
        position: Position::Within,
        signed: value - target,
        divisor: nonzero(divisor),
    }
}

/// A scalar function of the ratio vector, lower is better.
pub trait Objective {
    fn evaluate(&self, ratios: &[f64]) -> f64;
}

/// Constraint-violation objective for one tolerance level.
pub struct BlendObjective<'a> {
    problem: &'a BlendProblem,
    /// Tightened window per parameter, aligned with `problem.parameters`
    windows: Vec<Limit>,
    tolerance: f64,
    penalty: f64,
}

impl<'a> BlendObjective<'a> {
    pub fn new(problem: &'a BlendProblem, tolerance: f64, penalty: f64) -> Self {
        let windows = problem
            .parameters
            .iter()
            .map(|p| p.limit.tightened(tolerance))
            .collect();
        Self {
            problem,
            windows,
            tolerance,
            penalty,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Objective for BlendObjective<'_> {
    fn evaluate(&self, ratios: &[f64]) -> f64 {
        self.problem
            .parameters
            .iter()
            .zip(&self.windows)
            .filter_map(|(series, window)| {
                let value = blend_value(ratios, &series.values)?;
                let r = deviation(value, series.target, &series.limit, window).normalized();
                let sq = r * r;
                Some(if r.abs() > self.tolerance {
                    sq * self.penalty
                } else {
                    sq
                })
            })
            .sum()
    }
}

/// Estimates the objective gradient at a point.
pub trait GradientStrategy: Send + Sync {
    /// `base` is `objective.evaluate(ratios)`, already computed by the caller.
    fn gradient(&self, objective: &dyn Objective, ratios: &[f64], base: f64) -> Vec<f64>;
}

/// One-sided difference; each component is perturbed without renormalizing.
#[derive(Debug, Clone, Copy)]
pub struct ForwardDifference {
    pub step: f64,
}

impl GradientStrategy for ForwardDifference {
    fn gradient(&self, objective: &dyn Objective, ratios: &[f64], base: f64) -> Vec<f64> {
        let mut probe = ratios.to_vec();
        (0..ratios.len())
            .map(|i| {
                probe[i] = ratios[i] + self.step;
                let g = (objective.evaluate(&probe) - base) / self.step;
                probe[i] = ratios[i];
                g
            })
            .collect()
    }
}

/// Symmetric difference; costs two evaluations per component.
#[derive(Debug, Clone, Copy)]
pub struct CentralDifference {
    pub step: f64,
}

impl GradientStrategy for CentralDifference {
    fn gradient(&self, objective: &dyn Objective, ratios: &[f64], _base: f64) -> Vec<f64> {
        let mut probe = ratios.to_vec();
        (0..ratios.len())
            .map(|i| {
                probe[i] = ratios[i] + self.step;
                let up = objective.evaluate(&probe);
                probe[i] = ratios[i] - self.step;
                let down = objective.evaluate(&probe);
                probe[i] = ratios[i];
                (up - down) / (2.0 * self.step)
            })
            .collect()
    }
}

/// Build the configured gradient estimator.
pub fn gradient_strategy(method: GradientMethod, step: f64) -> Box<dyn GradientStrategy> {
    match method {
        GradientMethod::Forward => Box::new(ForwardDifference { step }),
        GradientMethod::Central => Box::new(CentralDifference { step }),
    }
}
