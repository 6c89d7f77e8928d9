//! Projection onto the feasible blend region
//!
//! Feasible ratios sum to 1 and keep each material inside its share interval
//! `[lo, hi]`, which is its min/max constraint intersected with [0, 1]. When
//! those intervals are jointly feasible (`Σlo ≤ 1 ≤ Σhi`) the projection is
//! the Euclidean one: every share is shifted by a common λ and clamped to its
//! interval, with λ found by bisection on the clamped sum. Otherwise a single
//! clamp, bound and renormalize pass still returns a point on the simplex.

use crate::types::NEAR_ZERO;

use crate::config::defaults::PROJECTION_BOUND_EPSILON;

/// Optional share bounds for one material, as fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatioBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RatioBounds {
    fn apply(&self, ratio: f64) -> f64 {
        let floored = self.min.map_or(ratio, |min| ratio.max(min));
        self.max.map_or(floored, |max| floored.min(max))
    }

    /// Share interval within [0, 1]. May be empty (`lo > hi`).
    fn interval(&self) -> (f64, f64) {
        let lo = self.min.map_or(0.0, |min| min.clamp(0.0, 1.0));
        let hi = self.max.map_or(1.0, |max| max.clamp(0.0, 1.0));
        (lo, hi)
    }

    /// Whether `ratio` respects both bounds, within the projection slack.
    pub fn holds(&self, ratio: f64) -> bool {
        self.min.map_or(true, |min| ratio >= min - PROJECTION_BOUND_EPSILON)
            && self.max.map_or(true, |max| ratio <= max + PROJECTION_BOUND_EPSILON)
    }
}

/// Equal share for every material.
pub fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Scale `ratios` to sum to 1; a near-zero sum resets to uniform.
pub fn normalize(ratios: &mut [f64]) {
    let sum: f64 = ratios.iter().sum();
    if sum.abs() < NEAR_ZERO || !sum.is_finite() {
        let share = uniform(ratios.len());
        ratios.copy_from_slice(&share);
        return;
    }
    for r in ratios.iter_mut() {
        *r /= sum;
    }
}

/// Project `ratios` onto the feasible region in place.
///
/// `steps` caps the bisection on the shift. Non-finite components count as 0.
pub fn project(ratios: &mut [f64], bounds: &[RatioBounds], steps: usize) {
    for r in ratios.iter_mut() {
        if !r.is_finite() {
            *r = 0.0;
        }
    }
    let intervals: Vec<(f64, f64)> = (0..ratios.len())
        .map(|i| bounds.get(i).copied().unwrap_or_default().interval())
        .collect();

    if !jointly_feasible(&intervals) {
        clamp_and_normalize(ratios, bounds);
        return;
    }

    let lambda = solve_shift(ratios, &intervals, steps);
    for (r, &(lo, hi)) in ratios.iter_mut().zip(&intervals) {
        *r = (*r - lambda).clamp(lo, hi);
    }
}

fn jointly_feasible(intervals: &[(f64, f64)]) -> bool {
    let empty = |&(lo, hi): &(f64, f64)| lo.is_nan() || hi.is_nan() || lo > hi;
    if intervals.is_empty() || intervals.iter().any(empty) {
        return false;
    }
    let floor: f64 = intervals.iter().map(|(lo, _)| lo).sum();
    let ceiling: f64 = intervals.iter().map(|(_, hi)| hi).sum();
    floor <= 1.0 + PROJECTION_BOUND_EPSILON && ceiling >= 1.0 - PROJECTION_BOUND_EPSILON
}

fn shifted_sum(x: &[f64], intervals: &[(f64, f64)], lambda: f64) -> f64 {
    x.iter()
        .zip(intervals)
        .map(|(v, &(lo, hi))| (v - lambda).clamp(lo, hi))
        .sum()
}

/// Shift λ with `Σ clamp(x_i - λ, lo_i, hi_i) = 1`.
fn solve_shift(x: &[f64], intervals: &[(f64, f64)], steps: usize) -> f64 {
    // Every share sits at its ceiling at `low` and at its floor at `high`
    let mut low = x
        .iter()
        .zip(intervals)
        .map(|(v, &(_, hi))| v - hi)
        .fold(f64::INFINITY, f64::min);
    let mut high = x
        .iter()
        .zip(intervals)
        .map(|(v, &(lo, _))| v - lo)
        .fold(f64::NEG_INFINITY, f64::max);

    for _ in 0..steps.max(1) {
        let mid = 0.5 * (low + high);
        if shifted_sum(x, intervals, mid) > 1.0 {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= f64::EPSILON * high.abs().max(1.0) {
            break;
        }
    }
    let lambda = 0.5 * (low + high);

    // Solve exactly on the active set the bisection settled on
    let (free_sum, fixed_sum, free) = x.iter().zip(intervals).fold(
        (0.0, 0.0, 0usize),
        |(free_sum, fixed_sum, free), (v, &(lo, hi))| {
            let r = v - lambda;
            if r > lo && r < hi {
                (free_sum + v, fixed_sum, free + 1)
            } else {
                (free_sum, fixed_sum + r.clamp(lo, hi), free)
            }
        },
    );
    if free == 0 {
        return lambda;
    }
    (free_sum + fixed_sum - 1.0) / free as f64
}

/// Fallback for jointly infeasible bounds: one clamp, bound and renormalize pass.
fn clamp_and_normalize(ratios: &mut [f64], bounds: &[RatioBounds]) {
    for (i, r) in ratios.iter_mut().enumerate() {
        let clamped = r.clamp(0.0, 1.0);
        *r = bounds.get(i).map_or(clamped, |b| b.apply(clamped));
    }
    normalize(ratios);
}
