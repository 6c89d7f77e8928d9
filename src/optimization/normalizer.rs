//! Input normalization
//!
//! Turns the raw materials and run configuration into a [`BlendProblem`]:
//! one value series per selected parameter (material order preserved, gaps
//! kept as `None`), the effective limit and target for each parameter, and
//! the per-material ratio bounds. Targets depend only on configuration and
//! reference data, never on material values.

use std::collections::{HashMap, HashSet};

use crate::config::ReferenceData;
use crate::types::{BlendConfig, Limit, Material, ParameterCategory};

use super::projection::RatioBounds;

/// One selected parameter, ready for blending.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSeries {
    pub name: String,
    pub category: ParameterCategory,
    /// One entry per material, in material order
    pub values: Vec<Option<f64>>,
    /// Effective (custom over standard) limit
    pub limit: Limit,
    pub target: f64,
}

impl ParameterSeries {
    pub fn has_data(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

/// Everything the search driver needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendProblem {
    pub parameters: Vec<ParameterSeries>,
    /// Ratio bounds per material, in material order
    pub bounds: Vec<RatioBounds>,
}

impl BlendProblem {
    pub fn material_count(&self) -> usize {
        self.bounds.len()
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSeries> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Effective limit: each side of the custom override wins when present,
/// otherwise the standard table's side, otherwise nothing.
pub fn resolve_limit(
    parameter: &str,
    custom_limits: &HashMap<String, Limit>,
    reference: &ReferenceData,
) -> Limit {
    custom_limits
        .get(parameter)
        .copied()
        .unwrap_or_default()
        .or(reference.standard_limit(parameter))
}

/// Target value for a parameter.
///
/// Zero-seeking contaminants aim for their lower limit (or 0); everything
/// else aims for the window midpoint, or the single bound present, or 0.
pub fn derive_target(parameter: &str, limit: &Limit, reference: &ReferenceData) -> f64 {
    if reference.is_zero_seeking(parameter) {
        return limit.lower.unwrap_or(0.0);
    }
    match (limit.lower, limit.upper) {
        (Some(l), Some(u)) => (l + u) / 2.0,
        (Some(l), None) => l,
        (None, Some(u)) => u,
        (None, None) => 0.0,
    }
}

/// Percentage constraints converted to fractions, one entry per material.
fn material_bounds(materials: &[Material], config: &BlendConfig) -> Vec<RatioBounds> {
    materials
        .iter()
        .map(|m| {
            config
                .constraint_for(&m.id)
                .map(|c| RatioBounds {
                    min: c.min_percentage.filter(|p| p.is_finite()).map(|p| p / 100.0),
                    max: c.max_percentage.filter(|p| p.is_finite()).map(|p| p / 100.0),
                })
                .unwrap_or_default()
        })
        .collect()
}

/// Build the blend problem for one run.
///
/// Duplicate entries in `selected_parameters` are scored once, at their
/// first position.
pub fn normalize(
    materials: &[Material],
    config: &BlendConfig,
    reference: &ReferenceData,
) -> BlendProblem {
    let mut seen = HashSet::new();
    let parameters = config
        .selected_parameters
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .map(|name| {
            let limit = resolve_limit(name, &config.custom_limits, reference);
            ParameterSeries {
                name: name.clone(),
                category: reference.category_of(name),
                values: materials.iter().map(|m| m.value_of(name)).collect(),
                target: derive_target(name, &limit, reference),
                limit,
            }
        })
        .collect();

    BlendProblem {
        parameters,
        bounds: material_bounds(materials, config),
    }
}
