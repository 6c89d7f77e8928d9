//! Result assembly
//!
//! Converts the search outcome into the [`OptimizationResult`] handed back to
//! callers. Residuals are always classified against the configured tolerance
//! and the original limits, never against whichever relaxed tolerance the
//! search ended on.

use std::collections::BTreeMap;

use crate::config::defaults::{METHOD_NAME, MISSING_PARAMETER_DISPLAY_LIMIT};
use crate::config::reference::{CLAY, CLAY_RANGE, SAND, SAND_RANGE, SILT, SILT_RANGE};
use crate::types::{
    ComplianceStatus, ComplianceSummary, Material, OptimizationDetails, OptimizationResult,
    ParameterResidual, SoilTexture, TonnageBreakdown,
};

use super::normalizer::BlendProblem;
use super::objective::{blend_value, deviation};
use super::projection::normalize;
use super::solver::SearchOutcome;

/// Build the final result for one run.
///
/// `tolerance` is the configured tolerance fraction.
pub fn assemble(
    materials: &[Material],
    problem: &BlendProblem,
    tolerance: f64,
    outcome: &SearchOutcome,
) -> OptimizationResult {
    let mut ratios = outcome.ratios.clone();
    normalize(&mut ratios);

    let blend_ratios: BTreeMap<String, f64> = materials
        .iter()
        .zip(&ratios)
        .map(|(m, r)| (m.id.clone(), *r))
        .collect();

    let residuals = residuals(problem, &ratios, tolerance);
    let compliance = compliance_summary(&residuals);
    let relaxed_percent = outcome.relaxed_tolerance.map(|t| t * 100.0);

    let warnings = warnings(
        &compliance,
        relaxed_percent,
        &missing_parameters(problem, &ratios),
    );

    OptimizationResult {
        success: outcome.success,
        blend_ratios,
        tonnage_breakdown: tonnage_breakdown(materials, &ratios),
        compliance,
        residuals,
        soil_texture: soil_texture(problem, &ratios),
        warnings,
        optimization_details: OptimizationDetails {
            iterations: outcome.iterations,
            convergence: outcome.success,
            relaxed_tolerance: relaxed_percent,
            method: METHOD_NAME.to_string(),
            attempts: outcome.attempts,
            final_objective: outcome.final_objective,
        },
    }
}

pub fn tonnage_breakdown(materials: &[Material], ratios: &[f64]) -> Vec<TonnageBreakdown> {
    materials
        .iter()
        .zip(ratios)
        .map(|(m, &ratio)| {
            let used = m.available_tonnage * ratio;
            TonnageBreakdown {
                material_name: m.name.clone(),
                material_id: m.id.clone(),
                available: m.available_tonnage,
                used,
                remaining: m.available_tonnage - used,
                percentage: ratio * 100.0,
            }
        })
        .collect()
}

/// Residual per blended parameter, largest `residualPercent` first.
///
/// Parameters absent from the blend are skipped.
pub fn residuals(problem: &BlendProblem, ratios: &[f64], tolerance: f64) -> Vec<ParameterResidual> {
    let mut out: Vec<ParameterResidual> = problem
        .parameters
        .iter()
        .filter_map(|series| {
            let value = blend_value(ratios, &series.values)?;
            let limit = series.limit;
            let d = deviation(value, series.target, &limit, &limit);

            let status = if !limit.contains(value) {
                ComplianceStatus::Exceeding
            } else if !limit.tightened(tolerance).contains(value) {
                ComplianceStatus::Marginal
            } else {
                ComplianceStatus::Compliant
            };

            Some(ParameterResidual {
                parameter: series.name.clone(),
                category: series.category,
                value,
                target: series.target,
                lower_limit: limit.lower,
                upper_limit: limit.upper,
                residual: d.signed,
                residual_percent: d.normalized().abs() * 100.0,
                status,
            })
        })
        .collect();

    out.sort_by(|a, b| b.residual_percent.abs().total_cmp(&a.residual_percent.abs()));
    out
}

pub fn compliance_summary(residuals: &[ParameterResidual]) -> ComplianceSummary {
    if residuals.is_empty() {
        return ComplianceSummary::default();
    }

    let count = |status: ComplianceStatus| residuals.iter().filter(|r| r.status == status).count();
    let percents: Vec<f64> = residuals.iter().map(|r| r.residual_percent.abs()).collect();

    ComplianceSummary {
        total_parameters: residuals.len(),
        compliant: count(ComplianceStatus::Compliant),
        marginal: count(ComplianceStatus::Marginal),
        exceeding: count(ComplianceStatus::Exceeding),
        mean_residual: percents.iter().sum::<f64>() / percents.len() as f64,
        highest_residual: percents.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        lowest_residual: percents.iter().copied().fold(f64::INFINITY, f64::min),
    }
}

/// Clay/silt/sand split, present only when all three are blended and their
/// total is positive.
pub fn soil_texture(problem: &BlendProblem, ratios: &[f64]) -> Option<SoilTexture> {
    let blended = |name: &str| {
        problem
            .parameter(name)
            .and_then(|series| blend_value(ratios, &series.values))
    };
    let (clay, silt, sand) = (blended(CLAY)?, blended(SILT)?, blended(SAND)?);

    let total = clay + silt + sand;
    if total <= 0.0 {
        return None;
    }

    let (clay, silt, sand) = (clay * 100.0 / total, silt * 100.0 / total, sand * 100.0 / total);
    let within = |v: f64, (lo, hi): (f64, f64)| (lo..=hi).contains(&v);

    Some(SoilTexture {
        clay,
        silt,
        sand,
        within_acceptable_range: within(clay, CLAY_RANGE)
            && within(silt, SILT_RANGE)
            && within(sand, SAND_RANGE),
    })
}

/// Selected parameters that did not make it into the blend, in selection order.
fn missing_parameters<'p>(problem: &'p BlendProblem, ratios: &[f64]) -> Vec<&'p str> {
    problem
        .parameters
        .iter()
        .filter(|series| blend_value(ratios, &series.values).is_none())
        .map(|series| series.name.as_str())
        .collect()
}

pub fn warnings(
    compliance: &ComplianceSummary,
    relaxed_percent: Option<f64>,
    missing: &[&str],
) -> Vec<String> {
    let mut warnings = Vec::new();

    if compliance.exceeding > 0 {
        warnings.push(format!(
            "{} parameter(s) exceed acceptable limits",
            compliance.exceeding
        ));
    }
    if compliance.marginal > 0 {
        warnings.push(format!("{} parameter(s) are marginal", compliance.marginal));
    }
    if let Some(percent) = relaxed_percent {
        warnings.push(format!(
            "Tolerance was relaxed to {percent:.0}% to find a solution"
        ));
    }
    if !missing.is_empty() {
        let shown = missing
            .iter()
            .take(MISSING_PARAMETER_DISPLAY_LIMIT)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let mut line = format!("Missing data for: {shown}");
        if missing.len() > MISSING_PARAMETER_DISPLAY_LIMIT {
            line.push_str(&format!(
                " and {} more",
                missing.len() - MISSING_PARAMETER_DISPLAY_LIMIT
            ));
        }
        warnings.push(line);
    }

    warnings
}
