//! Optimization engine output types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ParameterCategory;

/// Compliance classification of a blended parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    /// Inside the safety-margin (tightened) limit
    Compliant,
    /// Inside the legal limit but outside the safety margin
    Marginal,
    /// Outside the legal limit
    Exceeding,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::Marginal => write!(f, "marginal"),
            Self::Exceeding => write!(f, "exceeding"),
        }
    }
}

/// How much of one material the blend consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TonnageBreakdown {
    pub material_name: String,
    pub material_id: String,
    /// Tonnage on hand (t)
    pub available: f64,
    /// Tonnage consumed at the blend ratio (t)
    pub used: f64,
    /// Tonnage left over (t)
    pub remaining: f64,
    /// Share of the blend (0-100)
    pub percentage: f64,
}

/// Deviation of one blended parameter from its target or violated limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterResidual {
    pub parameter: String,
    pub category: ParameterCategory,
    /// Blended value
    pub value: f64,
    pub target: f64,
    /// Original (untightened) lower limit
    pub lower_limit: Option<f64>,
    /// Original (untightened) upper limit
    pub upper_limit: Option<f64>,
    /// Signed deviation in parameter units
    pub residual: f64,
    /// Unsigned normalized deviation (%)
    pub residual_percent: f64,
    pub status: ComplianceStatus,
}

/// Aggregate compliance statistics across all residuals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub total_parameters: usize,
    pub compliant: usize,
    pub marginal: usize,
    pub exceeding: usize,
    /// Mean |residualPercent|
    pub mean_residual: f64,
    pub highest_residual: f64,
    pub lowest_residual: f64,
}

/// Clay/silt/sand split of the blend, normalized to 100 %
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilTexture {
    pub clay: f64,
    pub silt: f64,
    pub sand: f64,
    pub within_acceptable_range: bool,
}

/// Solver metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationDetails {
    /// Iterations performed by the final attempt
    pub iterations: usize,
    pub convergence: bool,
    /// Relaxed tolerance (%) that produced the solution, if relaxation was needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relaxed_tolerance: Option<f64>,
    pub method: String,
    /// Number of tolerance levels tried
    pub attempts: usize,
    /// Objective value at the reported ratios
    pub final_objective: f64,
}

/// Full optimization output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub success: bool,
    /// Blend fraction per material id (sums to 1)
    pub blend_ratios: BTreeMap<String, f64>,
    pub tonnage_breakdown: Vec<TonnageBreakdown>,
    pub compliance: ComplianceSummary,
    /// Sorted by |residualPercent|, largest first
    pub residuals: Vec<ParameterResidual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_texture: Option<SoilTexture>,
    pub warnings: Vec<String>,
    pub optimization_details: OptimizationDetails,
}

impl OptimizationResult {
    /// Look up a residual by parameter name.
    pub fn residual(&self, parameter: &str) -> Option<&ParameterResidual> {
        self.residuals.iter().find(|r| r.parameter == parameter)
    }
}
