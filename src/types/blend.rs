//! Per-run blend configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Limit;

/// Default safety-margin tolerance (%).
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 30.0;

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_PERCENT
}

fn default_auto_relax() -> bool {
    true
}

/// Optional percentage bounds on one material's share of the blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialConstraint {
    pub material_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_percentage: Option<f64>,
}

impl MaterialConstraint {
    pub fn new(material_id: impl Into<String>) -> Self {
        Self {
            material_id: material_id.into(),
            min_percentage: None,
            max_percentage: None,
        }
    }

    #[must_use]
    pub fn min(mut self, percentage: f64) -> Self {
        self.min_percentage = Some(percentage);
        self
    }

    #[must_use]
    pub fn max(mut self, percentage: f64) -> Self {
        self.max_percentage = Some(percentage);
        self
    }
}

/// Configuration of a single optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendConfig {
    /// Parameters to score, in display order
    #[serde(default)]
    pub selected_parameters: Vec<String>,
    /// Safety-margin tolerance in percent (effective range 15-100)
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Retry at progressively wider tolerances when the configured one fails
    #[serde(default = "default_auto_relax")]
    pub auto_relax: bool,
    #[serde(default)]
    pub material_constraints: Vec<MaterialConstraint>,
    /// Per-parameter overrides; each side falls back to the standard limit independently
    #[serde(default)]
    pub custom_limits: HashMap<String, Limit>,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            selected_parameters: Vec::new(),
            tolerance: DEFAULT_TOLERANCE_PERCENT,
            auto_relax: true,
            material_constraints: Vec::new(),
            custom_limits: HashMap::new(),
        }
    }
}

impl BlendConfig {
    pub fn for_parameters<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected_parameters: parameters.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Tolerance as a fraction (30 % → 0.3).
    pub fn tolerance_fraction(&self) -> f64 {
        self.tolerance / 100.0
    }

    /// First constraint registered for `material_id`.
    pub fn constraint_for(&self, material_id: &str) -> Option<&MaterialConstraint> {
        self.material_constraints
            .iter()
            .find(|c| c.material_id == material_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: BlendConfig = serde_json::from_str(r#"{"selectedParameters":["Lead"]}"#).unwrap();
        assert_eq!(cfg.tolerance, 30.0);
        assert!(cfg.auto_relax);
        assert!(cfg.material_constraints.is_empty());
        assert!((cfg.tolerance_fraction() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn parses_constraints_and_custom_limits() {
        let cfg: BlendConfig = serde_json::from_str(
            r#"{
                "selectedParameters": ["pH"],
                "tolerance": 20,
                "autoRelax": false,
                "materialConstraints": [{"materialId": "m1", "maxPercentage": 20}],
                "customLimits": {"pH": {"lower": 6.0}}
            }"#,
        )
        .unwrap();
        assert!(!cfg.auto_relax);
        let c = cfg.constraint_for("m1").unwrap();
        assert_eq!(c.max_percentage, Some(20.0));
        assert_eq!(c.min_percentage, None);
        assert!(cfg.constraint_for("m2").is_none());
        assert_eq!(cfg.custom_limits["pH"], Limit::at_least(6.0));
    }
}
