//! Optimization request body and boundary validation
//!
//! The engine itself never rejects input. Everything that must fail fast
//! (missing or too few materials, malformed numbers, dangling constraint ids)
//! is checked here before a run is scheduled.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::config::defaults::MIN_MATERIALS;
use crate::types::{BlendConfig, Material};

/// Body of `POST /api/v1/optimize` and input of `blendiq optimize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendRequest {
    pub materials: Vec<Material>,
    pub config: BlendConfig,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("No materials provided")]
    NoMaterials,

    #[error("At least 2 materials are required for blending (got {found})")]
    TooFewMaterials { found: usize },

    #[error("Too many materials: {found} (maximum {max})")]
    TooManyMaterials { found: usize, max: usize },

    #[error("Duplicate material id '{0}'")]
    DuplicateMaterialId(String),

    #[error("Material '{material_id}' has invalid availableTonnage {value} (must be finite and >= 0)")]
    InvalidTonnage { material_id: String, value: f64 },

    #[error("Tolerance must be within (0, 100] percent (got {0})")]
    InvalidTolerance(f64),

    #[error("Constraint for material '{material_id}': {reason}")]
    InvalidConstraint { material_id: String, reason: String },

    #[error("Constraint references unknown material '{0}'")]
    UnknownConstraintMaterial(String),
}

fn check_percentage(
    material_id: &str,
    label: &str,
    value: Option<f64>,
) -> Result<(), RequestError> {
    match value {
        Some(v) if !v.is_finite() || !(0.0..=100.0).contains(&v) => {
            Err(RequestError::InvalidConstraint {
                material_id: material_id.to_string(),
                reason: format!("{label} must be within 0-100 (got {v})"),
            })
        }
        _ => Ok(()),
    }
}

impl BlendRequest {
    /// Check the request against the boundary rules, reporting the first
    /// violation found.
    pub fn validate(&self, max_materials: usize) -> Result<(), RequestError> {
        let found = self.materials.len();
        if found == 0 {
            return Err(RequestError::NoMaterials);
        }
        if found < MIN_MATERIALS {
            return Err(RequestError::TooFewMaterials { found });
        }
        if found > max_materials {
            return Err(RequestError::TooManyMaterials {
                found,
                max: max_materials,
            });
        }

        let mut ids = HashSet::with_capacity(found);
        for m in &self.materials {
            if !ids.insert(m.id.as_str()) {
                return Err(RequestError::DuplicateMaterialId(m.id.clone()));
            }
            if !m.available_tonnage.is_finite() || m.available_tonnage < 0.0 {
                return Err(RequestError::InvalidTonnage {
                    material_id: m.id.clone(),
                    value: m.available_tonnage,
                });
            }
        }

        let tolerance = self.config.tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 || tolerance > 100.0 {
            return Err(RequestError::InvalidTolerance(tolerance));
        }

        for c in &self.config.material_constraints {
            if !ids.contains(c.material_id.as_str()) {
                return Err(RequestError::UnknownConstraintMaterial(c.material_id.clone()));
            }
            check_percentage(&c.material_id, "minPercentage", c.min_percentage)?;
            check_percentage(&c.material_id, "maxPercentage", c.max_percentage)?;
        }

        Ok(())
    }
}
