//! Source material records supplied by the lab-report ingestion layer

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single lab reading for one parameter of one material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterReading {
    /// Measured value; `None` when not detected or below the limit of detection
    #[serde(default)]
    pub value: Option<f64>,
    /// Reporting unit as printed on the certificate (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ParameterReading {
    pub fn detected(value: f64) -> Self {
        Self {
            value: Some(value),
            unit: None,
        }
    }

    pub fn not_detected() -> Self {
        Self::default()
    }
}

/// A stockpiled source material (soil, compost, screened fines, ...).
///
/// Immutable for the duration of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Unique identifier used to key blend ratios and constraints
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Tonnage on hand (t)
    #[serde(default)]
    pub available_tonnage: f64,
    /// Lab readings keyed by canonical parameter name
    #[serde(default)]
    pub parameters: HashMap<String, ParameterReading>,
}

impl Material {
    pub fn new(id: impl Into<String>, name: impl Into<String>, available_tonnage: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available_tonnage,
            parameters: HashMap::new(),
        }
    }

    /// Builder-style helper to attach a detected reading.
    #[must_use]
    pub fn with_value(mut self, parameter: impl Into<String>, value: f64) -> Self {
        self.parameters
            .insert(parameter.into(), ParameterReading::detected(value));
        self
    }

    /// Builder-style helper to attach a "not detected" reading.
    #[must_use]
    pub fn with_missing(mut self, parameter: impl Into<String>) -> Self {
        self.parameters
            .insert(parameter.into(), ParameterReading::not_detected());
        self
    }

    /// Measured value for `parameter`, or `None` if absent, not detected or non-finite.
    pub fn value_of(&self, parameter: &str) -> Option<f64> {
        self.parameters
            .get(parameter)
            .and_then(|r| r.value)
            .filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_upload_layer_shape() {
        let json = r#"{
            "id": "m1",
            "name": "Topsoil A",
            "availableTonnage": 120.5,
            "parameters": {
                "Lead": { "value": 600 },
                "Cadmium": { "value": null, "unit": "mg/kg" }
            }
        }"#;
        let m: Material = serde_json::from_str(json).unwrap();
        assert_eq!(m.id, "m1");
        assert_eq!(m.available_tonnage, 120.5);
        assert_eq!(m.value_of("Lead"), Some(600.0));
        assert_eq!(m.value_of("Cadmium"), None);
        assert_eq!(m.value_of("Zinc"), None);
    }

    #[test]
    fn builder_sets_readings() {
        let m = Material::new("a", "A", 10.0)
            .with_value("pH", 7.1)
            .with_missing("Lead");
        assert_eq!(m.value_of("pH"), Some(7.1));
        assert!(m.parameters.contains_key("Lead"));
        assert_eq!(m.value_of("Lead"), None);
    }
}
