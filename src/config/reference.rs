//! Static parameter reference data
//!
//! Standard regulatory limits (BS3882 topsoil), the set of contaminants whose
//! target is "as low as possible", and the display category map. The engine
//! receives this as an injected value; nothing here is read through a global.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Limit, ParameterCategory};

pub const CLAY: &str = "Clay";
pub const SILT: &str = "Silt";
pub const SAND: &str = "Sand";

/// BS3882 acceptable texture window (% of the clay+silt+sand total).
pub const CLAY_RANGE: (f64, f64) = (8.0, 35.0);
pub const SILT_RANGE: (f64, f64) = (15.0, 60.0);
pub const SAND_RANGE: (f64, f64) = (30.0, 60.0);

const BS3882_LIMITS: &[(&str, Limit)] = &[
    ("pH", Limit::range(5.5, 8.5)),
    ("Stone Content (>2mm)", Limit::at_most(8.0)),
    ("Organic Matter", Limit::range(3.5, 10.0)),
    (CLAY, Limit::range(8.0, 35.0)),
    (SILT, Limit::range(15.0, 60.0)),
    (SAND, Limit::range(30.0, 60.0)),
    ("Arsenic", Limit::at_most(20.0)),
    ("Cadmium", Limit::at_most(3.0)),
    ("Chromium (Total)", Limit::at_most(100.0)),
    ("Copper", Limit::at_most(200.0)),
    ("Lead", Limit::at_most(450.0)),
    ("Mercury", Limit::at_most(1.0)),
    ("Nickel", Limit::at_most(75.0)),
    ("Zinc", Limit::at_most(300.0)),
];

const ZERO_SEEKING: &[&str] = &[
    "Arsenic",
    "Cadmium",
    "Chromium (Total)",
    "Chromium (VI)",
    "Lead",
    "Mercury",
    "Selenium",
    "Molybdenum",
    "Cyanide (Free)",
    "Cyanide (Total)",
    "TPH (Total Petroleum Hydrocarbons)",
    "PAH (Total)",
    "PCBs (Total)",
    "Asbestos",
];

const CATEGORIES: &[(&str, ParameterCategory)] = &[
    ("pH", ParameterCategory::Physical),
    ("Stone Content (>2mm)", ParameterCategory::Physical),
    (CLAY, ParameterCategory::Physical),
    (SILT, ParameterCategory::Physical),
    (SAND, ParameterCategory::Physical),
    ("Organic Matter", ParameterCategory::Organic),
    ("Arsenic", ParameterCategory::HeavyMetals),
    ("Cadmium", ParameterCategory::HeavyMetals),
    ("Chromium (Total)", ParameterCategory::HeavyMetals),
    ("Chromium (VI)", ParameterCategory::HeavyMetals),
    ("Copper", ParameterCategory::HeavyMetals),
    ("Lead", ParameterCategory::HeavyMetals),
    ("Mercury", ParameterCategory::HeavyMetals),
    ("Nickel", ParameterCategory::HeavyMetals),
    ("Zinc", ParameterCategory::HeavyMetals),
    ("Selenium", ParameterCategory::HeavyMetals),
    ("Molybdenum", ParameterCategory::HeavyMetals),
    ("Cyanide (Free)", ParameterCategory::OrganicContaminants),
    ("Cyanide (Total)", ParameterCategory::OrganicContaminants),
    ("TPH (Total Petroleum Hydrocarbons)", ParameterCategory::OrganicContaminants),
    ("PAH (Total)", ParameterCategory::OrganicContaminants),
    ("PCBs (Total)", ParameterCategory::OrganicContaminants),
    ("Asbestos", ParameterCategory::Other),
];

/// Read-only lookup tables consumed by the normalizer and assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    /// Standard limits keyed by canonical parameter name
    pub limits: BTreeMap<String, Limit>,
    /// Contaminants whose target is their lower limit, or zero
    pub zero_seeking: BTreeSet<String>,
    /// Display category per parameter; unmapped parameters are `Other`
    pub categories: BTreeMap<String, ParameterCategory>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::bs3882()
    }
}

impl ReferenceData {
    /// BS3882 topsoil reference tables.
    pub fn bs3882() -> Self {
        Self {
            limits: BS3882_LIMITS
                .iter()
                .map(|(name, limit)| ((*name).to_string(), *limit))
                .collect(),
            zero_seeking: ZERO_SEEKING.iter().map(|s| (*s).to_string()).collect(),
            categories: CATEGORIES
                .iter()
                .map(|(name, cat)| ((*name).to_string(), *cat))
                .collect(),
        }
    }

    /// Empty tables: every parameter unbounded, nothing zero-seeking.
    pub fn empty() -> Self {
        Self {
            limits: BTreeMap::new(),
            zero_seeking: BTreeSet::new(),
            categories: BTreeMap::new(),
        }
    }

    pub fn standard_limit(&self, parameter: &str) -> Limit {
        self.limits.get(parameter).copied().unwrap_or_default()
    }

    pub fn is_zero_seeking(&self, parameter: &str) -> bool {
        self.zero_seeking.contains(parameter)
    }

    pub fn category_of(&self, parameter: &str) -> ParameterCategory {
        self.categories.get(parameter).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn with_limit(mut self, parameter: impl Into<String>, limit: Limit) -> Self {
        self.limits.insert(parameter.into(), limit);
        self
    }

    #[must_use]
    pub fn with_zero_seeking(mut self, parameter: impl Into<String>) -> Self {
        self.zero_seeking.insert(parameter.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bs3882_table_contents() {
        let r = ReferenceData::bs3882();
        assert_eq!(r.standard_limit("Lead"), Limit::at_most(450.0));
        assert_eq!(r.standard_limit("pH"), Limit::range(5.5, 8.5));
        assert!(r.standard_limit("Boron").is_unbounded());
        assert!(r.is_zero_seeking("Lead"));
        assert!(r.is_zero_seeking("Asbestos"));
        assert!(!r.is_zero_seeking("Copper"));
        assert_eq!(r.category_of("Zinc"), ParameterCategory::HeavyMetals);
        assert_eq!(r.category_of("Boron"), ParameterCategory::Other);
    }

    #[test]
    fn overrides_are_local_to_the_instance() {
        let r = ReferenceData::empty().with_limit("Lead", Limit::at_most(10.0));
        assert_eq!(r.standard_limit("Lead"), Limit::at_most(10.0));
        assert!(!r.is_zero_seeking("Lead"));
        assert_eq!(ReferenceData::bs3882().standard_limit("Lead"), Limit::at_most(450.0));
    }

    #[test]
    fn partial_toml_keeps_other_tables() {
        let r: ReferenceData = toml::from_str(
            r#"
            [limits]
            Boron = { upper = 3.0 }
            "#,
        )
        .unwrap();
        assert_eq!(r.standard_limit("Boron"), Limit::at_most(3.0));
        assert!(r.standard_limit("Lead").is_unbounded());
        assert!(r.is_zero_seeking("Lead"));
    }
}
