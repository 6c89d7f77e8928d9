//! Parameter limits and display categories

use serde::{Deserialize, Serialize};

/// Threshold below which a magnitude is treated as zero.
pub const NEAR_ZERO: f64 = 1e-10;

/// A regulatory limit pair. Either side may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

impl Limit {
    pub const fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    pub const fn range(lower: f64, upper: f64) -> Self {
        Self::new(Some(lower), Some(upper))
    }

    pub const fn at_most(upper: f64) -> Self {
        Self::new(None, Some(upper))
    }

    pub const fn at_least(lower: f64) -> Self {
        Self::new(Some(lower), None)
    }

    pub const fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// Field-by-field overlay: each side of `self` wins when present,
    /// otherwise the matching side of `fallback` is used.
    #[must_use]
    pub fn or(self, fallback: Limit) -> Limit {
        Limit {
            lower: self.lower.or(fallback.lower),
            upper: self.upper.or(fallback.upper),
        }
    }

    pub const fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Whether `value` lies inside the (inclusive) limit.
    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |l| value >= l) && self.upper.map_or(true, |u| value <= u)
    }

    /// Narrow the window inward by the tolerance fraction `t`.
    ///
    /// - both sides: each end moves in by `(upper - lower) * t`; for `t >= 0.5`
    ///   the result is inverted (lower > upper) and nothing is inside it
    /// - upper only: `upper * (1 - t)`
    /// - lower only: `lower * (1 + t)`
    #[must_use]
    pub fn tightened(&self, t: f64) -> Limit {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => {
                let margin = (u - l) * t;
                Limit::range(l + margin, u - margin)
            }
            (None, Some(u)) => Limit::at_most(u * (1.0 - t)),
            (Some(l), None) => Limit::at_least(l * (1.0 + t)),
            (None, None) => Limit::unbounded(),
        }
    }
}

/// Display grouping for a parameter in reports and residual tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    /// Texture, stones, pH
    Physical,
    /// Organic matter and nutrients
    Organic,
    HeavyMetals,
    /// Hydrocarbons, PAH, PCBs, cyanides
    OrganicContaminants,
    #[default]
    Other,
}

impl std::fmt::Display for ParameterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Physical => write!(f, "Physical"),
            Self::Organic => write!(f, "Organic"),
            Self::HeavyMetals => write!(f, "Heavy Metals"),
            Self::OrganicContaminants => write!(f, "Organic Contaminants"),
            Self::Other => write!(f, "Other"),
        }
    }
}
