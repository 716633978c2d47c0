//! Per-methodology weight tables.
//!
//! Each table has one field per methodology so TOML and `WEAVE_*` overrides
//! address entries by a fixed lower-case key (`weights.stpa_sec.systemic`,
//! `WEAVE_SEVERITY_TRUST__DREAD`). A table section that omits a methodology
//! keeps that methodology's default.

use serde::{Deserialize, Serialize};
use weave_core::enums::Methodology;

use crate::error::ConfigError;

/// One value per methodology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodologyTable<T> {
    pub stpa_sec: T,
    pub stride: T,
    pub pasta: T,
    pub dread: T,
    pub linddun: T,
    pub hazop: T,
    pub octave: T,
    pub maestro: T,
    /// Applied to unrecognised methodologies.
    pub custom: T,
}

impl<T> MethodologyTable<T> {
    #[must_use]
    pub const fn get(&self, methodology: Methodology) -> &T {
        match methodology {
            Methodology::StpaSec => &self.stpa_sec,
            Methodology::Stride => &self.stride,
            Methodology::Pasta => &self.pasta,
            Methodology::Dread => &self.dread,
            Methodology::Linddun => &self.linddun,
            Methodology::Hazop => &self.hazop,
            Methodology::Octave => &self.octave,
            Methodology::Maestro => &self.maestro,
            Methodology::Custom => &self.custom,
        }
    }

    fn entries(&self) -> [(Methodology, &T); 9] {
        [
            (Methodology::StpaSec, &self.stpa_sec),
            (Methodology::Stride, &self.stride),
            (Methodology::Pasta, &self.pasta),
            (Methodology::Dread, &self.dread),
            (Methodology::Linddun, &self.linddun),
            (Methodology::Hazop, &self.hazop),
            (Methodology::Octave, &self.octave),
            (Methodology::Maestro, &self.maestro),
            (Methodology::Custom, &self.custom),
        ]
    }
}

fn check_weight(field: String, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be a non-negative number")))
    }
}

// ---------------------------------------------------------------------------
// Axis weights
// ---------------------------------------------------------------------------

const NEUTRAL_WEIGHT: f64 = 0.5;

/// How much a methodology's output counts on each scoring axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    pub technical: f64,
    pub systemic: f64,
    pub business: f64,
    pub coverage: f64,
}

impl AxisWeights {
    #[must_use]
    pub const fn new(technical: f64, systemic: f64, business: f64, coverage: f64) -> Self {
        Self {
            technical,
            systemic,
            business,
            coverage,
        }
    }
}

impl Default for AxisWeights {
    fn default() -> Self {
        Self::new(NEUTRAL_WEIGHT, NEUTRAL_WEIGHT, NEUTRAL_WEIGHT, NEUTRAL_WEIGHT)
    }
}

impl Default for MethodologyTable<AxisWeights> {
    fn default() -> Self {
        Self {
            stpa_sec: AxisWeights::new(0.7, 1.0, 0.5, 0.9),
            stride: AxisWeights::new(1.0, 0.4, 0.3, 0.8),
            pasta: AxisWeights::new(0.7, 0.5, 1.0, 0.8),
            dread: AxisWeights::new(0.9, 0.3, 0.6, 0.6),
            linddun: AxisWeights::new(0.6, 0.3, 0.7, 0.6),
            hazop: AxisWeights::new(0.6, 0.9, 0.4, 0.7),
            octave: AxisWeights::new(0.4, 0.5, 0.9, 0.7),
            maestro: AxisWeights::new(0.9, 0.6, 0.5, 0.7),
            custom: AxisWeights::default(),
        }
    }
}

impl MethodologyTable<AxisWeights> {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (methodology, weights) in self.entries() {
            let prefix = format!("weights.{}", methodology.slug().replace('-', "_"));
            check_weight(format!("{prefix}.technical"), weights.technical)?;
            check_weight(format!("{prefix}.systemic"), weights.systemic)?;
            check_weight(format!("{prefix}.business"), weights.business)?;
            check_weight(format!("{prefix}.coverage"), weights.coverage)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Severity trust
// ---------------------------------------------------------------------------

impl Default for MethodologyTable<f64> {
    fn default() -> Self {
        Self {
            stpa_sec: 0.85,
            stride: 0.9,
            pasta: 0.8,
            dread: 1.0,
            linddun: 0.85,
            hazop: 0.8,
            octave: 0.75,
            maestro: 0.9,
            custom: NEUTRAL_WEIGHT,
        }
    }
}

impl MethodologyTable<f64> {
    pub(crate) fn validate_as(&self, section: &str) -> Result<(), ConfigError> {
        for (methodology, value) in self.entries() {
            let key = methodology.slug().replace('-', "_");
            check_weight(format!("{section}.{key}"), *value)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Systemic strength
// ---------------------------------------------------------------------------

const EVEN_STRENGTH: f64 = 0.25;

/// How strongly a methodology's output speaks to each systemic factor.
/// The four strengths of one methodology are meant to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemicStrength {
    pub cascading: f64,
    pub single_point: f64,
    pub interdependency: f64,
    pub emergent: f64,
}

impl SystemicStrength {
    #[must_use]
    pub const fn new(cascading: f64, single_point: f64, interdependency: f64, emergent: f64) -> Self {
        Self {
            cascading,
            single_point,
            interdependency,
            emergent,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.cascading + self.single_point + self.interdependency + self.emergent
    }
}

impl Default for SystemicStrength {
    fn default() -> Self {
        Self::new(EVEN_STRENGTH, EVEN_STRENGTH, EVEN_STRENGTH, EVEN_STRENGTH)
    }
}

impl Default for MethodologyTable<SystemicStrength> {
    fn default() -> Self {
        Self {
            stpa_sec: SystemicStrength::new(0.3, 0.2, 0.2, 0.3),
            stride: SystemicStrength::new(0.2, 0.3, 0.3, 0.2),
            pasta: SystemicStrength::default(),
            dread: SystemicStrength::default(),
            linddun: SystemicStrength::default(),
            hazop: SystemicStrength::new(0.3, 0.3, 0.2, 0.2),
            octave: SystemicStrength::default(),
            maestro: SystemicStrength::new(0.2, 0.2, 0.3, 0.3),
            custom: SystemicStrength::default(),
        }
    }
}

impl MethodologyTable<SystemicStrength> {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (methodology, strength) in self.entries() {
            let prefix = format!(
                "systemic_strength.{}",
                methodology.slug().replace('-', "_")
            );
            check_weight(format!("{prefix}.cascading"), strength.cascading)?;
            check_weight(format!("{prefix}.single_point"), strength.single_point)?;
            check_weight(format!("{prefix}.interdependency"), strength.interdependency)?;
            check_weight(format!("{prefix}.emergent"), strength.emergent)?;
        }
        Ok(())
    }
}
