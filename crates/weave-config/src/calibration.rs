//! Calibration constants baked into the synthesis formulas.
//!
//! Defaults reproduce the reference behaviour exactly; override them only to
//! recalibrate deliberately.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest accepted recency or staleness window, roughly a century.
pub const MAX_DAY_WINDOW: i64 = 36_500;

const fn default_threat_category_reference() -> u32 {
    6
}

const fn default_expected_controls() -> u32 {
    10
}

const fn default_threat_coverage_threshold() -> f64 {
    0.5
}

const fn default_control_coverage_threshold() -> f64 {
    0.3
}

const fn default_min_high_value_controls() -> u32 {
    3
}

const fn default_risk_spread_threshold() -> f64 {
    3.0
}

const fn default_risk_std_dev_threshold() -> f64 {
    2.0
}

const fn default_specialist_override_ratio() -> f64 {
    1.2
}

const fn default_recency_window_days() -> i64 {
    90
}

const fn default_stale_risk_days() -> i64 {
    180
}

const fn default_stale_risk_factor() -> f64 {
    0.8
}

const fn default_mitigated_risk_factor() -> f64 {
    0.3
}

const fn default_unmitigated_threat_inflation() -> f64 {
    0.1
}

const fn default_hub_connection_threshold() -> usize {
    5
}

const fn default_top_risk_limit() -> usize {
    10
}

const fn default_control_unit_cost() -> f64 {
    10_000.0
}

const fn default_threat_unit_value() -> f64 {
    25_000.0
}

const fn default_monitoring_recency_threshold() -> f64 {
    0.6
}

const fn default_consolidation_threshold() -> usize {
    5
}

const fn default_revalidation_confidence_threshold() -> f64 {
    0.7
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CalibrationConfig {
    /// Threats per entity that count as full category breadth.
    #[serde(default = "default_threat_category_reference")]
    pub threat_category_reference: u32,

    /// Protecting controls per entity that count as full control coverage.
    #[serde(default = "default_expected_controls")]
    pub expected_controls: u32,

    /// Threat-coverage ratio below which an entity gap is raised.
    #[serde(default = "default_threat_coverage_threshold")]
    pub threat_coverage_threshold: f64,

    /// Control-coverage ratio below which an entity gap is raised.
    #[serde(default = "default_control_coverage_threshold")]
    pub control_coverage_threshold: f64,

    /// Distinct protecting controls a high-value asset needs.
    #[serde(default = "default_min_high_value_controls")]
    pub min_high_value_controls: u32,

    /// Max-min score spread that flags a risk-score mismatch.
    #[serde(default = "default_risk_spread_threshold")]
    pub risk_spread_threshold: f64,

    /// Population standard deviation that flags a risk-score mismatch.
    #[serde(default = "default_risk_std_dev_threshold")]
    pub risk_std_dev_threshold: f64,

    /// A specialised methodology overrides the weighted average when its
    /// score reaches this multiple of it.
    #[serde(default = "default_specialist_override_ratio")]
    pub specialist_override_ratio: f64,

    /// Inputs imported within this many days win effectiveness disputes.
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,

    /// Risks from analyses older than this are discounted.
    #[serde(default = "default_stale_risk_days")]
    pub stale_risk_days: i64,

    #[serde(default = "default_stale_risk_factor")]
    pub stale_risk_factor: f64,

    #[serde(default = "default_mitigated_risk_factor")]
    pub mitigated_risk_factor: f64,

    /// Per-unmitigated-threat inflation of an analysis' technical risk.
    #[serde(default = "default_unmitigated_threat_inflation")]
    pub unmitigated_threat_inflation: f64,

    /// Entities with more relationship connections than this are hubs.
    #[serde(default = "default_hub_connection_threshold")]
    pub hub_connection_threshold: usize,

    #[serde(default = "default_top_risk_limit")]
    pub top_risk_limit: usize,

    /// Cost assumed per implemented control (ROI).
    #[serde(default = "default_control_unit_cost")]
    pub control_unit_cost: f64,

    /// Value assumed per severity-weighted mitigated threat (ROI).
    #[serde(default = "default_threat_unit_value")]
    pub threat_unit_value: f64,

    /// Average data recency below which continuous monitoring is advised.
    #[serde(default = "default_monitoring_recency_threshold")]
    pub monitoring_recency_threshold: f64,

    /// More methodologies than this triggers a consolidation recommendation.
    #[serde(default = "default_consolidation_threshold")]
    pub consolidation_threshold: usize,

    /// Any resolution less confident than this triggers a revalidation
    /// recommendation.
    #[serde(default = "default_revalidation_confidence_threshold")]
    pub revalidation_confidence_threshold: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            threat_category_reference: default_threat_category_reference(),
            expected_controls: default_expected_controls(),
            threat_coverage_threshold: default_threat_coverage_threshold(),
            control_coverage_threshold: default_control_coverage_threshold(),
            min_high_value_controls: default_min_high_value_controls(),
            risk_spread_threshold: default_risk_spread_threshold(),
            risk_std_dev_threshold: default_risk_std_dev_threshold(),
            specialist_override_ratio: default_specialist_override_ratio(),
            recency_window_days: default_recency_window_days(),
            stale_risk_days: default_stale_risk_days(),
            stale_risk_factor: default_stale_risk_factor(),
            mitigated_risk_factor: default_mitigated_risk_factor(),
            unmitigated_threat_inflation: default_unmitigated_threat_inflation(),
            hub_connection_threshold: default_hub_connection_threshold(),
            top_risk_limit: default_top_risk_limit(),
            control_unit_cost: default_control_unit_cost(),
            threat_unit_value: default_threat_unit_value(),
            monitoring_recency_threshold: default_monitoring_recency_threshold(),
            consolidation_threshold: default_consolidation_threshold(),
            revalidation_confidence_threshold: default_revalidation_confidence_threshold(),
        }
    }
}

fn check_ratio(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            format!("calibration.{field}"),
            format!("{value} is outside 0..=1"),
        ))
    }
}

fn check_day_window(field: &str, days: i64) -> Result<(), ConfigError> {
    if (0..=MAX_DAY_WINDOW).contains(&days) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            format!("calibration.{field}"),
            format!("{days} is outside 0..={MAX_DAY_WINDOW} days"),
        ))
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            format!("calibration.{field}"),
            format!("{value} must be a positive number"),
        ))
    }
}

impl CalibrationConfig {
    /// Reject values that would make the formulas meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threat_category_reference == 0 {
            return Err(ConfigError::invalid(
                "calibration.threat_category_reference",
                "must be at least 1",
            ));
        }
        if self.expected_controls == 0 {
            return Err(ConfigError::invalid(
                "calibration.expected_controls",
                "must be at least 1",
            ));
        }
        check_day_window("recency_window_days", self.recency_window_days)?;
        check_day_window("stale_risk_days", self.stale_risk_days)?;

        check_ratio("threat_coverage_threshold", self.threat_coverage_threshold)?;
        check_ratio("control_coverage_threshold", self.control_coverage_threshold)?;
        check_ratio("stale_risk_factor", self.stale_risk_factor)?;
        check_ratio("mitigated_risk_factor", self.mitigated_risk_factor)?;
        check_ratio(
            "monitoring_recency_threshold",
            self.monitoring_recency_threshold,
        )?;
        check_ratio(
            "revalidation_confidence_threshold",
            self.revalidation_confidence_threshold,
        )?;
        check_positive("risk_spread_threshold", self.risk_spread_threshold)?;
        check_positive("risk_std_dev_threshold", self.risk_std_dev_threshold)?;
        check_positive("specialist_override_ratio", self.specialist_override_ratio)?;
        check_positive("control_unit_cost", self.control_unit_cost)?;
        check_positive("threat_unit_value", self.threat_unit_value)?;

        if !(self.unmitigated_threat_inflation.is_finite() && self.unmitigated_threat_inflation >= 0.0)
        {
            return Err(ConfigError::invalid(
                "calibration.unmitigated_threat_inflation",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }
}
