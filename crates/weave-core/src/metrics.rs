//! Scoring outputs: executive metrics and the synthesis metrics block.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CoverageDomain, Methodology, RiskTrend};

/// The three 0–10 risk axes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RiskBreakdown {
    pub technical: f64,
    pub systemic: f64,
    pub business: f64,
}

impl RiskBreakdown {
    #[must_use]
    pub fn max(&self) -> f64 {
        self.technical.max(self.systemic).max(self.business)
    }
}

/// The four structural factors behind the systemic axis, each 0–10.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SystemicFactors {
    pub cascading_failure: f64,
    pub single_points_of_failure: f64,
    pub interdependency: f64,
    pub emergent_behavior: f64,
}

/// A risk after confidence, mitigation and staleness adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RankedRisk {
    pub risk_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub methodology: Methodology,
    pub analysis_id: String,
    pub score: f64,
    pub adjusted_score: f64,
    pub mitigated: bool,
}

/// Return on mitigation investment, realised and potential.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RoiEstimate {
    pub implemented_controls: usize,
    pub investment: f64,
    pub risk_reduction_value: f64,
    /// `(value - investment) / investment`, 0 without investment.
    pub roi: f64,
    pub remediation_items: usize,
    pub potential_investment: f64,
    pub potential_value: f64,
    pub potential_roi: f64,
}

/// Output of the unified risk scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExecutiveMetrics {
    /// 0–10.
    pub overall_risk_score: f64,
    /// `overall_risk_score` on the 0–100 display range.
    pub risk_display_score: f64,
    pub breakdown: RiskBreakdown,
    pub systemic_factors: SystemicFactors,
    /// 0–1.
    pub compliance_score: f64,
    /// 0–1.
    pub coverage_score: f64,
    pub trend: RiskTrend,
    pub top_risks: Vec<RankedRisk>,
    pub roi: RoiEstimate,
}

impl ExecutiveMetrics {
    #[must_use]
    pub fn compliance_percent(&self) -> f64 {
        self.compliance_score * 100.0
    }

    #[must_use]
    pub fn coverage_percent(&self) -> f64 {
        self.coverage_score * 100.0
    }
}

/// Metrics block of a synthesis result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SynthesisMetrics {
    /// Same value as `executive.overall_risk_score`.
    pub unified_risk_score: f64,
    /// 0–1: weighted presence of required vs recommended methodologies.
    pub completeness_score: f64,
    /// 0–1: declared confidence, cross-methodology overlap and recency.
    pub confidence_level: f64,
    /// Domain → methodologies present that cover it. Uncovered domains are absent.
    pub coverage_map: BTreeMap<CoverageDomain, Vec<Methodology>>,
    pub executive: ExecutiveMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_scale_to_display_percent() {
        let metrics = ExecutiveMetrics {
            compliance_score: 0.45,
            coverage_score: 1.0,
            ..ExecutiveMetrics::default()
        };
        assert!((metrics.compliance_percent() - 45.0).abs() < 1e-9);
        assert!((metrics.coverage_percent() - 100.0).abs() < 1e-9);
    }
}
