//! Methodologies, label vocabularies and output type tags for riskweave.
//!
//! Input records carry severity, effectiveness and implementation state as the
//! raw strings an import adapter produced. The enums here are the closed
//! vocabularies the engine scores against: every `from_label` is lenient and
//! falls back to a documented neutral default, while `FromStr` is strict and
//! reports an [`CoreError::InvalidLabel`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Lower-case a label and drop separators so `Not_Implemented`,
/// `not-implemented` and `not implemented` compare equal.
fn squash(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Methodology
// ---------------------------------------------------------------------------

/// A threat-modeling methodology whose output was normalized into a
/// [`StandardizedAnalysis`](crate::records::StandardizedAnalysis).
///
/// Deserialization goes through [`Methodology::from_label`], so case and
/// separators are ignored and unknown identifiers become
/// [`Methodology::Custom`] instead of failing the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
pub enum Methodology {
    /// Systems-theoretic process analysis for security (control-theoretic).
    #[serde(rename = "STPA-SEC")]
    StpaSec,
    /// Technical threat enumeration.
    #[serde(rename = "STRIDE")]
    Stride,
    /// Business-risk driven attack simulation.
    #[serde(rename = "PASTA")]
    Pasta,
    /// Quantitative threat scoring.
    #[serde(rename = "DREAD")]
    Dread,
    /// Privacy threat modeling.
    #[serde(rename = "LINDDUN")]
    Linddun,
    /// Deviation analysis.
    #[serde(rename = "HAZOP")]
    Hazop,
    /// Organizational / operational business risk.
    #[serde(rename = "OCTAVE")]
    Octave,
    /// AI/ML specialised threat modeling.
    #[serde(rename = "MAESTRO")]
    Maestro,
    #[serde(rename = "CUSTOM")]
    Custom,
}

impl<'de> Deserialize<'de> for Methodology {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Broad family a methodology belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MethodologyFamily {
    Technical,
    Systemic,
    Business,
    Privacy,
    Custom,
}

impl Methodology {
    /// Every named methodology (excludes [`Methodology::Custom`]).
    pub const NAMED: [Self; 8] = [
        Self::StpaSec,
        Self::Stride,
        Self::Pasta,
        Self::Dread,
        Self::Linddun,
        Self::Hazop,
        Self::Octave,
        Self::Maestro,
    ];

    /// Lenient lookup: separators and case are ignored, anything unknown is
    /// [`Methodology::Custom`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match squash(label).as_str() {
            "stpasec" | "stpa" => Self::StpaSec,
            "stride" => Self::Stride,
            "pasta" => Self::Pasta,
            "dread" => Self::Dread,
            "linddun" => Self::Linddun,
            "hazop" => Self::Hazop,
            "octave" => Self::Octave,
            "maestro" => Self::Maestro,
            _ => Self::Custom,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StpaSec => "STPA-SEC",
            Self::Stride => "STRIDE",
            Self::Pasta => "PASTA",
            Self::Dread => "DREAD",
            Self::Linddun => "LINDDUN",
            Self::Hazop => "HAZOP",
            Self::Octave => "OCTAVE",
            Self::Maestro => "MAESTRO",
            Self::Custom => "CUSTOM",
        }
    }

    /// Lower-case form used in analysis ids.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::StpaSec => "stpa-sec",
            Self::Stride => "stride",
            Self::Pasta => "pasta",
            Self::Dread => "dread",
            Self::Linddun => "linddun",
            Self::Hazop => "hazop",
            Self::Octave => "octave",
            Self::Maestro => "maestro",
            Self::Custom => "custom",
        }
    }

    #[must_use]
    pub const fn family(self) -> MethodologyFamily {
        match self {
            Self::Stride | Self::Dread | Self::Maestro => MethodologyFamily::Technical,
            Self::StpaSec | Self::Hazop => MethodologyFamily::Systemic,
            Self::Pasta | Self::Octave => MethodologyFamily::Business,
            Self::Linddun => MethodologyFamily::Privacy,
            Self::Custom => MethodologyFamily::Custom,
        }
    }

    #[must_use]
    pub const fn is_privacy(self) -> bool {
        matches!(self, Self::Linddun)
    }

    #[must_use]
    pub const fn is_ai_specialised(self) -> bool {
        matches!(self, Self::Maestro)
    }

    #[must_use]
    pub const fn is_quantitative(self) -> bool {
        matches!(self, Self::Dread)
    }

    #[must_use]
    pub const fn is_business(self) -> bool {
        matches!(self.family(), MethodologyFamily::Business)
    }

    /// Technical or systemic: methodologies that reason about the system
    /// rather than the business or the data subject.
    #[must_use]
    pub const fn is_technical(self) -> bool {
        matches!(
            self.family(),
            MethodologyFamily::Technical | MethodologyFamily::Systemic
        )
    }

    /// Control-theoretic or deviation-analysis methods, the ones that see
    /// emergent behaviour between components.
    #[must_use]
    pub const fn is_control_theoretic_or_deviation(self) -> bool {
        matches!(self, Self::StpaSec | Self::Hazop)
    }
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a threat, gap, conflict or insight. Ordered low → critical.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Lenient parse. Unrecognised labels map to the neutral default
    /// [`Severity::Medium`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::parse_known(label).unwrap_or_default()
    }

    fn parse_known(label: &str) -> Option<Self> {
        match squash(label).as_str() {
            "low" | "info" | "informational" | "minor" | "negligible" => Some(Self::Low),
            "medium" | "moderate" | "med" => Some(Self::Medium),
            "high" | "major" | "severe" => Some(Self::High),
            "critical" | "blocker" | "catastrophic" | "veryhigh" => Some(Self::Critical),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Position on the 0–4 severity scale used for resolution arithmetic.
    #[must_use]
    pub const fn scale(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
            Self::Critical => 4.0,
        }
    }

    /// Map a point on the 0–4 scale back to a label
    /// (≥3.5 critical, ≥2.5 high, ≥1.5 medium, else low).
    #[must_use]
    pub fn from_scale(value: f64) -> Self {
        if value >= 3.5 {
            Self::Critical
        } else if value >= 2.5 {
            Self::High
        } else if value >= 1.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// 0–10 risk equivalent used when an analysis carries threats but no
    /// scored risks.
    #[must_use]
    pub const fn risk_equivalent(self) -> f64 {
        match self {
            Self::Low => 2.5,
            Self::Medium => 5.0,
            Self::High => 7.5,
            Self::Critical => 9.5,
        }
    }

    /// High or critical.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the known vocabulary, synonyms like `severe` included. Anything
/// else is an [`CoreError::InvalidLabel`] rather than the lenient default.
impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s).ok_or_else(|| CoreError::InvalidLabel {
            kind: "severity",
            value: s.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Effectiveness
// ---------------------------------------------------------------------------

/// Control effectiveness on the 0–3 scale.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Effectiveness {
    Ineffective,
    Low,
    #[default]
    Medium,
    High,
}

impl Effectiveness {
    /// Lenient parse of an effectiveness or implementation-state label.
    /// Unrecognised labels map to [`Effectiveness::Medium`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::parse_known(label).unwrap_or_default()
    }

    fn parse_known(label: &str) -> Option<Self> {
        match squash(label).as_str() {
            "high" | "strong" | "effective" | "veryhigh" | "verified" | "full" => Some(Self::High),
            "medium" | "moderate" | "partial" | "partiallyimplemented" | "implemented" => {
                Some(Self::Medium)
            }
            "low" | "weak" | "limited" => Some(Self::Low),
            "ineffective" | "none" | "notimplemented" | "missing" | "planned" | "absent" => {
                Some(Self::Ineffective)
            }
            _ => None,
        }
    }

    /// Whether the label says the control was never tested. Kept apart from
    /// the level mapping since an untested control has no measured level.
    #[must_use]
    pub fn is_untested_label(label: &str) -> bool {
        matches!(
            squash(label).as_str(),
            "untested" | "unverified" | "nottested" | "unknown"
        )
    }

    #[must_use]
    pub const fn level(self) -> f64 {
        match self {
            Self::Ineffective => 0.0,
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
        }
    }

    /// Map an averaged level back to a label (≥2.5 high, ≤1 low, else medium).
    #[must_use]
    pub fn from_level(level: f64) -> Self {
        if level >= 2.5 {
            Self::High
        } else if level <= 1.0 {
            Self::Low
        } else {
            Self::Medium
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ineffective => "ineffective",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Effectiveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effectiveness {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s).ok_or_else(|| CoreError::InvalidLabel {
            kind: "effectiveness",
            value: s.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Effort
// ---------------------------------------------------------------------------

/// Estimated remediation effort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CoverageDomain
// ---------------------------------------------------------------------------

/// One of the eight canonical risk-assessment areas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CoverageDomain {
    Technical,
    Business,
    Privacy,
    AiMl,
    SupplyChain,
    Physical,
    HumanFactor,
    Compliance,
}

impl CoverageDomain {
    pub const ALL: [Self; 8] = [
        Self::Technical,
        Self::Business,
        Self::Privacy,
        Self::AiMl,
        Self::SupplyChain,
        Self::Physical,
        Self::HumanFactor,
        Self::Compliance,
    ];

    /// Domains a methodology's output covers.
    #[must_use]
    pub const fn covered_by(methodology: Methodology) -> &'static [Self] {
        match methodology {
            Methodology::Stride | Methodology::Dread => &[Self::Technical],
            Methodology::StpaSec => &[Self::Technical, Self::Physical, Self::HumanFactor],
            Methodology::Pasta => &[
                Self::Business,
                Self::Technical,
                Self::Compliance,
                Self::SupplyChain,
            ],
            Methodology::Octave => &[Self::Business, Self::HumanFactor, Self::Compliance],
            Methodology::Linddun => &[Self::Privacy, Self::Compliance],
            Methodology::Hazop => &[Self::Physical, Self::Technical],
            Methodology::Maestro => &[Self::AiMl, Self::Technical],
            Methodology::Custom => &[],
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Business => "business",
            Self::Privacy => "privacy",
            Self::AiMl => "ai_ml",
            Self::SupplyChain => "supply_chain",
            Self::Physical => "physical",
            Self::HumanFactor => "human_factor",
            Self::Compliance => "compliance",
        }
    }
}

impl fmt::Display for CoverageDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GapType
// ---------------------------------------------------------------------------

/// Coarse grouping of gap types, one per detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GapCategory {
    Methodology,
    Coverage,
    Control,
    Compliance,
    Data,
    Completeness,
}

/// Kind of coverage or mitigation gap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    MissingPrivacyAnalysis,
    MissingAiAnalysis,
    MissingQuantitativeAnalysis,
    MissingBusinessAnalysis,
    InsufficientThreatCoverage,
    InsufficientControlCoverage,
    UnmitigatedThreat,
    SinglePointOfFailure,
    IneffectiveControls,
    MissingEncryptionAtRest,
    MissingAccessControl,
    MissingNetworkSegmentation,
    MissingAuditLogging,
    UnclassifiedData,
    UnderprotectedHighValueAssets,
    MissingThreatCategories,
    MissingExternalThreats,
    MissingSupplyChainThreats,
}

impl GapType {
    #[must_use]
    pub const fn category(self) -> GapCategory {
        match self {
            Self::MissingPrivacyAnalysis
            | Self::MissingAiAnalysis
            | Self::MissingQuantitativeAnalysis
            | Self::MissingBusinessAnalysis => GapCategory::Methodology,
            Self::InsufficientThreatCoverage | Self::InsufficientControlCoverage => {
                GapCategory::Coverage
            }
            Self::UnmitigatedThreat | Self::SinglePointOfFailure | Self::IneffectiveControls => {
                GapCategory::Control
            }
            Self::MissingEncryptionAtRest
            | Self::MissingAccessControl
            | Self::MissingNetworkSegmentation
            | Self::MissingAuditLogging => GapCategory::Compliance,
            Self::UnclassifiedData | Self::UnderprotectedHighValueAssets => GapCategory::Data,
            Self::MissingThreatCategories
            | Self::MissingExternalThreats
            | Self::MissingSupplyChainThreats => GapCategory::Completeness,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingPrivacyAnalysis => "missing_privacy_analysis",
            Self::MissingAiAnalysis => "missing_ai_analysis",
            Self::MissingQuantitativeAnalysis => "missing_quantitative_analysis",
            Self::MissingBusinessAnalysis => "missing_business_analysis",
            Self::InsufficientThreatCoverage => "insufficient_threat_coverage",
            Self::InsufficientControlCoverage => "insufficient_control_coverage",
            Self::UnmitigatedThreat => "unmitigated_threat",
            Self::SinglePointOfFailure => "single_point_of_failure",
            Self::IneffectiveControls => "ineffective_controls",
            Self::MissingEncryptionAtRest => "missing_encryption_at_rest",
            Self::MissingAccessControl => "missing_access_control",
            Self::MissingNetworkSegmentation => "missing_network_segmentation",
            Self::MissingAuditLogging => "missing_audit_logging",
            Self::UnclassifiedData => "unclassified_data",
            Self::UnderprotectedHighValueAssets => "underprotected_high_value_assets",
            Self::MissingThreatCategories => "missing_threat_categories",
            Self::MissingExternalThreats => "missing_external_threats",
            Self::MissingSupplyChainThreats => "missing_supply_chain_threats",
        }
    }
}

impl fmt::Display for GapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConflictType
// ---------------------------------------------------------------------------

/// Kind of cross-methodology disagreement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictType {
    RiskScoreMismatch,
    ControlEffectivenessDisagreement,
    ThreatExistenceConflict,
    EntityClassificationConflict,
    SeverityRatingConflict,
}

impl ConflictType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RiskScoreMismatch => "risk-score-mismatch",
            Self::ControlEffectivenessDisagreement => "control-effectiveness-disagreement",
            Self::ThreatExistenceConflict => "threat-existence-conflict",
            Self::EntityClassificationConflict => "entity-classification-conflict",
            Self::SeverityRatingConflict => "severity-rating-conflict",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InsightType
// ---------------------------------------------------------------------------

/// Kind of cross-methodology observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// A relationship edge only one methodology modelled.
    HiddenDependency,
    /// A threat every methodology present raised independently.
    CorroboratedThreat,
    /// An entity only one methodology modelled.
    SingleSourceEntity,
}

impl InsightType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HiddenDependency => "hidden_dependency",
            Self::CorroboratedThreat => "corroborated_threat",
            Self::SingleSourceEntity => "single_source_entity",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskTrend
// ---------------------------------------------------------------------------

/// Direction of risk across analyses ordered by import time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskTrend {
    Improving,
    #[default]
    Stable,
    Worsening,
}

impl RiskTrend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Worsening => "worsening",
        }
    }
}

impl fmt::Display for RiskTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("critical", Severity::Critical)]
    #[case("CRITICAL", Severity::Critical)]
    #[case("High", Severity::High)]
    #[case("moderate", Severity::Medium)]
    #[case("informational", Severity::Low)]
    #[case("whatever", Severity::Medium)]
    #[case("", Severity::Medium)]
    fn severity_lenient_labels(#[case] label: &str, #[case] expected: Severity) {
        assert_eq!(Severity::from_label(label), expected);
    }

    #[test]
    fn severity_strict_parse_rejects_unknown() {
        assert!("bogus".parse::<Severity>().is_err());
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("severe".parse::<Severity>().unwrap(), Severity::High);
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[rstest]
    #[case(4.0, Severity::Critical)]
    #[case(3.5, Severity::Critical)]
    #[case(3.49, Severity::High)]
    #[case(2.5, Severity::High)]
    #[case(1.5, Severity::Medium)]
    #[case(1.49, Severity::Low)]
    #[case(0.0, Severity::Low)]
    fn severity_scale_thresholds(#[case] value: f64, #[case] expected: Severity) {
        assert_eq!(Severity::from_scale(value), expected);
    }

    #[test]
    fn severity_orders_low_to_critical() {
        let mut all = vec![
            Severity::Critical,
            Severity::Low,
            Severity::High,
            Severity::Medium,
        ];
        all.sort();
        assert_eq!(all, Severity::ALL.to_vec());
    }

    #[rstest]
    #[case("not-implemented", Effectiveness::Ineffective)]
    #[case("Not Implemented", Effectiveness::Ineffective)]
    #[case("weak", Effectiveness::Low)]
    #[case("partial", Effectiveness::Medium)]
    #[case("strong", Effectiveness::High)]
    #[case("mystery", Effectiveness::Medium)]
    fn effectiveness_lenient_labels(#[case] label: &str, #[case] expected: Effectiveness) {
        assert_eq!(Effectiveness::from_label(label), expected);
    }

    #[test]
    fn effectiveness_level_thresholds() {
        assert_eq!(Effectiveness::from_level(2.5), Effectiveness::High);
        assert_eq!(Effectiveness::from_level(2.4), Effectiveness::Medium);
        assert_eq!(Effectiveness::from_level(1.0), Effectiveness::Low);
        assert_eq!(Effectiveness::from_level(0.0), Effectiveness::Low);
    }

    #[test]
    fn untested_is_not_a_level() {
        assert!(Effectiveness::is_untested_label("Untested"));
        assert!(!Effectiveness::is_untested_label("low"));
    }

    #[test]
    fn unknown_methodology_deserializes_as_custom() {
        let m: Methodology = serde_json::from_str(r#""OCTOPUS""#).unwrap();
        assert_eq!(m, Methodology::Custom);
        let m: Methodology = serde_json::from_str(r#""STPA-SEC""#).unwrap();
        assert_eq!(m, Methodology::StpaSec);
    }

    #[rstest]
    #[case("Stride", Methodology::Stride)]
    #[case("STPA", Methodology::StpaSec)]
    #[case("stpa_sec", Methodology::StpaSec)]
    #[case("Stpa Sec", Methodology::StpaSec)]
    #[case("Octave", Methodology::Octave)]
    #[case("in-house", Methodology::Custom)]
    fn methodology_deserializes_like_lenient_lookup(
        #[case] label: &str,
        #[case] expected: Methodology,
    ) {
        let m: Methodology = serde_json::from_value(serde_json::json!(label)).unwrap();
        assert_eq!(m, expected);
        assert_eq!(m, Methodology::from_label(label));
    }

    #[test]
    fn mixed_case_methodology_keys_collapse_in_maps() {
        let map: std::collections::BTreeMap<Methodology, u32> =
            serde_json::from_str(r#"{"Stride": 1, "PASTA": 2}"#).unwrap();
        assert_eq!(map.get(&Methodology::Stride), Some(&1));
        assert_eq!(map.get(&Methodology::Pasta), Some(&2));
        assert_eq!(
            serde_json::to_string(&Methodology::Stride).unwrap(),
            r#""STRIDE""#
        );
    }

    #[test]
    fn methodology_lenient_lookup() {
        assert_eq!(Methodology::from_label("stpa_sec"), Methodology::StpaSec);
        assert_eq!(Methodology::from_label("Linddun"), Methodology::Linddun);
        assert_eq!(Methodology::from_label("in-house"), Methodology::Custom);
    }

    #[test]
    fn business_methodologies_are_not_technical() {
        let business: Vec<Methodology> = Methodology::NAMED
            .into_iter()
            .filter(|m| m.is_business())
            .collect();
        assert_eq!(business, vec![Methodology::Pasta, Methodology::Octave]);
        assert!(business.iter().all(|m| !m.is_technical()));
        assert!(Methodology::StpaSec.is_technical());
    }

    #[test]
    fn conflict_type_serializes_kebab_case() {
        let json = serde_json::to_string(&ConflictType::RiskScoreMismatch).unwrap();
        assert_eq!(json, r#""risk-score-mismatch""#);
    }

    #[test]
    fn every_gap_type_has_a_category() {
        assert_eq!(
            GapType::UnmitigatedThreat.category(),
            GapCategory::Control
        );
        assert_eq!(
            GapType::MissingAuditLogging.category(),
            GapCategory::Compliance
        );
    }

    #[test]
    fn custom_covers_no_domain() {
        assert!(CoverageDomain::covered_by(Methodology::Custom).is_empty());
        assert!(CoverageDomain::covered_by(Methodology::Linddun).contains(&CoverageDomain::Privacy));
    }
}
