use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ConflictType, Effectiveness, Methodology, Severity};

/// One methodology's numeric score for the disputed subject.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScoreInput {
    pub methodology: Methodology,
    pub analysis_id: String,
    pub score: f64,
    /// Declared confidence of the analysis, used as the averaging weight.
    pub confidence: f64,
}

/// One methodology's effectiveness assessment of a control.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EffectivenessInput {
    pub methodology: Methodology,
    pub analysis_id: String,
    pub control_name: String,
    /// Raw label as reported.
    pub label: String,
    pub effectiveness: Effectiveness,
    pub imported_at: DateTime<Utc>,
}

/// One methodology's type tag for an entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ClassificationInput {
    pub methodology: Methodology,
    pub analysis_id: String,
    pub entity_type: String,
    pub confidence: f64,
}

/// One methodology's severity for a threat.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SeverityInput {
    pub methodology: Methodology,
    pub analysis_id: String,
    pub threat_name: String,
    pub severity: Severity,
    pub confidence: f64,
}

/// Type-specific payload of a [`Conflict`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictDetails {
    RiskScore {
        scores: Vec<ScoreInput>,
        spread: f64,
        std_dev: f64,
    },
    ControlEffectiveness {
        assessments: Vec<EffectivenessInput>,
    },
    ThreatExistence {
        category: String,
        target: String,
        identified_by: Vec<Methodology>,
        missing_from: Vec<Methodology>,
        highest_severity: Severity,
    },
    EntityClassification {
        classifications: Vec<ClassificationInput>,
    },
    SeverityRating {
        ratings: Vec<SeverityInput>,
        keywords: Vec<String>,
    },
}

/// A documented disagreement between two or more methodologies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Conflict {
    /// `CONF-001`, ... in detection order.
    pub id: String,
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    /// What the methodologies disagree about (entity, control or threat key).
    pub subject: String,
    /// Sorted, distinct.
    pub methodologies: Vec<Methodology>,
    pub details: ConflictDetails,
    pub severity: Severity,
    pub sources: Vec<String>,
}

/// How a conflict was adjudicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    WeightedAverage,
    SpecialistOverride,
    RecencyWeightedAverage,
    MajorityVote,
    SpecialistIdentification,
    AuthoritativeSource,
    HighestConfidence,
    MajorityClassification,
    TrustWeightedSeverity,
    ConservativeEscalation,
}

/// The adjudicated answer. Shape depends on the conflict type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResolvedValue {
    Score(f64),
    Label(String),
    Exists(bool),
}

/// A [`Conflict`] with its resolution.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ConflictResolution {
    pub conflict: Conflict,
    pub method: ResolutionMethod,
    pub resolved_value: ResolvedValue,
    /// 0–1; lower when the underlying inputs spread further apart.
    pub confidence: f64,
    pub rationale: String,
}
