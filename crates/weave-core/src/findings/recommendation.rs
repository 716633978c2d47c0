use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Effort;

/// What a recommendation was generated from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationOrigin {
    Gap { gap_id: String },
    Insight { insight_id: String },
    Strategic,
}

/// A prioritized action. Priority 1 is most urgent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Recommendation {
    /// `REC-001`, ...
    pub id: String,
    pub priority: u8,
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub origin: RecommendationOrigin,
    pub effort: Effort,
    pub affected_entities: Vec<String>,
}
