use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Effort, InsightType, Methodology, Severity};

/// A cross-methodology asymmetry worth acting on. Not a disagreement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Insight {
    /// `INS-001`, ...
    pub id: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub methodologies: Vec<Methodology>,
    pub affected_entities: Vec<String>,
    pub recommendation: String,
    /// 0–1: how directly the insight translates into a concrete action.
    pub actionability: f64,
    pub effort: Effort,
    pub sources: Vec<String>,
}
