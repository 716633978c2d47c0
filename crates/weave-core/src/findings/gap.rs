use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Effort, GapCategory, GapType, Methodology, Severity};

/// A documented absence of required analysis coverage or mitigation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Gap {
    /// `GAP-001`, ... assigned after ranking.
    pub id: String,
    #[serde(rename = "type")]
    pub gap_type: GapType,
    pub category: GapCategory,
    pub severity: Severity,
    pub description: String,
    pub affected_entities: Vec<String>,
    pub recommendation: String,
    pub effort: Effort,
    pub business_impact: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance_impact: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_methodology: Option<Methodology>,
    /// Ids of the analyses this gap was derived from.
    pub sources: Vec<String>,
}

impl Gap {
    /// Deduplication key: gap type plus the sorted affected-entity list.
    #[must_use]
    pub fn dedupe_key(&self) -> (GapType, Vec<String>) {
        let mut entities = self.affected_entities.clone();
        entities.sort();
        (self.gap_type, entities)
    }
}
