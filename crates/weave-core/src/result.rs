//! Top-level synthesis output.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Methodology;
use crate::findings::{ConflictResolution, Gap, Insight, Recommendation};
use crate::metrics::SynthesisMetrics;
use crate::records::StandardizedAnalysis;

/// Short description of one consumed analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AnalysisSummary {
    pub id: String,
    pub methodology: Methodology,
    pub source: String,
    pub imported_at: DateTime<Utc>,
    pub confidence: f64,
    pub entities: usize,
    pub relationships: usize,
    pub threats: usize,
    pub controls: usize,
    pub risks: usize,
}

impl From<&StandardizedAnalysis> for AnalysisSummary {
    fn from(analysis: &StandardizedAnalysis) -> Self {
        Self {
            id: analysis.id(),
            methodology: analysis.methodology,
            source: analysis.metadata.source.clone(),
            imported_at: analysis.metadata.imported_at,
            confidence: analysis.confidence(),
            entities: analysis.entities.len(),
            relationships: analysis.relationships.len(),
            threats: analysis.threats.len(),
            controls: analysis.controls.len(),
            risks: analysis.risks.len(),
        }
    }
}

/// Everything one synthesis run produces.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SynthesisResult {
    /// The evaluation instant the run was computed against.
    pub generated_at: DateTime<Utc>,
    pub analyses: Vec<AnalysisSummary>,
    pub gaps: Vec<Gap>,
    pub conflicts: Vec<ConflictResolution>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub metrics: SynthesisMetrics,
}
