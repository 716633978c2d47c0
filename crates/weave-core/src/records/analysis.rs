use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Control, Entity, Relationship, Risk, Threat};
use crate::enums::Methodology;
use crate::errors::CoreError;

/// Declared confidence when an adapter does not supply one.
const fn default_declared_confidence() -> f64 {
    0.5
}

/// Provenance of one methodology run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AnalysisMetadata {
    /// Label of the source the adapter imported from.
    pub source: String,
    #[serde(alias = "importedAt", alias = "timestamp")]
    pub imported_at: DateTime<Utc>,
    /// Declared confidence in the whole analysis (0–1).
    #[serde(default = "default_declared_confidence")]
    pub confidence: f64,
}

/// One run of one methodology, normalized into the common record shape.
///
/// Every collection defaults to empty so a sparse record still synthesizes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StandardizedAnalysis {
    pub methodology: Methodology,
    pub metadata: AnalysisMetadata,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub threats: Vec<Threat>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub risks: Vec<Risk>,
}

impl StandardizedAnalysis {
    #[must_use]
    pub fn new(methodology: Methodology, source: impl Into<String>, imported_at: DateTime<Utc>) -> Self {
        Self {
            methodology,
            metadata: AnalysisMetadata {
                source: source.into(),
                imported_at,
                confidence: default_declared_confidence(),
            },
            entities: Vec::new(),
            relationships: Vec::new(),
            threats: Vec::new(),
            controls: Vec::new(),
            risks: Vec::new(),
        }
    }

    /// Traceability id: `"{methodology-slug}:{source}"`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}:{}", self.methodology.slug(), self.metadata.source)
    }

    /// Declared confidence clamped to 0–1 (NaN reads as 0).
    #[must_use]
    pub fn confidence(&self) -> f64 {
        let value = self.metadata.confidence;
        if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
    }

    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.metadata.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    #[must_use]
    pub fn with_threat(mut self, threat: Threat) -> Self {
        self.threats.push(threat);
        self
    }

    #[must_use]
    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    #[must_use]
    pub fn with_risk(mut self, risk: Risk) -> Self {
        self.risks.push(risk);
        self
    }

    /// Strict shape check for callers that want to reject bad adapter output
    /// instead of letting the engine tolerate it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let id = self.id();
        if self.metadata.source.trim().is_empty() {
            return Err(CoreError::Validation(format!("{id}: empty source label")));
        }
        if !(0.0..=1.0).contains(&self.metadata.confidence) {
            return Err(CoreError::Validation(format!(
                "{id}: declared confidence {} outside 0..=1",
                self.metadata.confidence
            )));
        }
        if let Some(entity) = self.entities.iter().find(|e| e.name.trim().is_empty()) {
            return Err(CoreError::Validation(format!(
                "{id}: entity {} has an empty name",
                entity.id
            )));
        }
        if let Some(risk) = self
            .risks
            .iter()
            .find(|r| !(0.0..=10.0).contains(&r.score))
        {
            return Err(CoreError::Validation(format!(
                "{id}: risk {} score {} outside 0..=10",
                risk.id, risk.score
            )));
        }
        Ok(())
    }
}
