use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::normalize::canonical_name;
use crate::properties::{Properties, squash};

const fn default_entity_confidence() -> f64 {
    1.0
}

/// A system element: component, data store, actor or process.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", alias = "entity_type")]
    pub entity_type: String,
    #[serde(default)]
    pub properties: Properties,
    /// How sure the producing methodology is about this element (0–1).
    #[serde(default = "default_entity_confidence")]
    pub confidence: f64,
}

impl Entity {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            properties: Properties::default(),
            confidence: default_entity_confidence(),
        }
    }

    #[must_use]
    pub fn with_criticality(mut self, criticality: impl Into<String>) -> Self {
        self.properties.criticality = Some(criticality.into());
        self
    }

    #[must_use]
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.properties.data_classification = Some(classification.into());
        self
    }

    #[must_use]
    pub const fn with_personal_data(mut self, flag: bool) -> Self {
        self.properties.contains_personal_data = Some(flag);
        self
    }

    #[must_use]
    pub fn with_exposure(mut self, exposure: impl Into<String>) -> Self {
        self.properties.exposure = Some(exposure.into());
        self
    }

    #[must_use]
    pub fn with_business_value(mut self, value: impl Into<String>) -> Self {
        self.properties.business_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.properties.technology = Some(technology.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.properties.tags.push(tag.into());
        self
    }

    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Cross-methodology matching key.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        canonical_name(&self.name)
    }

    /// Whether `reference` names this entity by id or (case-insensitively) by name.
    #[must_use]
    pub fn is_referenced_by(&self, reference: &str) -> bool {
        self.id == reference || canonical_name(reference) == self.canonical_name()
    }

    #[must_use]
    pub fn is_datastore(&self) -> bool {
        matches!(
            squash(&self.entity_type).as_str(),
            "datastore" | "database" | "db" | "storage" | "datastorage" | "objectstore"
        )
    }

    #[must_use]
    pub fn is_process(&self) -> bool {
        matches!(
            squash(&self.entity_type).as_str(),
            "process" | "service" | "businessprocess" | "job"
        )
    }

    #[must_use]
    pub fn is_third_party(&self) -> bool {
        matches!(
            squash(&self.entity_type).as_str(),
            "thirdparty" | "vendor" | "supplier" | "externalservice" | "externalentity"
        ) || self.properties.is_third_party()
    }

    #[must_use]
    pub fn is_ai_component(&self) -> bool {
        matches!(
            squash(&self.entity_type).as_str(),
            "mlmodel" | "aimodel" | "llm" | "aiagent" | "model" | "aicomponent" | "mlpipeline"
        ) || self.properties.is_ai_related()
    }
}
