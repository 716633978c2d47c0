use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Severity;
use crate::normalize::normalize_category;
use crate::properties::Properties;

fn default_severity_label() -> String {
    Severity::Medium.as_str().to_string()
}

/// A described adverse condition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Threat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Raw severity label as produced by the methodology.
    #[serde(default = "default_severity_label")]
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "affectedEntity")]
    pub affected_entity: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "affectedRelationship"
    )]
    pub affected_relationship: Option<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl Threat {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            severity: severity.into(),
            affected_entity: None,
            affected_relationship: None,
            properties: Properties::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn affecting(mut self, entity: impl Into<String>) -> Self {
        self.affected_entity = Some(entity.into());
        self
    }

    #[must_use]
    pub fn on_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.affected_relationship = Some(relationship.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.properties.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.properties.tags.push(tag.into());
        self
    }

    /// Typed severity; unknown labels read as medium.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::from_label(&self.severity)
    }

    #[must_use]
    pub fn category_key(&self) -> String {
        normalize_category(&self.category)
    }

    #[must_use]
    pub fn is_adversary_sourced(&self) -> bool {
        self.properties.is_adversary_sourced()
    }

    #[must_use]
    pub fn is_supply_chain(&self) -> bool {
        self.category_key() == "supply-chain" || self.properties.is_supply_chain()
    }

    /// Disclosure or privacy-specific threat (reputational impact).
    #[must_use]
    pub fn is_privacy_related(&self) -> bool {
        matches!(
            self.category_key().as_str(),
            "information-disclosure"
                | "privacy"
                | "linkability"
                | "identifiability"
                | "detectability"
                | "unawareness"
                | "non-compliance"
        ) || self.properties.has_tag(&["privacy", "disclosure"])
    }

    /// Availability threat (operational impact).
    #[must_use]
    pub fn is_availability_related(&self) -> bool {
        self.category_key() == "denial-of-service" || self.properties.has_tag(&["availability"])
    }

    #[must_use]
    pub fn is_compliance_related(&self) -> bool {
        matches!(self.category_key().as_str(), "compliance" | "non-compliance")
            || self.properties.has_tag(&["compliance", "regulatory"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_label_is_lenient() {
        assert_eq!(Threat::new("t", "x", "spoofing", "CRITICAL").severity(), Severity::Critical);
        assert_eq!(Threat::new("t", "x", "spoofing", "???").severity(), Severity::Medium);
    }

    #[test]
    fn missing_severity_defaults_to_medium() {
        let threat: Threat = serde_json::from_str(r#"{"id":"t1","name":"Replay"}"#).unwrap();
        assert_eq!(threat.severity(), Severity::Medium);
        assert!(threat.category.is_empty());
    }

    #[test]
    fn supply_chain_from_category_or_tag() {
        assert!(Threat::new("t", "x", "Supply Chain", "high").is_supply_chain());
        assert!(
            Threat::new("t", "x", "tampering", "high")
                .with_tag("supply-chain")
                .is_supply_chain()
        );
    }
}
