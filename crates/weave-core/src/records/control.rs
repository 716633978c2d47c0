use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Effectiveness;
use crate::properties::{Properties, squash};

/// A described mitigation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Control {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type", alias = "control_type")]
    pub control_type: String,
    /// Raw implementation state (`implemented`, `planned`, ...).
    #[serde(
        default,
        alias = "implementation_status",
        alias = "implementationStatus",
        alias = "status"
    )]
    pub implementation_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "protectsEntity")]
    pub protects_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "mitigatesThreat")]
    pub mitigates_threat: Option<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl Control {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            control_type: String::new(),
            implementation_state: String::new(),
            protects_entity: None,
            mitigates_threat: None,
            properties: Properties::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.implementation_state = state.into();
        self
    }

    #[must_use]
    pub fn with_effectiveness(mut self, effectiveness: impl Into<String>) -> Self {
        self.properties.effectiveness = Some(effectiveness.into());
        self
    }

    #[must_use]
    pub fn protecting(mut self, entity: impl Into<String>) -> Self {
        self.protects_entity = Some(entity.into());
        self
    }

    #[must_use]
    pub fn mitigating(mut self, threat: impl Into<String>) -> Self {
        self.mitigates_threat = Some(threat.into());
        self
    }

    /// The label the effectiveness scale reads: the explicit effectiveness
    /// property, else the implementation state.
    #[must_use]
    pub fn effectiveness_label(&self) -> Option<&str> {
        self.properties
            .effectiveness
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .or_else(|| {
                let state = self.implementation_state.trim();
                (!state.is_empty()).then_some(state)
            })
    }

    #[must_use]
    pub fn effectiveness(&self) -> Effectiveness {
        self.effectiveness_label()
            .map(Effectiveness::from_label)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_untested(&self) -> bool {
        self.properties
            .effectiveness
            .as_deref()
            .is_some_and(Effectiveness::is_untested_label)
    }

    /// Flagged with low/ineffective or untested effectiveness.
    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.is_untested()
            || self.properties.effectiveness.as_deref().is_some_and(|label| {
                matches!(
                    Effectiveness::from_label(label),
                    Effectiveness::Low | Effectiveness::Ineffective
                )
            })
    }

    #[must_use]
    pub fn is_implemented(&self) -> bool {
        matches!(
            squash(&self.implementation_state).as_str(),
            "implemented" | "deployed" | "active" | "inplace" | "operational" | "verified"
                | "enforced" | "enabled"
        )
    }

    /// Implemented and not flagged weak: counts toward the compliance score.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.is_implemented() && !self.is_weak()
    }

    /// Lower-cased name, description and type, used for evidence matching.
    #[must_use]
    pub fn evidence_text(&self) -> String {
        format!("{} {} {}", self.name, self.description, self.control_type).to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effectiveness_prefers_property_over_state() {
        let control = Control::new("c1", "WAF")
            .with_state("implemented")
            .with_effectiveness("high");
        assert_eq!(control.effectiveness(), Effectiveness::High);

        let state_only = Control::new("c2", "MFA").with_state("not-implemented");
        assert_eq!(state_only.effectiveness(), Effectiveness::Ineffective);

        assert_eq!(Control::new("c3", "Backups").effectiveness(), Effectiveness::Medium);
    }

    #[test]
    fn weak_covers_low_and_untested() {
        assert!(Control::new("c", "x").with_effectiveness("untested").is_weak());
        assert!(Control::new("c", "x").with_effectiveness("low").is_weak());
        assert!(!Control::new("c", "x").with_effectiveness("high").is_weak());
        assert!(!Control::new("c", "x").with_state("planned").is_weak());
    }

    #[test]
    fn effective_requires_implementation() {
        assert!(Control::new("c", "x").with_state("Implemented").is_effective());
        assert!(!Control::new("c", "x").with_state("planned").is_effective());
        assert!(
            !Control::new("c", "x")
                .with_state("implemented")
                .with_effectiveness("untested")
                .is_effective()
        );
    }

    #[test]
    fn description_does_not_affect_effectiveness() {
        let control = Control::new("c3", "Backups")
            .with_description("Nightly encrypted snapshots")
            .with_state("implemented");
        assert_eq!(control.description, "Nightly encrypted snapshots");
        assert_eq!(
            control.effectiveness(),
            Control::new("c4", "Backups").with_state("implemented").effectiveness()
        );
    }
}
