//! Typed property bag shared by entities, relationships, threats and controls.
//!
//! Import adapters emit free-form property maps. The handful of keys the
//! detection predicates depend on are lifted into typed optional fields; every
//! other key is preserved verbatim in [`Properties::extra`].

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const PERSONAL_MARKERS: &[&str] = &["pii", "personal", "gdpr", "ccpa"];
const PAYMENT_MARKERS: &[&str] = &["pci", "payment", "cardholder", "card", "pan"];
const HEALTH_MARKERS: &[&str] = &["phi", "health", "hipaa", "medical", "patient"];
const HIGH_VALUE_CLASSIFICATIONS: &[&str] = &[
    "confidential",
    "secret",
    "topsecret",
    "restricted",
    "highlyconfidential",
];
const EXPOSED_MARKERS: &[&str] = &[
    "external",
    "public",
    "internet",
    "internetfacing",
    "dmz",
    "exposed",
];
const THIRD_PARTY_MARKERS: &[&str] = &[
    "thirdparty",
    "vendor",
    "supplier",
    "externalservice",
    "saas",
];
const ADVERSARY_MARKERS: &[&str] = &[
    "external",
    "adversary",
    "attacker",
    "threatactor",
    "adversarial",
    "externalattacker",
];
const AI_MARKERS: &[&str] = &[
    "ai",
    "ml",
    "llm",
    "genai",
    "machinelearning",
    "neural",
    "transformer",
    "inference",
];

/// Lower-case a value and drop everything but letters and digits.
pub(crate) fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a value into lower-case alphanumeric tokens.
pub(crate) fn tokens(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn matches_any(value: Option<&str>, markers: &[&str]) -> bool {
    value.is_some_and(|v| {
        let squashed = squash(v);
        markers.contains(&squashed.as_str()) || tokens(v).any(|t| markers.contains(&t.as_str()))
    })
}

fn is_high_label(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(squash(v).as_str(), "high" | "critical" | "veryhigh"))
}

/// Well-known optional fields plus an ordered map of everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "dataClassification",
        alias = "classification"
    )]
    pub data_classification: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "businessValue")]
    pub business_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<String>,

    /// Explicit personal-data marker, independent of the classification label.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "containsPersonalData",
        alias = "personal_data"
    )]
    pub contains_personal_data: Option<bool>,

    /// Where a threat originates (`external`, `insider`, `adversary`, ...).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "threat_source",
        alias = "threatSource"
    )]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Properties {
    /// Whether any tag matches one of `markers` after squashing.
    #[must_use]
    pub fn has_tag(&self, markers: &[&str]) -> bool {
        self.tags
            .iter()
            .any(|tag| markers.contains(&squash(tag).as_str()))
    }

    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.data_classification
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// Criticality `high`, `critical` or `very-high`.
    #[must_use]
    pub fn is_high_criticality(&self) -> bool {
        is_high_label(self.criticality.as_deref())
    }

    #[must_use]
    pub fn holds_personal_data(&self) -> bool {
        self.contains_personal_data == Some(true)
            || matches_any(self.data_classification.as_deref(), PERSONAL_MARKERS)
            || self.has_tag(&["pii", "personaldata"])
    }

    #[must_use]
    pub fn holds_payment_data(&self) -> bool {
        matches_any(self.data_classification.as_deref(), PAYMENT_MARKERS)
            || self.has_tag(&["pci", "paymentdata", "cardholderdata"])
    }

    #[must_use]
    pub fn holds_health_data(&self) -> bool {
        matches_any(self.data_classification.as_deref(), HEALTH_MARKERS)
            || self.has_tag(&["phi", "healthdata"])
    }

    /// Personal, payment or health data: anything a regulation cares about.
    #[must_use]
    pub fn holds_regulated_data(&self) -> bool {
        self.holds_personal_data() || self.holds_payment_data() || self.holds_health_data()
    }

    /// Confidential/secret classification, or high criticality or business value.
    #[must_use]
    pub fn is_high_value(&self) -> bool {
        self.data_classification
            .as_deref()
            .is_some_and(|c| HIGH_VALUE_CLASSIFICATIONS.contains(&squash(c).as_str()))
            || self.is_high_criticality()
            || is_high_label(self.business_value.as_deref())
    }

    #[must_use]
    pub fn is_externally_exposed(&self) -> bool {
        matches_any(self.exposure.as_deref(), EXPOSED_MARKERS)
    }

    #[must_use]
    pub fn is_third_party(&self) -> bool {
        self.has_tag(THIRD_PARTY_MARKERS)
    }

    #[must_use]
    pub fn is_adversary_sourced(&self) -> bool {
        matches_any(self.source.as_deref(), ADVERSARY_MARKERS) || self.has_tag(ADVERSARY_MARKERS)
    }

    #[must_use]
    pub fn is_supply_chain(&self) -> bool {
        self.has_tag(&["supplychain", "thirdpartyrisk", "dependency"])
    }

    #[must_use]
    pub fn is_ai_related(&self) -> bool {
        matches_any(self.technology.as_deref(), AI_MARKERS) || self.has_tag(AI_MARKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_classification(label: &str) -> Properties {
        Properties {
            data_classification: Some(label.to_string()),
            ..Properties::default()
        }
    }

    #[test]
    fn personal_data_from_classification_or_flag() {
        assert!(with_classification("PII").holds_personal_data());
        assert!(with_classification("personal-data").holds_personal_data());
        assert!(!with_classification("public").holds_personal_data());

        let flagged = Properties {
            contains_personal_data: Some(true),
            ..Properties::default()
        };
        assert!(flagged.holds_personal_data());
    }

    #[test]
    fn payment_and_health_markers() {
        assert!(with_classification("PCI").holds_payment_data());
        assert!(with_classification("cardholder data").holds_payment_data());
        assert!(with_classification("PHI").holds_health_data());
        assert!(!with_classification("internal").holds_regulated_data());
    }

    #[test]
    fn high_value_from_any_signal() {
        assert!(with_classification("Confidential").is_high_value());
        let critical = Properties {
            criticality: Some("critical".into()),
            ..Properties::default()
        };
        assert!(critical.is_high_value());
        let valuable = Properties {
            business_value: Some("High".into()),
            ..Properties::default()
        };
        assert!(valuable.is_high_value());
        assert!(!Properties::default().is_high_value());
    }

    #[test]
    fn ai_detection_uses_tokens_not_substrings() {
        let ml = Properties {
            technology: Some("PyTorch / ML inference".into()),
            ..Properties::default()
        };
        assert!(ml.is_ai_related());
        let plain = Properties {
            technology: Some("mainframe".into()),
            ..Properties::default()
        };
        assert!(!plain.is_ai_related());
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let json = r#"{"criticality":"high","owner":"payments-team","dataClassification":"PII"}"#;
        let props: Properties = serde_json::from_str(json).unwrap();
        assert_eq!(props.criticality.as_deref(), Some("high"));
        assert_eq!(props.data_classification.as_deref(), Some("PII"));
        assert_eq!(
            props.extra.get("owner"),
            Some(&serde_json::Value::String("payments-team".into()))
        );
    }
}
