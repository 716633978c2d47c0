use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A scored risk item, optionally tied to an entity (by id or name).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Risk {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "entity_id", alias = "entityId")]
    pub entity: Option<String>,
    /// 0–10.
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigated: Option<bool>,
}

impl Risk {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            entity: None,
            score,
            mitigated: None,
        }
    }

    #[must_use]
    pub fn on_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    #[must_use]
    pub const fn with_mitigated(mut self, mitigated: bool) -> Self {
        self.mitigated = Some(mitigated);
        self
    }

    #[must_use]
    pub fn is_mitigated(&self) -> bool {
        self.mitigated == Some(true)
    }
}
