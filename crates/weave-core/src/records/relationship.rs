use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::properties::Properties;

/// Directed edge between two entity identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    /// `data-flow`, `control`, `trust`, ...
    #[serde(rename = "type", alias = "relationship_type")]
    pub relationship_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relationship_type: relationship_type.into(),
            properties: Properties::default(),
        }
    }
}
