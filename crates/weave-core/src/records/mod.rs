//! Standardized analysis records produced by import adapters.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so the
//! input shape can be published and validated at the boundary.

mod analysis;
mod control;
mod entity;
mod relationship;
mod risk;
mod threat;

pub use analysis::{AnalysisMetadata, StandardizedAnalysis};
pub use control::Control;
pub use entity::Entity;
pub use relationship::Relationship;
pub use risk::Risk;
pub use threat::Threat;
