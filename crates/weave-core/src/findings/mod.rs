//! Synthesis findings: gaps, conflicts and their resolutions, insights and
//! recommendations.

mod conflict;
mod gap;
mod insight;
mod recommendation;

pub use conflict::{
    ClassificationInput, Conflict, ConflictDetails, ConflictResolution, EffectivenessInput,
    ResolutionMethod, ResolvedValue, ScoreInput, SeverityInput,
};
pub use gap::Gap;
pub use insight::Insight;
pub use recommendation::{Recommendation, RecommendationOrigin};
