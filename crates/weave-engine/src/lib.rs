//! # weave-engine
//!
//! Synthesis engine for riskweave.
//!
//! Takes a pool of [`StandardizedAnalysis`](weave_core::records::StandardizedAnalysis)
//! records produced by different threat-modeling methodologies and reconciles
//! them into one [`SynthesisResult`](weave_core::result::SynthesisResult):
//!
//! - [`gaps`]: missing methodology coverage, unmitigated threats, missing
//!   compliance controls and data handling problems
//! - [`conflicts`]: disagreements between methodologies and their
//!   deterministic resolution
//! - [`scoring`]: the unified 0–10 risk score with compliance, coverage,
//!   trend, top risks and ROI
//! - [`insights`] and [`recommendations`]: cross-methodology asymmetries and
//!   the prioritized action list
//! - [`orchestrator`]: runs every pass over an [`AnalysisStore`]
//!
//! Every computation is synchronous and pure over its input. Synthesis never
//! fails: sparse input produces a sparse result.
//!
//! ```
//! use chrono::Utc;
//! use weave_engine::{AnalysisStore, Synthesizer};
//!
//! let result = Synthesizer::default().synthesize_at(&AnalysisStore::new(), Utc::now());
//! assert!(result.gaps.is_empty());
//! ```

pub mod conflicts;
pub mod gaps;
pub mod insights;
pub mod orchestrator;
pub mod recommendations;
pub mod scoring;
pub mod store;

mod pool;
mod stats;
mod text;

pub use conflicts::{ConflictResolver, detect_conflicts, resolve_conflicts};
pub use gaps::{GapDetector, detect_gaps};
pub use insights::detect_insights;
pub use orchestrator::{Synthesizer, data_recency};
pub use scoring::{RiskScorer, calculate_unified_risk, coverage_map};
pub use store::AnalysisStore;
