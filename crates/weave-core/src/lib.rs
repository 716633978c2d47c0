//! # weave-core
//!
//! Core record types for riskweave.
//!
//! This crate provides the types shared across all riskweave crates:
//! - Standardized analysis records produced by import adapters
//!   (entities, relationships, threats, controls, risks)
//! - A typed property bag with the well-known optional fields detection
//!   predicates rely on
//! - Closed label vocabularies (methodology, severity, effectiveness, ...)
//!   with lenient and strict parsing
//! - Synthesis outputs: gaps, conflicts and resolutions, insights,
//!   recommendations, metrics and the top-level result
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod findings;
pub mod metrics;
pub mod normalize;
pub mod properties;
pub mod records;
pub mod result;
