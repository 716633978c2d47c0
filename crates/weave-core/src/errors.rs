//! Cross-cutting error types for riskweave.
//!
//! Synthesis itself never fails on well-typed input; these errors surface only
//! where a caller asks for strict behaviour (label parsing, record validation).
//! Configuration errors live in `weave-config` and I/O errors are handled with
//! `anyhow` in `weave-cli`.

use thiserror::Error;

/// Errors that can be raised by any riskweave crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A label did not belong to the closed vocabulary it was parsed against.
    #[error("Invalid {kind} label: {value:?}")]
    InvalidLabel { kind: &'static str, value: String },

    /// A record failed validation (shape or range constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
