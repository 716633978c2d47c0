use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};
use weave_core::enums::Severity;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run every synthesis pass and print the full result.
    Synthesize(RunArgs),
    /// Detect coverage, mitigation, compliance and data handling gaps.
    Gaps(GapsArgs),
    /// Detect and resolve disagreements between methodologies.
    Conflicts(RunArgs),
    /// Compute the unified risk score and executive metrics.
    Score(RunArgs),
    /// Print the JSON Schema of an input or output record.
    Schema(SchemaArgs),
    /// Print the effective configuration as TOML.
    Config,
}

/// Analysis files shared by every command that reads input.
#[derive(Clone, Debug, Args)]
pub struct InputArgs {
    /// JSON files holding one analysis or an array of analyses
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Reject analyses that fail shape validation instead of tolerating them
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Evaluate recency and trend at this instant (RFC 3339) instead of now
    #[arg(long)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Args)]
pub struct GapsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only report gaps at or above this severity
    #[arg(long)]
    pub min_severity: Option<Severity>,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Record to describe
    pub record: SchemaRecord,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaRecord {
    /// A standardized analysis, the input shape
    Analysis,
    /// A synthesis result, the output shape
    Result,
}
