use schemars::{Schema, schema_for};
use weave_core::records::StandardizedAnalysis;
use weave_core::result::SynthesisResult;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaRecord};
use crate::output::output;

/// Handle `weave schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_of(args.record), flags.format)
}

fn schema_of(record: SchemaRecord) -> Schema {
    match record {
        SchemaRecord::Analysis => schema_for!(StandardizedAnalysis),
        SchemaRecord::Result => schema_for!(SynthesisResult),
    }
}
