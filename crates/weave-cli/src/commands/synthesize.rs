use chrono::Utc;
use weave_config::WeaveConfig;
use weave_engine::Synthesizer;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunArgs;
use crate::loader;
use crate::output::output;

/// Handle `weave synthesize`.
pub async fn handle(args: &RunArgs, config: &WeaveConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = loader::load_store(&args.input.files, args.input.strict).await?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);

    let result = Synthesizer::new(config.clone()).synthesize_at(&store, as_of);
    output(&result, flags.format)
}
