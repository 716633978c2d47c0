use chrono::Utc;
use weave_config::WeaveConfig;
use weave_engine::ConflictResolver;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunArgs;
use crate::loader;
use crate::output::output;

/// Handle `weave conflicts`.
pub async fn handle(args: &RunArgs, config: &WeaveConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = loader::load_store(&args.input.files, args.input.strict).await?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);

    let resolutions = ConflictResolver::new(config, as_of).resolve_all(store.analyses());
    output(&resolutions, flags.format)
}
