use weave_config::WeaveConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: &WeaveConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Synthesize(args) => commands::synthesize::handle(&args, config, flags).await,
        Commands::Gaps(args) => commands::gaps::handle(&args, config, flags).await,
        Commands::Conflicts(args) => commands::conflicts::handle(&args, config, flags).await,
        Commands::Score(args) => commands::score::handle(&args, config, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
        Commands::Config => commands::config::handle(config),
    }
}
