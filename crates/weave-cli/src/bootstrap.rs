use anyhow::Context;
use weave_config::WeaveConfig;

use crate::cli::GlobalFlags;

/// Resolve the effective configuration: `--config` is layered above the
/// discovered TOML files and below the environment.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<WeaveConfig> {
    let Some(path) = &flags.config else {
        return WeaveConfig::load_with_dotenv().context("failed to load riskweave configuration");
    };

    dotenvy::dotenv().ok();
    WeaveConfig::load_from(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}
