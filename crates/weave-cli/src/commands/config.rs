use anyhow::Context;
use weave_config::WeaveConfig;

/// Handle `weave config`. Always TOML, the format the files are written in.
pub fn handle(config: &WeaveConfig) -> anyhow::Result<()> {
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &WeaveConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).context("failed to render configuration as TOML")
}
