use chrono::Utc;
use weave_config::WeaveConfig;
use weave_engine::{GapDetector, RiskScorer};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunArgs;
use crate::loader;
use crate::output::output;

/// Handle `weave score`. Compliance reads the detected gaps, so detection
/// runs first.
pub async fn handle(args: &RunArgs, config: &WeaveConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = loader::load_store(&args.input.files, args.input.strict).await?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);

    let gaps = GapDetector::new(&config.calibration).detect(store.analyses());
    let metrics = RiskScorer::new(config, as_of).score(store.analyses(), &gaps);
    output(&metrics, flags.format)
}
