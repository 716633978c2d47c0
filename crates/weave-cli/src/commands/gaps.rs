use weave_config::WeaveConfig;
use weave_core::enums::Severity;
use weave_core::findings::Gap;
use weave_engine::GapDetector;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::GapsArgs;
use crate::loader;
use crate::output::output;

/// Handle `weave gaps`.
pub async fn handle(args: &GapsArgs, config: &WeaveConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = loader::load_store(&args.input.files, args.input.strict).await?;

    let gaps = GapDetector::new(&config.calibration).detect(store.analyses());
    let gaps = at_least(gaps, args.min_severity);
    output(&gaps, flags.format)
}

/// Filtering keeps the detector's ranking and ids.
fn at_least(gaps: Vec<Gap>, min_severity: Option<Severity>) -> Vec<Gap> {
    match min_severity {
        Some(min) => gaps.into_iter().filter(|gap| gap.severity >= min).collect(),
        None => gaps,
    }
}
