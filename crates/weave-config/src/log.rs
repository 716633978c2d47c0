//! Logging configuration.

use serde::{Deserialize, Serialize};

fn default_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Default `tracing` filter when `WEAVE_LOG` is unset and neither
    /// `--quiet` nor `--verbose` is given.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}
