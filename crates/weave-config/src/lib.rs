//! # weave-config
//!
//! Layered configuration loading for riskweave using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`WEAVE_*` prefix, `__` as separator)
//! 2. An explicit file passed to [`WeaveConfig::load_from`]
//! 3. Project-level `.riskweave/config.toml`
//! 4. User-level `~/.config/riskweave/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `WEAVE_CALIBRATION__EXPECTED_CONTROLS` ->
//! `calibration.expected_controls`, `WEAVE_WEIGHTS__STPA_SEC__SYSTEMIC` ->
//! `weights.stpa_sec.systemic`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use weave_config::WeaveConfig;
//!
//! let config = WeaveConfig::load_with_dotenv().expect("config");
//! assert_eq!(config.calibration.expected_controls, 10);
//! ```

mod calibration;
mod error;
mod log;
mod weights;

pub use calibration::CalibrationConfig;
pub use error::ConfigError;
pub use log::LogConfig;
pub use weights::{AxisWeights, MethodologyTable, SystemicStrength};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The immutable calibration handed to the synthesis engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WeaveConfig {
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub weights: MethodologyTable<AxisWeights>,
    #[serde(default)]
    pub severity_trust: MethodologyTable<f64>,
    #[serde(default)]
    pub systemic_strength: MethodologyTable<SystemicStrength>,
    #[serde(default)]
    pub log: LogConfig,
}

impl WeaveConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Load configuration with an explicit TOML file layered above the
    /// discovered files and below the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file does not parse, extraction fails
    /// or a value is out of range.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::invalid(
                "config",
                format!("file not found: {}", path.display()),
            ));
        }
        let figment = Self::file_layers()
            .merge(Toml::file(path))
            .merge(Self::env_provider());
        Self::extract(figment)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::file_layers().merge(Self::env_provider())
    }

    /// Reject values that would make the scoring formulas meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        self.weights.validate()?;
        self.severity_trust.validate_as("severity_trust")?;
        self.systemic_strength.validate()?;
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::invalid("log.level", "must not be empty"));
        }
        Ok(())
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn file_layers() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".riskweave/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    fn env_provider() -> Env {
        Env::prefixed("WEAVE_")
            .split("__")
            // `WEAVE_LOG` is the CLI's filter directive, not a config section.
            .ignore(&["log"])
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("riskweave").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) looking for a `.env`
    /// file, then falls back to the current directory. Silently does nothing
    /// if none is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::enums::Methodology;

    #[test]
    fn default_config_validates() {
        let config = WeaveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.weights.get(Methodology::Stride).technical, 1.0);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: WeaveConfig = WeaveConfig::figment().extract()?;
            assert_eq!(config.calibration.threat_category_reference, 6);
            assert_eq!(config.calibration.top_risk_limit, 10);
            Ok(())
        });
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let err = WeaveConfig::load_from("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }
}
