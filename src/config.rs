//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logging::LogFormat;
use crate::reporter::ReportFormat;

/// File looked up in the home directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".qti-migrator.yaml";

pub const ENV_VERBOSITY: &str = "QTI_MIGRATOR_VERBOSITY";
pub const ENV_REPORT_FORMAT: &str = "QTI_MIGRATOR_REPORT_FORMAT";

/// Settings shared by every command. Flags given on the command line win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 0 (quiet) to 3 (everything).
    pub verbosity: u8,
    pub report_format: ReportFormat,
    pub log_format: LogFormat,
    /// Overwrite existing output files.
    pub force: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: 1,
            report_format: ReportFormat::Text,
            log_format: LogFormat::Compact,
            force: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("verbosity must be between 0 and 3, got {0}")]
    Verbosity(u8),
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // an empty file is a valid, all-default config
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Explicit path, else `$HOME/.qti-migrator.yaml` when present, else defaults.
    /// Environment overrides are applied on top.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load(path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QTI_MIGRATOR_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_VERBOSITY) {
            self.verbosity = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_VERBOSITY.to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_REPORT_FORMAT) {
            self.report_format = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_REPORT_FORMAT.to_string(),
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verbosity > 3 {
            return Err(ConfigError::Verbosity(self.verbosity));
        }
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}
