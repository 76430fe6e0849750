use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::input::{AxisThresholds, ThresholdError};

const CONFIG_DIR: &str = ".config/motiontrace";
const CONFIG_FILE: &str = "config.toml";

/// Recorder configuration, TOML-backed.
///
/// A missing config file degrades to defaults; a malformed file or invalid
/// values fail fast at startup.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct RecorderConfig {
    /// Polling period in milliseconds.
    pub sample_interval_ms: u64,
    /// Deadzone magnitude for the pan channel group.
    pub pan_threshold: f32,
    /// Deadzone magnitude for the roll channel group.
    pub roll_threshold: f32,
    /// Directory exported sessions are written to.
    pub output_dir: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            pan_threshold: 5.0 / 32767.0,
            roll_threshold: 5.0 / 32767.0,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid threshold: {0}")]
    Threshold(#[from] ThresholdError),

    #[error("Sample interval must be greater than zero")]
    ZeroInterval,
}

impl RecorderConfig {
    /// Loads from `~/.config/motiontrace/config.toml`, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds().validate()?;
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn thresholds(&self) -> AxisThresholds {
        AxisThresholds {
            pan: self.pan_threshold,
            roll: self.roll_threshold,
        }
    }
}

fn config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RecorderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RecorderConfig = toml::from_str("sample_interval_ms = 50").unwrap();
        assert_eq!(config.sample_interval_ms, 50);
        assert_eq!(config.pan_threshold, 5.0 / 32767.0);
    }

    #[test]
    fn test_invalid_threshold_fails_fast() {
        let config: RecorderConfig = toml::from_str("pan_threshold = 1.5").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Threshold(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config: RecorderConfig = toml::from_str("sample_interval_ms = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval)));
    }
}
