//! Configuration loading for stagedoor
//!
//! Small and flat: defaults, an optional local `stagedoor.toml`, then a
//! `STAGEDOOR_*` environment overlay (later wins). The host application
//! owns any richer config story; this crate only needs the knobs below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error raised during config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Upper bound the control surface clamps animation speed to
    pub speed_limit: f64,
    /// Speed applied at construction; 0 leaves the clock frozen
    pub initial_speed: f64,
    /// Log filter for the subscriber the host installs
    pub log_level: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            speed_limit: 2.0,
            initial_speed: 0.0,
            log_level: "info".to_string(),
        }
    }
}

impl StageConfig {
    /// Load config: defaults, local `stagedoor.toml` if present, then
    /// environment overlay
    pub fn load() -> Result<Self, ConfigError> {
        let local = Path::new("stagedoor.toml");
        let mut config = if local.exists() {
            Self::load_from_file(local)?
        } else {
            Self::default()
        };
        config.overlay(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STAGEDOOR_*` overrides from the given lookup
    fn overlay(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = get("STAGEDOOR_SPEED_LIMIT") {
            self.speed_limit = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "speed_limit",
                message: format!("not a number: {raw:?}"),
            })?;
        }
        if let Some(raw) = get("STAGEDOOR_INITIAL_SPEED") {
            self.initial_speed = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "initial_speed",
                message: format!("not a number: {raw:?}"),
            })?;
        }
        if let Some(raw) = get("STAGEDOOR_LOG_LEVEL") {
            self.log_level = raw;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.speed_limit.is_finite() || self.speed_limit <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "speed_limit",
                message: format!("must be a positive number, got {}", self.speed_limit),
            });
        }
        if !self.initial_speed.is_finite() || self.initial_speed < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "initial_speed",
                message: format!("must be non-negative, got {}", self.initial_speed),
            });
        }
        if self.initial_speed > self.speed_limit {
            return Err(ConfigError::InvalidValue {
                key: "initial_speed",
                message: format!(
                    "{} exceeds speed_limit {}",
                    self.initial_speed, self.speed_limit
                ),
            });
        }
        Ok(())
    }
}
