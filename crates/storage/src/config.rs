// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("write_attempts must be at least 1")]
    NoWriteAttempts,
}

/// What `save()` does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavePolicy {
    /// Start an asynchronous cycle right away
    Immediate,
    /// Coalesce into the delayed-save timer
    #[default]
    Deferred,
}

/// Configuration for an entity store
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Destination file
    pub path: PathBuf,
    pub save_policy: SavePolicy,
    /// Delay used by `save_delayed`
    #[serde(with = "humantime_serde")]
    pub save_delay: Duration,
    /// Periodic save interval while dirty; zero disables autosave
    #[serde(with = "humantime_serde")]
    pub autosave_interval: Duration,
    /// Atomic-write attempts per cycle
    pub write_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub write_retry_delay: Duration,
    /// Delay before a failed cycle is retried as a whole
    #[serde(with = "humantime_serde")]
    pub failure_retry_delay: Duration,
    /// Minimum spacing between operator alerts about failing saves
    #[serde(with = "humantime_serde")]
    pub failure_alert_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("entities.toml"),
            save_policy: SavePolicy::Deferred,
            // 20 ticks at 20 Hz
            save_delay: Duration::from_secs(1),
            autosave_interval: Duration::from_secs(300),
            write_attempts: 5,
            write_retry_delay: Duration::from_millis(100),
            failure_retry_delay: Duration::from_secs(30),
            failure_alert_interval: Duration::from_secs(300),
        }
    }
}

impl StoreConfig {
    /// Defaults for the given destination file
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Read a TOML config file
    ///
    /// A relative `path` inside the file is resolved against the config
    /// file's directory.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let mut config: StoreConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?;
        if config.path.is_relative() {
            if let Some(dir) = config_path.parent() {
                config.path = dir.join(&config.path);
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn autosave(&self) -> Option<Duration> {
        (!self.autosave_interval.is_zero()).then_some(self.autosave_interval)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.write_attempts == 0 {
            return Err(ConfigError::NoWriteAttempts);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
