// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job settings read once at construction.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, then
//! `PULSE_*` environment variables.
//!
//! ```toml
//! [core]
//! executor = "LocalExecutor"
//!
//! [scheduler]
//! job_heartbeat_sec = 5
//! max_tis_per_query = 512
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HEARTBEAT_SEC: f64 = 5.0;
pub const DEFAULT_EXECUTOR: &str = "SequentialExecutor";
pub const DEFAULT_MAX_TIS_PER_QUERY: usize = 512;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings every job copies at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    /// Default heartrate for jobs that do not override it
    pub heartrate: Duration,
    /// Executor name recorded when no executor is passed explicitly
    pub executor: String,
    /// Batch size for auxiliary queries issued by job variants
    pub max_tis_per_query: usize,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            heartrate: Duration::from_secs_f64(DEFAULT_HEARTBEAT_SEC),
            executor: DEFAULT_EXECUTOR.to_string(),
            max_tis_per_query: DEFAULT_MAX_TIS_PER_QUERY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    core: CoreSection,
    scheduler: SchedulerSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CoreSection {
    executor: String,
}

impl Default for CoreSection {
    fn default() -> Self {
        Self { executor: DEFAULT_EXECUTOR.to_string() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SchedulerSection {
    job_heartbeat_sec: f64,
    max_tis_per_query: usize,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            job_heartbeat_sec: DEFAULT_HEARTBEAT_SEC,
            max_tis_per_query: DEFAULT_MAX_TIS_PER_QUERY,
        }
    }
}

impl JobSettings {
    /// Parse settings from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(text)?;
        Self::build(file.scheduler.job_heartbeat_sec, file.core.executor, file.scheduler.max_tis_per_query)
    }

    /// Read a TOML settings file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_toml_str(&text)
    }

    /// Defaults (or the file at `path`, if given), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// Apply `PULSE_JOB_HEARTBEAT_SEC`, `PULSE_EXECUTOR`, `PULSE_MAX_TIS_PER_QUERY`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let heartbeat_sec = match env_var("PULSE_JOB_HEARTBEAT_SEC") {
            Some(raw) => raw.parse::<f64>().map_err(|e| ConfigError::Invalid {
                key: "PULSE_JOB_HEARTBEAT_SEC",
                reason: e.to_string(),
            })?,
            None => self.heartrate.as_secs_f64(),
        };
        let executor = env_var("PULSE_EXECUTOR").unwrap_or(self.executor);
        let max_tis_per_query = match env_var("PULSE_MAX_TIS_PER_QUERY") {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "PULSE_MAX_TIS_PER_QUERY",
                reason: e.to_string(),
            })?,
            None => self.max_tis_per_query,
        };
        Self::build(heartbeat_sec, executor, max_tis_per_query)
    }

    fn build(heartbeat_sec: f64, executor: String, max_tis_per_query: usize) -> Result<Self, ConfigError> {
        if !heartbeat_sec.is_finite() || heartbeat_sec <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "job_heartbeat_sec",
                reason: format!("must be a positive number of seconds, got {heartbeat_sec}"),
            });
        }
        if max_tis_per_query == 0 {
            return Err(ConfigError::Invalid {
                key: "max_tis_per_query",
                reason: "must be at least 1".to_string(),
            });
        }
        if executor.trim().is_empty() {
            return Err(ConfigError::Invalid { key: "executor", reason: "must not be empty".to_string() });
        }
        Ok(Self {
            heartrate: Duration::from_secs_f64(heartbeat_sec),
            executor,
            max_tis_per_query,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
