// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file (`uld.toml`)
//!
//! ```toml
//! [paths]
//! state_file = "state.json"
//! brokers_dir = "brokers"
//! log_file = "uld.log"
//! lock_file = "uld.pid"
//!
//! [execution]
//! interval_between_same_broker_operations = "2s"
//!
//! [runner]
//! scan = "scan-broker {broker_url} {profile_query}"
//! opt_out = "opt-out {broker_url} {extracted_profile_id}"
//!
//! [agent]
//! entitled = true
//! ```
//!
//! Every section is optional. Relative paths resolve against the
//! directory holding the config file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use ul_adapters::ShellCommands;
use ul_core::{ExecutionConfig, ExecutionMode};

pub const DEFAULT_CONFIG_FILE: &str = "uld.toml";

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
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub state_file: PathBuf,
    pub brokers_dir: PathBuf,
    pub log_file: PathBuf,
    pub lock_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("state.json"),
            brokers_dir: PathBuf::from("brokers"),
            log_file: PathBuf::from("uld.log"),
            lock_file: PathBuf::from("uld.pid"),
        }
    }
}

/// Shell templates for the two step kinds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    pub scan: String,
    pub opt_out: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scan: "echo 0".to_string(),
            opt_out: "true".to_string(),
        }
    }
}

impl From<RunnerConfig> for ShellCommands {
    fn from(runner: RunnerConfig) -> Self {
        ShellCommands {
            scan: runner.scan,
            opt_out: runner.opt_out,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Subscription lets scheduled runs opt out as well as scan
    pub entitled: bool,
    /// Version compared against the last broker-definition check
    pub app_version: String,
    pub show_ui: bool,
    /// Timing profile used when `[execution]` is absent
    pub mode: ExecutionMode,
    /// Load `fake*` broker definitions as well
    pub include_fake_brokers: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            entitled: false,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            show_ui: false,
            mode: ExecutionMode::Normal,
            include_fake_brokers: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    pub paths: PathsConfig,
    pub execution: Option<ExecutionConfig>,
    pub runner: RunnerConfig,
    pub agent: AgentConfig,
}

impl DaemonConfig {
    /// Load and resolve paths against the file's directory
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve(base))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn resolve(mut self, base: &Path) -> Self {
        for path in [
            &mut self.paths.state_file,
            &mut self.paths.brokers_dir,
            &mut self.paths.log_file,
            &mut self.paths.lock_file,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// The explicit `[execution]` section, or the mode's profile
    pub fn execution_config(&self) -> ExecutionConfig {
        self.execution
            .clone()
            .unwrap_or_else(|| ExecutionConfig::for_mode(self.agent.mode))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
