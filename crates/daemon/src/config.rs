// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Stored as TOML with three sections:
//! - `[backend]`: where the messaging backend lives and what it speaks
//! - `[policy]`: retry and escalation policy
//! - `[schedule]`: trigger intervals and the probe cooldown

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tether_core::{ClientCapability, RetryPolicy, ScheduleConfig};

use crate::env;
use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "tether";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub policy: RetryPolicy,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Connection settings for the messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL without the API path prefix (default: "http://127.0.0.1:9000").
    #[serde(default = "default_url")]
    pub url: String,
    /// Backend protocol version. 849 selects the modern protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<u32>,
    /// API path prefix, e.g. "/VXAPI". Derived from the protocol when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_prefix: Option<String>,
    /// Session id to start with, if already logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Per-request HTTP timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: default_url(),
            protocol_version: None,
            api_path_prefix: None,
            session_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn capability(&self) -> ClientCapability {
        ClientCapability {
            protocol_version: self.protocol_version,
            api_path_prefix: self.api_path_prefix.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from an explicit path, `TETHER_CONFIG`, or the default location.
    ///
    /// An explicit or env-provided path must exist. A missing file at the
    /// default location yields the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit.map(Path::to_path_buf).or_else(env::config_path) {
            return Self::load(&path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::debug!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        self.schedule.validate()?;
        if reqwest::Url::parse(&self.backend.url).is_err() {
            return Err(Error::Config(format!("invalid backend url '{}'", self.backend.url)));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

/// `<config_dir>/tether/config.toml`, if a config dir exists on this platform.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
