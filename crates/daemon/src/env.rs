// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the daemon.

use std::path::PathBuf;

/// Environment variable names read by the daemon.
pub mod names {
    /// Overrides the tether state directory.
    pub const TETHER_STATE_DIR: &str = "TETHER_STATE_DIR";
    /// Path to the daemon config file.
    pub const TETHER_CONFIG: &str = "TETHER_CONFIG";
    /// XDG base directory for state data.
    pub const XDG_STATE_HOME: &str = "XDG_STATE_HOME";
    /// Log level filter for tracing-subscriber.
    pub const RUST_LOG: &str = "RUST_LOG";
    /// Host name, used to label paired devices.
    pub const HOSTNAME: &str = "HOSTNAME";
}

/// Returns the value of `TETHER_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(names::TETHER_STATE_DIR).ok().map(PathBuf::from)
}

/// Returns the value of `TETHER_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(names::TETHER_CONFIG)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(names::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// Returns the value of `HOSTNAME` if set and non-empty.
pub fn hostname() -> Option<String> {
    std::env::var(names::HOSTNAME)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolves the state directory.
///
/// Order: the `--state-dir` flag, `TETHER_STATE_DIR`, `$XDG_STATE_HOME/tether`,
/// then `~/.local/state/tether`.
pub fn resolve_state_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(dir) = state_dir() {
        return dir;
    }
    if let Some(dir) = xdg_state_home() {
        return dir.join("tether");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/tether"))
        .unwrap_or_else(|| PathBuf::from(".local/state/tether"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
