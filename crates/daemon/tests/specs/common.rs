// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Backend that nothing listens on. The daemon only calls it on the first
/// trigger tick, which no spec waits for.
pub const UNUSED_BACKEND: &str = "http://127.0.0.1:9";

pub fn tetherd() -> Command {
    let mut cmd = Command::new(tetherd_path());
    cmd.env_remove("TETHER_CONFIG").env_remove("TETHER_STATE_DIR");
    cmd
}

pub fn tetherd_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tetherd"))
}

/// Writes `config.toml` into `temp` and returns its path.
pub fn write_config(temp: &TempDir, content: &str) -> PathBuf {
    let path = temp.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

/// A valid config pointing at [`UNUSED_BACKEND`].
pub fn idle_config(temp: &TempDir) -> PathBuf {
    write_config(
        temp,
        &format!("[backend]\nurl = \"{}\"\nsession_id = \"wxid_spec\"\n", UNUSED_BACKEND),
    )
}

/// Polls `check` until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    check()
}

pub fn send_sigterm(pid: u32) {
    let status = std::process::Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .status()
        .unwrap();
    assert!(status.success(), "kill -TERM {} failed", pid);
}

pub fn read_log(state_dir: &Path) -> String {
    std::fs::read_to_string(state_dir.join("tetherd.log")).unwrap_or_default()
}
