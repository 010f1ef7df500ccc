// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config loading failures surface before the daemon starts.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;
use yare::parameterized;

#[test]
fn missing_explicit_config_fails() {
    let temp = TempDir::new().unwrap();

    tetherd()
        .arg("--state-dir")
        .arg(temp.path().join("state"))
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn missing_config_from_env_fails() {
    let temp = TempDir::new().unwrap();

    tetherd()
        .env("TETHER_CONFIG", temp.path().join("missing.toml"))
        .arg("--state-dir")
        .arg(temp.path().join("state"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[parameterized(
    zero_attempts = { "[policy]\nmax_reauth_attempts = 0", "invalid policy" },
    zero_threshold = { "[policy]\nescalation_threshold = 0", "invalid policy" },
    bad_url = { "[backend]\nurl = \"not a url\"", "invalid backend url" },
    malformed = { "[policy\n", "failed to parse" },
)]
fn invalid_config_fails(content: &str, message: &str) {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, content);

    tetherd()
        .arg("--state-dir")
        .arg(temp.path().join("state"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
}

#[test]
fn config_errors_leave_no_pid_file() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let config = write_config(&temp, "[policy]\nmax_reauth_attempts = 0");

    tetherd()
        .arg("--state-dir")
        .arg(&state_dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();

    assert!(!state_dir.join("tetherd.pid").exists());
}
