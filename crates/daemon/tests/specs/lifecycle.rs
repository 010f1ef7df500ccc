// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon start, single-instance lock and signal shutdown.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::{Child, Stdio};
use std::time::Duration;

use super::common::*;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

fn spawn_daemon(temp: &TempDir) -> Child {
    let config = idle_config(temp);
    std::process::Command::new(tetherd_path())
        .env_remove("TETHER_CONFIG")
        .arg("--state-dir")
        .arg(temp.path().join("state"))
        .arg("--config")
        .arg(config)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

/// Kills the daemon if a spec panics before stopping it.
struct DaemonGuard(Child);

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

#[test]
fn start_writes_pid_and_sigterm_cleans_up() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let mut daemon = DaemonGuard(spawn_daemon(&temp));
    let pid_path = state_dir.join("tetherd.pid");

    assert!(wait_for(STARTUP_TIMEOUT, || pid_path.exists()));
    let pid = std::fs::read_to_string(&pid_path).unwrap();
    assert_eq!(pid.trim(), daemon.0.id().to_string());
    assert!(wait_for(STARTUP_TIMEOUT, || read_log(&state_dir)
        .contains("session keepalive enabled")));

    send_sigterm(daemon.0.id());
    let status = daemon.0.wait().unwrap();

    assert!(status.success());
    assert!(!pid_path.exists());
    assert!(read_log(&state_dir).contains("tetherd stopped"));
}

#[test]
fn second_instance_is_refused() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let daemon = DaemonGuard(spawn_daemon(&temp));
    assert!(wait_for(STARTUP_TIMEOUT, || state_dir.join("tetherd.pid").exists()));

    tetherd()
        .arg("--state-dir")
        .arg(&state_dir)
        .arg("--config")
        .arg(temp.path().join("config.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("already running"));

    send_sigterm(daemon.0.id());
}

#[test]
fn verbose_logs_protocol_resolution() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let config = write_config(
        &temp,
        &format!("[backend]\nurl = \"{}\"\nprotocol_version = 849\n", UNUSED_BACKEND),
    );
    let daemon = std::process::Command::new(tetherd_path())
        .env_remove("TETHER_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--state-dir")
        .arg(&state_dir)
        .arg("--config")
        .arg(&config)
        .arg("--verbose")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut daemon = DaemonGuard(daemon);

    assert!(wait_for(STARTUP_TIMEOUT, || read_log(&state_dir)
        .contains("resolved protocol profile")));
    assert!(read_log(&state_dir).contains("modern-v2"));

    send_sigterm(daemon.0.id());
    daemon.0.wait().unwrap();
}
