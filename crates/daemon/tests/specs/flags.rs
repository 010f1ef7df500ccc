// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line flag specs.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;
use yare::parameterized;

#[parameterized(
    long_version = { "--version" },
    short_version = { "-V" },
)]
fn version_flag_outputs_version(flag: &str) {
    tetherd()
        .arg(flag)
        .assert()
        .success()
        .stdout(predicate::str::contains("tetherd"))
        .stdout(predicate::str::is_match(r"[0-9]+\.[0-9]+\.[0-9]+").unwrap());
}

#[parameterized(
    config = { "--config" },
    state_dir = { "--state-dir" },
    verbose = { "--verbose" },
)]
fn help_documents_flag(flag: &str) {
    tetherd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(flag));
}

#[test]
fn unknown_flag_is_rejected() {
    tetherd()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bogus"));
}
