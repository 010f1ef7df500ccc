// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for the `tetherd` binary, driven as a black box.

mod common;
mod config;
mod flags;
mod lifecycle;
