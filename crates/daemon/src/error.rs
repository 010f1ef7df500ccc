// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors that stop the daemon from starting or running.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("another tetherd instance is already running\n  hint: check {0}")]
    AlreadyRunning(String),

    #[error("failed to build http client: {0}")]
    Http(String),

    #[error(transparent)]
    Core(#[from] tether_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
