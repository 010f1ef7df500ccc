// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance guard: an exclusive lock file plus a PID file.

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Error, Result};

/// PID filename within the state directory.
pub const PID_NAME: &str = "tetherd.pid";
/// Lock filename for single instance guarantee.
pub const LOCK_NAME: &str = "tetherd.lock";

/// Held for the daemon's lifetime. Dropping it removes the PID file and
/// releases the lock.
#[derive(Debug)]
pub struct InstanceGuard {
    _lock_file: fs::File,
    pid_path: PathBuf,
}

impl InstanceGuard {
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir)?;

        let lock_path = state_dir.join(LOCK_NAME);
        let lock_file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| Error::AlreadyRunning(lock_path.display().to_string()))?;

        let pid_path = state_dir.join(PID_NAME);
        fs::write(&pid_path, format!("{}", std::process::id()))?;

        Ok(InstanceGuard { _lock_file: lock_file, pid_path })
    }

    pub fn pid_path(&self) -> &Path {
        &self.pid_path
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.pid_path);
    }
}
