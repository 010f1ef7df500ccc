// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session state owned by the controller.
//!
//! [`SessionState`] is only ever touched while holding the controller's
//! session lock. [`SharedSessionStatus`] mirrors the parts worth reporting in
//! atomics, so status reads never wait on an episode.

use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::cursor::SyncCursorStore;
use crate::identity::DeviceIdentityCache;

/// Everything guarded by the session lock.
///
/// Reauth, resync and full re-establishment all need `&mut Session`, so
/// holding the lock serializes them.
#[derive(Debug, Default)]
pub struct Session {
    pub state: SessionState,
    pub cursors: SyncCursorStore,
    pub device: DeviceIdentityCache,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mutable state of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Set once the client reports an identity.
    pub session_id: Option<String>,
    pub is_active: bool,
    /// Time of the last successful reauth or re-establishment.
    pub last_reauth_at: Option<Instant>,
    pub consecutive_failures: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful recovery at `now`.
    pub fn mark_recovered(&mut self, now: Instant) {
        self.last_reauth_at = Some(now);
        self.consecutive_failures = 0;
    }

    /// Whether more than `cooldown` has passed since the last reauth.
    ///
    /// A session that never reauthenticated is always past its cooldown.
    pub fn cooldown_elapsed(&self, now: Instant, cooldown: std::time::Duration) -> bool {
        match self.last_reauth_at {
            Some(last) => now.saturating_duration_since(last) > cooldown,
            None => true,
        }
    }
}

/// Phase values for the atomic phase field.
pub const PHASE_IDLE: u8 = 0;
pub const PHASE_REAUTHENTICATING: u8 = 1;
pub const PHASE_REESTABLISHING: u8 = 2;
pub const PHASE_RESYNCING: u8 = 3;

/// Lock-free snapshot of session health for logging.
pub struct SharedSessionStatus {
    phase: AtomicU8,
    consecutive_failures: AtomicU32,
    /// Unix millis of the last successful reauth, 0 if none.
    last_reauth_ms: AtomicI64,
}

impl SharedSessionStatus {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(PHASE_IDLE),
            consecutive_failures: AtomicU32::new(0),
            last_reauth_ms: AtomicI64::new(0),
        }
    }

    pub fn phase(&self) -> u8 {
        self.phase.load(Ordering::Acquire)
    }

    pub fn set_phase(&self, phase: u8) {
        self.phase.store(phase, Ordering::Release);
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    pub fn set_consecutive_failures(&self, failures: u32) {
        self.consecutive_failures.store(failures, Ordering::Release);
    }

    pub fn last_reauth(&self) -> Option<DateTime<Utc>> {
        match self.last_reauth_ms.load(Ordering::Acquire) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    pub fn record_reauth(&self, at: DateTime<Utc>) {
        self.last_reauth_ms.store(at.timestamp_millis(), Ordering::Release);
    }

    /// Copy the reportable fields of `state`.
    pub fn sync_from(&self, state: &SessionState) {
        self.set_consecutive_failures(state.consecutive_failures);
    }

    pub fn status_string(&self) -> String {
        let phase = match self.phase() {
            PHASE_IDLE => "idle",
            PHASE_REAUTHENTICATING => "reauthenticating",
            PHASE_REESTABLISHING => "reestablishing",
            PHASE_RESYNCING => "resyncing",
            _ => "unknown",
        };
        let failures = self.consecutive_failures();
        match self.last_reauth() {
            Some(at) => format!(
                "{} (failures: {}, last reauth: {})",
                phase,
                failures,
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => format!("{} (failures: {}, never reauthenticated)", phase, failures),
        }
    }
}

impl Default for SharedSessionStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
