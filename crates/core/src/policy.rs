// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry, escalation and scheduling policy.
//!
//! Both structs deserialize from the `[policy]` and `[schedule]` tables of the
//! daemon's `config.toml`. Missing fields take the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bounds for reauthentication retries and full re-establishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Lightweight reauth calls per attempt (default: 3).
    #[serde(default = "default_max_reauth_attempts")]
    pub max_reauth_attempts: u32,
    /// Delay between lightweight reauth calls in seconds (default: 60).
    #[serde(default = "default_reauth_retry_delay_secs")]
    pub reauth_retry_delay_secs: u64,
    /// Consecutive failed attempts before full re-establishment (default: 3).
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u32,
    /// Pairing status poll interval in seconds (default: 5).
    #[serde(default = "default_poll_interval_secs")]
    pub full_reestablish_poll_interval_secs: u64,
    /// Total pairing wait budget in seconds (default: 300).
    #[serde(default = "default_max_wait_secs")]
    pub full_reestablish_max_wait_secs: u64,
    /// Upper bound for any single backend call in seconds (default: 30).
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_max_reauth_attempts() -> u32 {
    3
}

fn default_reauth_retry_delay_secs() -> u64 {
    60
}

fn default_escalation_threshold() -> u32 {
    3
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_wait_secs() -> u64 {
    300
}

fn default_call_timeout_secs() -> u64 {
    30
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_reauth_attempts: default_max_reauth_attempts(),
            reauth_retry_delay_secs: default_reauth_retry_delay_secs(),
            escalation_threshold: default_escalation_threshold(),
            full_reestablish_poll_interval_secs: default_poll_interval_secs(),
            full_reestablish_max_wait_secs: default_max_wait_secs(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl RetryPolicy {
    pub fn reauth_retry_delay(&self) -> Duration {
        Duration::from_secs(self.reauth_retry_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.full_reestablish_poll_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.full_reestablish_max_wait_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Number of pairing status polls that fit in the wait budget.
    ///
    /// `ceil(max_wait / poll_interval)`; at least one poll is always made.
    pub fn pairing_poll_count(&self) -> u64 {
        let interval = self.full_reestablish_poll_interval_secs.max(1);
        self.full_reestablish_max_wait_secs.div_ceil(interval).max(1)
    }

    /// Rejects policies that would make the controller spin or never escalate.
    pub fn validate(&self) -> Result<()> {
        if self.max_reauth_attempts == 0 {
            return Err(Error::InvalidPolicy("max_reauth_attempts must be at least 1".into()));
        }
        if self.escalation_threshold == 0 {
            return Err(Error::InvalidPolicy("escalation_threshold must be at least 1".into()));
        }
        if self.full_reestablish_poll_interval_secs == 0 {
            return Err(Error::InvalidPolicy(
                "full_reestablish_poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.full_reestablish_max_wait_secs < self.full_reestablish_poll_interval_secs {
            return Err(Error::InvalidPolicy(format!(
                "full_reestablish_max_wait_secs ({}) is shorter than one poll interval ({})",
                self.full_reestablish_max_wait_secs, self.full_reestablish_poll_interval_secs
            )));
        }
        if self.call_timeout_secs == 0 {
            return Err(Error::InvalidPolicy("call_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

/// Intervals for the two periodic triggers and the probe cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Routine reauth interval in seconds (default: 7200).
    #[serde(default = "default_routine_reauth_interval_secs")]
    pub routine_reauth_interval_secs: u64,
    /// Health probe interval in seconds (default: 300).
    #[serde(default = "default_health_probe_interval_secs")]
    pub health_probe_interval_secs: u64,
    /// Minimum time since the last reauth before a degraded probe may
    /// trigger another one, in seconds (default: 600).
    #[serde(default = "default_degraded_reauth_cooldown_secs")]
    pub degraded_reauth_cooldown_secs: u64,
}

fn default_routine_reauth_interval_secs() -> u64 {
    7200
}

fn default_health_probe_interval_secs() -> u64 {
    300
}

fn default_degraded_reauth_cooldown_secs() -> u64 {
    600
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            routine_reauth_interval_secs: default_routine_reauth_interval_secs(),
            health_probe_interval_secs: default_health_probe_interval_secs(),
            degraded_reauth_cooldown_secs: default_degraded_reauth_cooldown_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn routine_reauth_interval(&self) -> Duration {
        Duration::from_secs(self.routine_reauth_interval_secs)
    }

    pub fn health_probe_interval(&self) -> Duration {
        Duration::from_secs(self.health_probe_interval_secs)
    }

    pub fn degraded_reauth_cooldown(&self) -> Duration {
        Duration::from_secs(self.degraded_reauth_cooldown_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.routine_reauth_interval_secs == 0 || self.health_probe_interval_secs == 0 {
            return Err(Error::InvalidPolicy("trigger intervals must be at least 1 second".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
