// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic session health probe.

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;

use std::time::Duration;

use tokio::time::Instant;

use crate::client::SessionClient;
use crate::context::EpisodeContext;
use crate::policy::ScheduleConfig;
use crate::state::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Probes session health with a profile fetch.
#[derive(Debug, Clone, Copy)]
pub struct SessionMonitor {
    cooldown: Duration,
}

impl SessionMonitor {
    pub fn new(schedule: &ScheduleConfig) -> Self {
        SessionMonitor { cooldown: schedule.degraded_reauth_cooldown() }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// A missing profile or any error means `Degraded`.
    pub async fn probe<C: SessionClient + ?Sized>(&self, ctx: &EpisodeContext<'_, C>) -> HealthStatus {
        match ctx.call(ctx.client.fetch_profile()).await {
            Ok(Some(profile)) => {
                tracing::debug!(user = %profile.user_name, "session healthy");
                HealthStatus::Healthy
            }
            Ok(None) => {
                tracing::warn!("profile fetch returned nothing, session may be degraded");
                HealthStatus::Degraded
            }
            Err(e) => {
                tracing::warn!(error = %e, "health probe failed");
                HealthStatus::Degraded
            }
        }
    }

    /// Whether a degraded probe should trigger an out-of-band reauth.
    pub fn should_reauth(&self, state: &SessionState, now: Instant) -> bool {
        state.cooldown_elapsed(now, self.cooldown)
    }
}
