// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The keepalive controller.
//!
//! Owns the [`Session`] behind a single async mutex. Every hook that mutates
//! the session acquires that lock, so reauth, resync and full
//! re-establishment episodes never overlap. Status reads go through
//! [`SharedSessionStatus`] and never wait on the lock.

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::SessionClient;
use crate::context::EpisodeContext;
use crate::error::Result;
use crate::escalation::EscalationTracker;
use crate::monitor::{HealthStatus, SessionMonitor};
use crate::policy::{RetryPolicy, ScheduleConfig};
use crate::profile::ProtocolProfile;
use crate::reauth::{ReauthManager, ReauthResult};
use crate::reestablish::{FullReestablishController, ReestablishResult};
use crate::resync::ResyncEngine;
use crate::state::{Session, SharedSessionStatus, PHASE_IDLE};

/// Why a hook did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skipped {
    NotLoggedIn,
    ShuttingDown,
    /// Another episode holds the session lock.
    Busy,
    /// Degraded, but the last reauth is too recent.
    Cooldown,
}

/// Outcome of one routine or probe-triggered cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Set by health probes only.
    pub health: Option<HealthStatus>,
    pub reauth: Option<ReauthResult>,
    /// Set when the reauth failure escalated.
    pub reestablish: Option<ReestablishResult>,
    pub skipped: Option<Skipped>,
}

impl CycleReport {
    fn skipped(reason: Skipped) -> Self {
        CycleReport { skipped: Some(reason), ..Default::default() }
    }

    pub fn escalated(&self) -> bool {
        self.reestablish.is_some()
    }
}

pub struct Controller<C: SessionClient> {
    client: C,
    session: Mutex<Session>,
    status: SharedSessionStatus,
    cancel: CancellationToken,
    policy: RetryPolicy,
    schedule: ScheduleConfig,
    profile: ProtocolProfile,
    reauth: ReauthManager,
    reestablish: FullReestablishController,
    monitor: SessionMonitor,
}

impl<C: SessionClient> Controller<C> {
    /// Builds a controller, resolving the protocol profile once from the
    /// client's declared capability.
    pub fn new(client: C, policy: RetryPolicy, schedule: ScheduleConfig) -> Result<Self> {
        policy.validate()?;
        schedule.validate()?;

        let profile = ProtocolProfile::resolve(&client.capability());
        tracing::debug!(protocol = %profile.version, "resolved protocol profile");

        let tracker = EscalationTracker::new(policy.escalation_threshold);
        let resync = ResyncEngine::new(profile);
        Ok(Controller {
            reauth: ReauthManager::new(&policy, tracker, resync),
            reestablish: FullReestablishController::new(&policy, tracker, resync),
            monitor: SessionMonitor::new(&schedule),
            client,
            session: Mutex::new(Session::new()),
            status: SharedSessionStatus::new(),
            cancel: CancellationToken::new(),
            policy,
            schedule,
            profile,
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn status(&self) -> &SharedSessionStatus {
        &self.status
    }

    pub fn profile(&self) -> &ProtocolProfile {
        &self.profile
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_shutting_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the session is marked active. Waits for the session lock.
    pub async fn is_active(&self) -> bool {
        self.session.lock().await.state.is_active
    }

    fn context(&self) -> EpisodeContext<'_, C> {
        EpisodeContext::new(&self.client, &self.status, &self.cancel, self.policy.call_timeout())
    }

    fn logged_in(&self) -> bool {
        self.client.current_identity().is_some_and(|id| !id.is_empty())
    }

    /// Marks the session active and starts the cooldown clock.
    pub async fn on_enable(&self) {
        let mut session = self.session.lock().await;
        session.state.is_active = true;
        session.state.session_id = self.client.current_identity().filter(|id| !id.is_empty());
        session.state.last_reauth_at = Some(Instant::now());
        session.state.consecutive_failures = 0;
        self.status.sync_from(&session.state);
        self.status.set_phase(PHASE_IDLE);
        tracing::info!(
            routine_interval_secs = self.schedule.routine_reauth_interval_secs,
            probe_interval_secs = self.schedule.health_probe_interval_secs,
            "session keepalive enabled"
        );
    }

    /// Scheduled reauth. Waits for any running episode to finish first.
    pub async fn routine_reauth(&self) -> CycleReport {
        if self.is_shutting_down() {
            return CycleReport::skipped(Skipped::ShuttingDown);
        }
        if !self.logged_in() {
            tracing::warn!("not logged in, skipping routine reauth");
            return CycleReport::skipped(Skipped::NotLoggedIn);
        }

        let mut session = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return CycleReport::skipped(Skipped::ShuttingDown),
            session = self.session.lock() => session,
        };
        tracing::info!("starting routine reauth");
        self.run_cycle(&mut session).await
    }

    /// Scheduled health probe.
    ///
    /// The probe itself runs without the session lock. A degraded session
    /// gets one out-of-band reauth cycle unless an episode is already running
    /// or the last reauth is within the cooldown.
    pub async fn health_probe(&self) -> CycleReport {
        if self.is_shutting_down() {
            return CycleReport::skipped(Skipped::ShuttingDown);
        }
        if !self.logged_in() {
            tracing::warn!("not logged in, skipping health probe");
            return CycleReport::skipped(Skipped::NotLoggedIn);
        }

        let health = self.monitor.probe(&self.context()).await;
        let mut report = CycleReport { health: Some(health), ..Default::default() };
        if health == HealthStatus::Healthy {
            return report;
        }
        if self.is_shutting_down() {
            report.skipped = Some(Skipped::ShuttingDown);
            return report;
        }

        let Ok(mut session) = self.session.try_lock() else {
            tracing::info!("session degraded but an episode is already running");
            report.skipped = Some(Skipped::Busy);
            return report;
        };
        if !self.monitor.should_reauth(&session.state, Instant::now()) {
            tracing::info!(
                cooldown_secs = self.monitor.cooldown().as_secs(),
                "session degraded but last reauth is within the cooldown"
            );
            report.skipped = Some(Skipped::Cooldown);
            return report;
        }

        tracing::info!("session degraded, attempting out-of-band reauth");
        let cycle = self.run_cycle(&mut session).await;
        CycleReport { health: Some(health), ..cycle }
    }

    /// Reauth, escalating to full re-establishment at the threshold.
    async fn run_cycle(&self, session: &mut Session) -> CycleReport {
        let ctx = self.context();
        let reauth = self.reauth.attempt(&ctx, session).await;

        let reestablish = if reauth.should_escalate() {
            tracing::warn!(
                consecutive_failures = session.state.consecutive_failures,
                "too many consecutive reauth failures, escalating"
            );
            Some(self.reestablish.reestablish(&ctx, session).await)
        } else {
            None
        };

        self.status.set_phase(PHASE_IDLE);
        self.status.sync_from(&session.state);
        tracing::debug!(status = %self.status.status_string(), "cycle finished");

        CycleReport { reauth: Some(reauth), reestablish, ..Default::default() }
    }

    /// Cancels in-flight episodes and marks the session inactive.
    ///
    /// Returns once any running episode has observed the cancellation.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut session = self.session.lock().await;
        session.state.is_active = false;
        self.status.set_phase(PHASE_IDLE);
        tracing::info!(status = %self.status.status_string(), "session keepalive stopped");
    }
}
