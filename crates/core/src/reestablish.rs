// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Full session re-establishment.
//!
//! Used once lightweight reauth keeps failing. Steps, stopping at the first
//! success:
//! 1. Resolve the device identity
//! 2. Silent device-bound wake
//! 3. Interactive pairing: request an artifact, then poll until a human
//!    completes it or the wait budget runs out
//!
//! A successful path ends with a resync.

#[cfg(test)]
#[path = "reestablish_tests.rs"]
mod tests;

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::client::SessionClient;
use crate::context::EpisodeContext;
use crate::error::{Error, Result};
use crate::escalation::EscalationTracker;
use crate::identity::DeviceIdentity;
use crate::policy::RetryPolicy;
use crate::resync::ResyncEngine;
use crate::state::{Session, PHASE_REESTABLISHING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReestablishResult {
    Success,
    /// Nobody completed pairing within the wait budget.
    Timeout,
    Failure(Error),
}

/// How the session came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    Wake,
    Pairing,
}

#[derive(Debug, Clone, Copy)]
pub struct FullReestablishController {
    poll_interval: Duration,
    poll_count: u64,
    max_wait: Duration,
    tracker: EscalationTracker,
    resync: ResyncEngine,
}

impl FullReestablishController {
    pub fn new(policy: &RetryPolicy, tracker: EscalationTracker, resync: ResyncEngine) -> Self {
        FullReestablishController {
            poll_interval: policy.poll_interval(),
            poll_count: policy.pairing_poll_count(),
            max_wait: policy.max_wait(),
            tracker,
            resync,
        }
    }

    /// Re-creates the session. Never propagates a transport error.
    pub async fn reestablish<C: SessionClient + ?Sized>(
        &self,
        ctx: &EpisodeContext<'_, C>,
        session: &mut Session,
    ) -> ReestablishResult {
        ctx.status.set_phase(PHASE_REESTABLISHING);
        tracing::warn!(
            consecutive_failures = session.state.consecutive_failures,
            "starting full re-establishment"
        );

        match self.recover(ctx, session).await {
            Ok(how) => {
                if let Some(id) = ctx.client.current_identity().filter(|id| !id.is_empty()) {
                    session.state.session_id = Some(id);
                }
                session.state.mark_recovered(Instant::now());
                self.tracker.reset(&mut session.state);
                ctx.status.record_reauth(Utc::now());
                ctx.status.sync_from(&session.state);
                tracing::info!(via = ?how, "full re-establishment succeeded");

                self.resync.sync(ctx, &mut session.cursors).await;
                ReestablishResult::Success
            }
            Err(Error::PairingTimeout { waited_secs }) => {
                tracing::error!(waited_secs, "pairing timed out, full re-establishment failed");
                ReestablishResult::Timeout
            }
            Err(Error::Cancelled) => {
                tracing::info!("full re-establishment cancelled by shutdown");
                ReestablishResult::Failure(Error::Cancelled)
            }
            Err(e) => {
                tracing::error!(error = %e, "full re-establishment failed");
                ReestablishResult::Failure(e)
            }
        }
    }

    async fn recover<C: SessionClient + ?Sized>(
        &self,
        ctx: &EpisodeContext<'_, C>,
        session: &mut Session,
    ) -> Result<Recovery> {
        let session_id = ctx.client.current_identity().unwrap_or_default();
        let device = session.device.resolve(ctx, &session_id).await?;

        if session_id.is_empty() {
            tracing::info!("no session identity to wake, going straight to pairing");
        } else {
            match ctx.call(ctx.client.silent_wake(&session_id)).await {
                Ok(true) => return Ok(Recovery::Wake),
                Ok(false) => tracing::info!("silent wake declined, falling back to pairing"),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => tracing::warn!("silent wake failed, falling back to pairing: {}", e),
            }
        }

        self.pair(ctx, &device).await?;
        Ok(Recovery::Pairing)
    }

    /// Interactive pairing, polling at most `poll_count` times and never past
    /// `max_wait` of wall-clock time, however slow each poll is.
    async fn pair<C: SessionClient + ?Sized>(
        &self,
        ctx: &EpisodeContext<'_, C>,
        device: &DeviceIdentity,
    ) -> Result<()> {
        let artifact = ctx.call(ctx.client.request_pairing_artifact(device)).await?;
        if !artifact.is_usable() {
            return Err(Error::PairingUnavailable);
        }
        tracing::info!(url = %artifact.presentation_url, "scan to complete pairing: {}", artifact.presentation_url);

        let started = Instant::now();
        let deadline = started + self.max_wait;
        for poll in 1..=self.poll_count {
            let polled = tokio::time::timeout_at(
                deadline,
                ctx.call(ctx.client.poll_pairing_status(&artifact.token, &device.device_id)),
            )
            .await;
            let Ok(status) = polled else {
                break;
            };
            if status?.done {
                tracing::info!("pairing completed");
                return Ok(());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if poll == self.poll_count || remaining.is_zero() {
                break;
            }
            ctx.sleep(self.poll_interval.min(remaining)).await?;
            tracing::info!(
                "waiting for pairing... {}/{}s",
                started.elapsed().as_secs(),
                self.max_wait.as_secs()
            );
        }

        Err(Error::PairingTimeout { waited_secs: started.elapsed().as_secs() })
    }
}
