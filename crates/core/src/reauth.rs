// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lightweight reauthentication with bounded retries.

#[cfg(test)]
#[path = "reauth_tests.rs"]
mod tests;

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::client::SessionClient;
use crate::context::EpisodeContext;
use crate::error::Error;
use crate::escalation::{EscalationDecision, EscalationTracker};
use crate::policy::RetryPolicy;
use crate::resync::ResyncEngine;
use crate::state::{Session, PHASE_REAUTHENTICATING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReauthResult {
    Success,
    Failure {
        error: Error,
        /// What the escalation tracker decided after recording this failure.
        escalation: EscalationDecision,
    },
}

impl ReauthResult {
    fn not_counted(error: Error) -> Self {
        ReauthResult::Failure { error, escalation: EscalationDecision::Continue }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ReauthResult::Success)
    }

    pub fn should_escalate(&self) -> bool {
        matches!(self, ReauthResult::Failure { escalation: EscalationDecision::Escalate, .. })
    }
}

/// Performs one reauth attempt: up to `max_attempts` lightweight calls.
#[derive(Debug, Clone, Copy)]
pub struct ReauthManager {
    max_attempts: u32,
    retry_delay: Duration,
    tracker: EscalationTracker,
    resync: ResyncEngine,
}

impl ReauthManager {
    pub fn new(policy: &RetryPolicy, tracker: EscalationTracker, resync: ResyncEngine) -> Self {
        ReauthManager {
            max_attempts: policy.max_reauth_attempts,
            retry_delay: policy.reauth_retry_delay(),
            tracker,
            resync,
        }
    }

    /// Refreshes the session, resyncing on success.
    ///
    /// Sleeps `retry_delay` between failed calls but not after the last one.
    /// Only a terminal failure counts toward escalation; a missing identity or
    /// shutdown does not.
    pub async fn attempt<C: SessionClient + ?Sized>(
        &self,
        ctx: &EpisodeContext<'_, C>,
        session: &mut Session,
    ) -> ReauthResult {
        let Some(session_id) = ctx.client.current_identity().filter(|id| !id.is_empty()) else {
            tracing::warn!("not logged in, cannot reauthenticate");
            return ReauthResult::not_counted(Error::NotLoggedIn);
        };
        session.state.session_id = Some(session_id.clone());
        ctx.status.set_phase(PHASE_REAUTHENTICATING);

        let mut last_error = Error::AuthRejected;
        for attempt in 1..=self.max_attempts {
            match ctx.call(ctx.client.lightweight_reauth(&session_id)).await {
                Ok(true) => {
                    session.state.mark_recovered(Instant::now());
                    self.tracker.record_outcome(&mut session.state, true);
                    ctx.status.record_reauth(Utc::now());
                    ctx.status.sync_from(&session.state);
                    tracing::info!(attempt, "lightweight reauth succeeded");

                    self.resync.sync(ctx, &mut session.cursors).await;
                    return ReauthResult::Success;
                }
                Ok(false) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        "lightweight reauth returned an empty result"
                    );
                    last_error = Error::AuthRejected;
                }
                Err(e) if !e.is_retryable() => return ReauthResult::not_counted(e),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "lightweight reauth failed"
                    );
                    last_error = e;
                }
            }

            if attempt < self.max_attempts {
                if let Err(e) = ctx.sleep(self.retry_delay).await {
                    return ReauthResult::not_counted(e);
                }
            }
        }

        let escalation = self.tracker.record_outcome(&mut session.state, false);
        ctx.status.sync_from(&session.state);
        tracing::warn!(
            consecutive_failures = session.state.consecutive_failures,
            error = %last_error,
            "lightweight reauth gave up after {} attempts",
            self.max_attempts
        );
        ReauthResult::Failure { error: last_error, escalation }
    }
}
