// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Catch-up sync after the session was degraded.
//!
//! Modern backends get a versioned catch-up seeded with the cursor, falling
//! back to the simple whole-sync call on any error. Everything else goes
//! straight to the simple call.

#[cfg(test)]
#[path = "resync_tests.rs"]
mod tests;

use crate::client::SessionClient;
use crate::context::EpisodeContext;
use crate::cursor::{SyncCursor, SyncCursorStore};
use crate::error::{Error, Result};
use crate::profile::{ProtocolProfile, SyncEndpointStyle};
use crate::state::PHASE_RESYNCING;

/// Versioned catch-up calls per episode: the seeded call plus one extra round.
pub const MAX_CATCHUP_ROUNDS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResult {
    Complete,
    Failed,
    /// Shutdown interrupted the episode; the cursor was left untouched.
    Abandoned,
}

/// Performs protocol-specific resynchronization.
#[derive(Debug, Clone, Copy)]
pub struct ResyncEngine {
    profile: ProtocolProfile,
}

impl ResyncEngine {
    pub fn new(profile: ProtocolProfile) -> Self {
        ResyncEngine { profile }
    }

    pub fn profile(&self) -> &ProtocolProfile {
        &self.profile
    }

    /// Runs one resync episode.
    ///
    /// Callers must hold the session lock; that is what keeps episodes for
    /// the same session from overlapping. A failed resync is logged and
    /// reported but never counts as an auth failure.
    pub async fn sync<C: SessionClient + ?Sized>(
        &self,
        ctx: &EpisodeContext<'_, C>,
        cursors: &mut SyncCursorStore,
    ) -> SyncResult {
        ctx.status.set_phase(PHASE_RESYNCING);
        tracing::debug!(protocol = %self.profile.version, "starting resync");

        if self.profile.sync_style == SyncEndpointStyle::Versioned {
            match self.catchup(ctx, cursors.begin_episode()).await {
                Ok(cursor) => {
                    cursors.commit(cursor);
                    tracing::info!("versioned catch-up complete");
                    return SyncResult::Complete;
                }
                Err(Error::Cancelled) => return SyncResult::Abandoned,
                Err(e) => {
                    tracing::warn!("versioned catch-up failed, falling back to simple sync: {}", e);
                }
            }
        }

        match self.simple(ctx).await {
            Ok(()) => SyncResult::Complete,
            Err(Error::Cancelled) => SyncResult::Abandoned,
            Err(e) => {
                tracing::warn!(error = %e, "{}", Error::ResyncFailed);
                SyncResult::Failed
            }
        }
    }

    /// Versioned catch-up, bounded to [`MAX_CATCHUP_ROUNDS`] calls.
    ///
    /// Returns the staged cursor; nothing is committed here.
    async fn catchup<C: SessionClient + ?Sized>(
        &self,
        ctx: &EpisodeContext<'_, C>,
        mut cursor: SyncCursor,
    ) -> Result<SyncCursor> {
        for round in 1..=MAX_CATCHUP_ROUNDS {
            let result = ctx
                .call(ctx.client.versioned_catchup(&cursor.max_key, &cursor.current_key))
                .await?
                .ok_or_else(|| {
                    Error::TransientTransport("versioned catch-up returned no result".into())
                })?;
            cursor.advance(&result);

            if !result.continue_pending {
                return Ok(cursor);
            }
            if round == MAX_CATCHUP_ROUNDS {
                tracing::warn!(
                    rounds = round,
                    "backend still reports pending events, next episode resumes from the cursor"
                );
            } else {
                tracing::info!("backend reports pending events, continuing catch-up");
            }
        }
        Ok(cursor)
    }

    async fn simple<C: SessionClient + ?Sized>(&self, ctx: &EpisodeContext<'_, C>) -> Result<()> {
        let report = ctx.call(ctx.client.simple_sync()).await?;
        if report.ok {
            tracing::info!("simple sync complete");
            Ok(())
        } else {
            Err(Error::TransientTransport(format!("simple sync refused: {}", report.payload)))
        }
    }
}
