// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resynchronization cursor.
//!
//! An episode works on a staged copy of the cursor and commits it only when
//! the episode finishes, so an abandoned episode never leaves a half-advanced
//! cursor behind.

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;

use crate::client::CatchupResult;

/// Key pair used to resume incremental sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCursor {
    pub current_key: String,
    pub max_key: String,
    pub continue_pending: bool,
}

impl SyncCursor {
    /// Advance to the keys returned by a catch-up round.
    pub fn advance(&mut self, result: &CatchupResult) {
        self.current_key = result.current_key.clone();
        self.max_key = result.max_key.clone();
        self.continue_pending = result.continue_pending;
    }

    pub fn is_empty(&self) -> bool {
        self.current_key.is_empty() && self.max_key.is_empty()
    }
}

/// Holds the cursor committed by the most recent resync episode.
#[derive(Debug, Default)]
pub struct SyncCursorStore {
    committed: SyncCursor,
}

impl SyncCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> &SyncCursor {
        &self.committed
    }

    /// Cursor an episode starts from.
    ///
    /// Empty, unless the previous episode stopped with the backend still
    /// reporting pending events; then the episode resumes from those keys.
    pub fn begin_episode(&self) -> SyncCursor {
        if self.committed.continue_pending {
            self.committed.clone()
        } else {
            SyncCursor::default()
        }
    }

    pub fn commit(&mut self, cursor: SyncCursor) {
        self.committed = cursor;
    }

    pub fn reset(&mut self) {
        self.committed = SyncCursor::default();
    }
}
