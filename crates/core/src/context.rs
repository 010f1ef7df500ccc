// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-episode environment shared by the recovery components.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{bounded, ClientResult, SessionClient};
use crate::error::{Error, Result};
use crate::state::SharedSessionStatus;

/// What a recovery component needs besides the session itself.
///
/// Every backend call goes through [`call`](Self::call) and every wait
/// through [`sleep`](Self::sleep), so both observe the call timeout and
/// controller shutdown.
pub struct EpisodeContext<'a, C: SessionClient + ?Sized> {
    pub client: &'a C,
    pub status: &'a SharedSessionStatus,
    pub cancel: &'a CancellationToken,
    pub call_timeout: Duration,
}

impl<'a, C: SessionClient + ?Sized> EpisodeContext<'a, C> {
    pub fn new(
        client: &'a C,
        status: &'a SharedSessionStatus,
        cancel: &'a CancellationToken,
        call_timeout: Duration,
    ) -> Self {
        EpisodeContext { client, status, cancel, call_timeout }
    }

    /// Runs one backend call with the call timeout, aborting on shutdown.
    pub async fn call<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = bounded(self.call_timeout, call) => result,
        }
    }

    /// Waits for `delay`, returning early with [`Error::Cancelled`] on shutdown.
    pub async fn sleep(&self, delay: Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
