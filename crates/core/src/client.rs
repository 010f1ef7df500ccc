// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session client abstraction.
//!
//! The controller never talks to the messaging backend directly. It consumes a
//! [`SessionClient`], which allows:
//! - An HTTP client in the daemon
//! - Scripted mock clients for unit testing
//!
//! The client is shared by every component and treated as stateless from the
//! controller's point of view.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Error};
use crate::identity::DeviceIdentity;

/// Result type for session client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Boxed future returned by [`SessionClient`] methods.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = ClientResult<T>> + Send + 'a>>;

/// Protocol information a client declares about its backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientCapability {
    /// Backend protocol version, if the client knows it.
    pub protocol_version: Option<u32>,
    /// API path prefix the client was configured with, if any.
    pub api_path_prefix: Option<String>,
}

/// Identity-confirming profile returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
}

/// Outcome of the simple whole-sync call.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub ok: bool,
    pub payload: serde_json::Value,
}

/// Response of one versioned catch-up round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchupResult {
    /// The backend holds more events than this round returned.
    pub continue_pending: bool,
    pub current_key: String,
    pub max_key: String,
}

/// Token/URL pair a human uses to complete interactive pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingArtifact {
    pub token: String,
    pub presentation_url: String,
}

impl PairingArtifact {
    pub fn is_usable(&self) -> bool {
        !self.token.is_empty() && !self.presentation_url.is_empty()
    }
}

/// Result of one pairing status poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PairingStatus {
    pub done: bool,
    pub payload: serde_json::Value,
}

/// Capability interface over the messaging backend.
pub trait SessionClient: Send + Sync {
    /// Protocol information used to resolve the [`ProtocolProfile`](crate::ProtocolProfile).
    fn capability(&self) -> ClientCapability;

    /// The active session id, or `None` when not logged in.
    fn current_identity(&self) -> Option<String>;

    /// Lightweight identity-confirming read.
    fn fetch_profile(&self) -> ClientFuture<'_, Option<Profile>>;

    /// Refresh an existing session without re-pairing.
    fn lightweight_reauth<'a>(&'a self, session_id: &'a str) -> ClientFuture<'a, bool>;

    /// Whole-sync call understood by every protocol version.
    fn simple_sync(&self) -> ClientFuture<'_, SyncReport>;

    /// Versioned catch-up seeded with a cursor. `None` means the call failed.
    fn versioned_catchup<'a>(
        &'a self,
        max_key: &'a str,
        current_key: &'a str,
    ) -> ClientFuture<'a, Option<CatchupResult>>;

    /// Device-bound wake of an evicted session.
    fn silent_wake<'a>(&'a self, session_id: &'a str) -> ClientFuture<'a, bool>;

    /// Request an interactive pairing artifact bound to a device.
    fn request_pairing_artifact<'a>(
        &'a self,
        device: &'a DeviceIdentity,
    ) -> ClientFuture<'a, PairingArtifact>;

    /// Check whether the human completed pairing.
    fn poll_pairing_status<'a>(
        &'a self,
        token: &'a str,
        device_id: &'a str,
    ) -> ClientFuture<'a, PairingStatus>;

    fn create_device_id(&self) -> String;

    fn create_device_name(&self) -> String;

    /// Device previously bound to `session_id`, if the client remembers one.
    fn cached_device<'a>(&'a self, _session_id: &'a str) -> ClientFuture<'a, Option<DeviceIdentity>> {
        Box::pin(async { Ok(None) })
    }
}

/// Runs a client call under `limit`, converting every failure to [`Error`].
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, Error>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Error::from),
        Err(_) => Err(ClientError::Timeout(limit.as_secs()).into()),
    }
}
