// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Device identity used by full re-establishment.
//!
//! The identity is created lazily the first time it is needed and cached for
//! the lifetime of the process. Persisting it across restarts is the session
//! client's business.

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;

use serde::{Deserialize, Serialize};

use crate::client::SessionClient;
use crate::context::EpisodeContext;
use crate::error::{Error, Result};

/// Stable device fingerprint presented during wake and pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub device_name: String,
}

impl DeviceIdentity {
    pub fn new(device_id: impl Into<String>, device_name: impl Into<String>) -> Self {
        DeviceIdentity { device_id: device_id.into(), device_name: device_name.into() }
    }
}

/// Process-lifetime cache for the [`DeviceIdentity`].
#[derive(Debug, Default)]
pub struct DeviceIdentityCache {
    identity: Option<DeviceIdentity>,
}

impl DeviceIdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&DeviceIdentity> {
        self.identity.as_ref()
    }

    /// Returns the cached identity, creating one if absent.
    ///
    /// Resolution order:
    /// 1. The cached identity
    /// 2. The device the client remembers for `session_id`
    /// 3. A fresh id/name pair from the client
    ///
    /// Fields missing from the client's remembered device are filled
    /// individually. A failed lookup is logged and treated as absent, except
    /// on shutdown, which returns [`Error::Cancelled`] and leaves the cache
    /// empty.
    pub async fn resolve<C: SessionClient + ?Sized>(
        &mut self,
        ctx: &EpisodeContext<'_, C>,
        session_id: &str,
    ) -> Result<DeviceIdentity> {
        if let Some(identity) = &self.identity {
            return Ok(identity.clone());
        }

        let client = ctx.client;
        let remembered = match ctx.call(client.cached_device(session_id)).await {
            Ok(device) => device,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                tracing::warn!("cached device lookup failed: {}", e);
                None
            }
        };

        let (mut device_id, mut device_name) = remembered
            .map(|d| (d.device_id, d.device_name))
            .unwrap_or_default();
        if device_name.is_empty() {
            device_name = client.create_device_name();
        }
        if device_id.is_empty() {
            device_id = client.create_device_id();
        }

        let identity = DeviceIdentity { device_id, device_name };
        tracing::debug!(device_id = %identity.device_id, "device identity resolved");
        self.identity = Some(identity.clone());
        Ok(identity)
    }
}
