// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-core: Session keepalive and resynchronization controller
//!
//! This crate keeps a long-lived backend session alive. It detects
//! degradation, retries lightweight reauthentication, escalates to full
//! re-establishment, and resynchronizes the event cursor afterward. The
//! backend itself is reached through the [`SessionClient`] trait.

pub mod client;
pub mod context;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod escalation;
pub mod identity;
pub mod monitor;
pub mod policy;
pub mod profile;
pub mod reauth;
pub mod reestablish;
pub mod resync;
pub mod scheduler;
pub mod state;

#[cfg(test)]
mod test_helpers;

pub use client::{
    CatchupResult, ClientCapability, ClientFuture, ClientResult, PairingArtifact, PairingStatus,
    Profile, SessionClient, SyncReport,
};
pub use controller::{Controller, CycleReport, Skipped};
pub use cursor::{SyncCursor, SyncCursorStore};
pub use error::{ClientError, Error, Result};
pub use escalation::{EscalationDecision, EscalationTracker};
pub use identity::{DeviceIdentity, DeviceIdentityCache};
pub use monitor::{HealthStatus, SessionMonitor};
pub use policy::{RetryPolicy, ScheduleConfig};
pub use profile::{ProtocolProfile, ProtocolVersion, SyncEndpointStyle};
pub use reauth::{ReauthManager, ReauthResult};
pub use reestablish::{FullReestablishController, ReestablishResult};
pub use resync::{ResyncEngine, SyncResult};
pub use scheduler::{Scheduler, Trigger};
pub use state::{Session, SessionState, SharedSessionStatus};
