// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol profile resolution.
//!
//! Resolved once from the client's declared [`ClientCapability`] when the
//! controller is built, then shared read-only.

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;

use std::fmt;

use crate::client::ClientCapability;

/// Protocol version whose backend supports versioned catch-up.
pub const MODERN_PROTOCOL_VERSION: u32 = 849;

/// Path prefix used by modern backends.
pub const MODERN_PATH_PREFIX: &str = "/VXAPI";

/// Path prefix used by legacy backends.
pub const LEGACY_PATH_PREFIX: &str = "/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    LegacyV1,
    ModernV2,
    Unknown,
}

/// Which sync call the resync engine leads with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEndpointStyle {
    /// Versioned catch-up with simple sync as fallback.
    Versioned,
    /// Simple whole-sync only.
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolProfile {
    pub version: ProtocolVersion,
    pub sync_style: SyncEndpointStyle,
}

impl ProtocolProfile {
    pub fn new(version: ProtocolVersion) -> Self {
        let sync_style = match version {
            ProtocolVersion::ModernV2 => SyncEndpointStyle::Versioned,
            ProtocolVersion::LegacyV1 | ProtocolVersion::Unknown => SyncEndpointStyle::Simple,
        };
        ProtocolProfile { version, sync_style }
    }

    /// Resolves the profile from what the client declares.
    ///
    /// Resolution order:
    /// 1. Declared protocol version (849 is modern, anything else legacy)
    /// 2. Declared path prefix (`/VXAPI` is modern, anything else legacy)
    /// 3. Nothing declared: unknown
    pub fn resolve(capability: &ClientCapability) -> Self {
        let version = match (capability.protocol_version, capability.api_path_prefix.as_deref()) {
            (Some(MODERN_PROTOCOL_VERSION), _) => ProtocolVersion::ModernV2,
            (Some(_), _) => ProtocolVersion::LegacyV1,
            (None, Some(MODERN_PATH_PREFIX)) => ProtocolVersion::ModernV2,
            (None, Some(_)) => ProtocolVersion::LegacyV1,
            (None, None) => ProtocolVersion::Unknown,
        };
        Self::new(version)
    }

    /// API path prefix a transport should use for this profile.
    pub fn api_path_prefix(&self) -> &'static str {
        match self.version {
            ProtocolVersion::ModernV2 => MODERN_PATH_PREFIX,
            ProtocolVersion::LegacyV1 | ProtocolVersion::Unknown => LEGACY_PATH_PREFIX,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtocolVersion::LegacyV1 => "legacy-v1",
            ProtocolVersion::ModernV2 => "modern-v2",
            ProtocolVersion::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
