// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for session keepalive operations.
//!
//! [`ClientError`] is what a [`SessionClient`](crate::SessionClient) reports.
//! [`Error`] is the controller's taxonomy; every client error is converted into
//! it at the component boundary that made the call.

use thiserror::Error;

/// Errors surfaced by the keepalive controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("not logged in: the session client reports no identity")]
    NotLoggedIn,

    #[error("transient transport error: {0}")]
    TransientTransport(String),

    #[error("lightweight reauthentication was refused by the backend")]
    AuthRejected,

    #[error("resync failed on both the versioned and the simple sync path")]
    ResyncFailed,

    #[error("pairing was not completed within {waited_secs}s")]
    PairingTimeout { waited_secs: u64 },

    #[error("pairing artifact unavailable: backend returned an empty token or url")]
    PairingUnavailable,

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("operation cancelled by controller shutdown")]
    Cancelled,
}

impl Error {
    /// Whether the reauth loop should spend another attempt after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransientTransport(_) | Error::AuthRejected)
    }
}

/// Errors reported by a [`SessionClient`](crate::SessionClient) implementation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with an unexpected status.
    #[error("unexpected status {code}: {message}")]
    Status { code: u16, message: String },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The backend explicitly refused the call.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The call exceeded its time budget.
    #[error("timed out after {0}s")]
    Timeout(u64),
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(_) => Error::AuthRejected,
            other => Error::TransientTransport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// A specialized Result type for controller operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
