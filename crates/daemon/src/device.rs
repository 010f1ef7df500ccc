// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Device id and name generation for pairing.
//!
//! Ids look like the ones the backend hands out itself: "49" followed by 30
//! lowercase hex digits. Names carry the host name so the person approving a
//! pairing can tell which machine asks.

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;

use std::fs;

use sha2::{Digest, Sha256};

use crate::env;

const DEVICE_ID_PREFIX: &str = "49";
const DEVICE_ID_HEX_LEN: usize = 30;
const FALLBACK_LABEL: &str = "tether";
const HOSTNAME_FILE: &str = "/etc/hostname";

/// Derives a device id from `seed`.
pub fn device_id_from_seed(seed: &str) -> String {
    let digest = hex::encode(Sha256::digest(seed.as_bytes()));
    format!("{}{}", DEVICE_ID_PREFIX, &digest[..DEVICE_ID_HEX_LEN])
}

/// A fresh device id for `session_id`, unique per call.
pub fn create_device_id(session_id: Option<&str>) -> String {
    let now = chrono::Utc::now();
    let seed = format!(
        "{}:{}:{}:{}",
        device_label(session_id),
        session_id.unwrap_or_default(),
        std::process::id(),
        now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros())
    );
    device_id_from_seed(&seed)
}

/// Display name shown on the backend's device list.
pub fn create_device_name(session_id: Option<&str>) -> String {
    format!("{}'s Pad", device_label(session_id))
}

/// Label identifying this machine to whoever approves the pairing.
pub fn device_label(session_id: Option<&str>) -> String {
    label_from(host_name().as_deref(), session_id)
}

/// Short host name, else the session id, else "tether".
fn label_from(host: Option<&str>, session_id: Option<&str>) -> String {
    let short_host = host
        .and_then(|h| h.trim().split('.').next())
        .filter(|h| !h.is_empty() && *h != "localhost");
    short_host
        .or(session_id.map(str::trim).filter(|id| !id.is_empty()))
        .unwrap_or(FALLBACK_LABEL)
        .to_string()
}

fn host_name() -> Option<String> {
    env::hostname().or_else(|| {
        fs::read_to_string(HOSTNAME_FILE)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}
