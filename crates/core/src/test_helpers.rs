// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: a scripted session client.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;

use crate::client::{
    CatchupResult, ClientCapability, ClientFuture, ClientResult, PairingArtifact, PairingStatus,
    Profile, SessionClient, SyncReport,
};
use crate::error::ClientError;
use crate::identity::DeviceIdentity;
use crate::policy::RetryPolicy;

/// A scripted reply for one mock call.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Transport failure.
    Fail(String),
    /// Explicit refusal by the backend.
    Reject(String),
    /// Never answers; only a timeout ends the call.
    Hang,
}

/// Queue of scripted replies with a fallback once the queue is drained.
struct Script<T> {
    queue: VecDeque<Reply<T>>,
    fallback: Reply<T>,
    calls: usize,
}

impl<T: Clone> Script<T> {
    fn new(fallback: Reply<T>) -> Self {
        Script { queue: VecDeque::new(), fallback, calls: 0 }
    }

    fn next(&mut self) -> Reply<T> {
        self.calls += 1;
        self.queue.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

struct Scripts {
    profile: Script<Option<Profile>>,
    reauth: Script<bool>,
    simple_sync: Script<SyncReport>,
    catchup: Script<Option<CatchupResult>>,
    wake: Script<bool>,
    pairing: Script<PairingArtifact>,
    poll: Script<PairingStatus>,
    cached_device: Option<DeviceIdentity>,
    catchup_args: Vec<(String, String)>,
    pairing_devices: Vec<DeviceIdentity>,
}

/// Session client whose every call is scripted and counted.
pub struct MockSessionClient {
    capability: ClientCapability,
    identity: Mutex<Option<String>>,
    scripts: Mutex<Scripts>,
    /// Artificial latency for sync calls, used to expose overlapping episodes.
    sync_latency: Duration,
    poll_latency: Duration,
    syncs_in_flight: AtomicUsize,
    max_syncs_in_flight: AtomicUsize,
    device_counter: AtomicUsize,
}

impl MockSessionClient {
    /// A logged-in client on the legacy protocol where every call succeeds.
    pub fn new() -> Self {
        MockSessionClient {
            capability: ClientCapability::default(),
            identity: Mutex::new(Some("wxid_test".to_string())),
            scripts: Mutex::new(Scripts {
                profile: Script::new(Reply::Ok(Some(Profile {
                    user_name: "wxid_test".into(),
                    nick_name: Some("tester".into()),
                }))),
                reauth: Script::new(Reply::Ok(true)),
                simple_sync: Script::new(Reply::Ok(SyncReport { ok: true, payload: json!({}) })),
                catchup: Script::new(Reply::Ok(Some(CatchupResult::default()))),
                wake: Script::new(Reply::Ok(true)),
                pairing: Script::new(Reply::Ok(PairingArtifact {
                    token: "uuid-1".into(),
                    presentation_url: "https://pair.example/uuid-1".into(),
                })),
                poll: Script::new(Reply::Ok(PairingStatus { done: false, payload: json!({}) })),
                cached_device: None,
                catchup_args: Vec::new(),
                pairing_devices: Vec::new(),
            }),
            sync_latency: Duration::ZERO,
            poll_latency: Duration::ZERO,
            syncs_in_flight: AtomicUsize::new(0),
            max_syncs_in_flight: AtomicUsize::new(0),
            device_counter: AtomicUsize::new(0),
        }
    }

    /// Declare the modern protocol version.
    pub fn modern() -> Self {
        Self::new().with_protocol_version(849)
    }

    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.capability.protocol_version = Some(version);
        self
    }

    pub fn with_sync_latency(mut self, latency: Duration) -> Self {
        self.sync_latency = latency;
        self
    }

    /// Make every pairing status poll take `latency` before answering.
    pub fn with_poll_latency(mut self, latency: Duration) -> Self {
        self.poll_latency = latency;
        self
    }

    pub fn logged_out(self) -> Self {
        *self.identity.lock().unwrap() = None;
        self
    }

    pub fn set_cached_device(&self, device: DeviceIdentity) {
        self.scripts.lock().unwrap().cached_device = Some(device);
    }

    pub fn script_profile(&self, replies: impl IntoIterator<Item = Reply<Option<Profile>>>) {
        self.scripts.lock().unwrap().profile.queue.extend(replies);
    }

    pub fn script_reauth(&self, replies: impl IntoIterator<Item = Reply<bool>>) {
        self.scripts.lock().unwrap().reauth.queue.extend(replies);
    }

    pub fn reauth_fallback(&self, reply: Reply<bool>) {
        self.scripts.lock().unwrap().reauth.fallback = reply;
    }

    pub fn script_simple_sync(&self, replies: impl IntoIterator<Item = Reply<SyncReport>>) {
        self.scripts.lock().unwrap().simple_sync.queue.extend(replies);
    }

    pub fn script_catchup(&self, replies: impl IntoIterator<Item = Reply<Option<CatchupResult>>>) {
        self.scripts.lock().unwrap().catchup.queue.extend(replies);
    }

    pub fn catchup_fallback(&self, reply: Reply<Option<CatchupResult>>) {
        self.scripts.lock().unwrap().catchup.fallback = reply;
    }

    pub fn script_wake(&self, replies: impl IntoIterator<Item = Reply<bool>>) {
        self.scripts.lock().unwrap().wake.queue.extend(replies);
    }

    pub fn script_pairing(&self, replies: impl IntoIterator<Item = Reply<PairingArtifact>>) {
        self.scripts.lock().unwrap().pairing.queue.extend(replies);
    }

    pub fn script_poll(&self, replies: impl IntoIterator<Item = Reply<PairingStatus>>) {
        self.scripts.lock().unwrap().poll.queue.extend(replies);
    }

    pub fn profile_calls(&self) -> usize {
        self.scripts.lock().unwrap().profile.calls
    }

    pub fn reauth_calls(&self) -> usize {
        self.scripts.lock().unwrap().reauth.calls
    }

    pub fn simple_sync_calls(&self) -> usize {
        self.scripts.lock().unwrap().simple_sync.calls
    }

    pub fn catchup_calls(&self) -> usize {
        self.scripts.lock().unwrap().catchup.calls
    }

    /// `(max_key, current_key)` for every catch-up call, in order.
    pub fn catchup_args(&self) -> Vec<(String, String)> {
        self.scripts.lock().unwrap().catchup_args.clone()
    }

    pub fn wake_calls(&self) -> usize {
        self.scripts.lock().unwrap().wake.calls
    }

    pub fn pairing_requests(&self) -> usize {
        self.scripts.lock().unwrap().pairing.calls
    }

    pub fn pairing_devices(&self) -> Vec<DeviceIdentity> {
        self.scripts.lock().unwrap().pairing_devices.clone()
    }

    pub fn poll_calls(&self) -> usize {
        self.scripts.lock().unwrap().poll.calls
    }

    pub fn max_syncs_in_flight(&self) -> usize {
        self.max_syncs_in_flight.load(Ordering::SeqCst)
    }

    async fn answer<T>(reply: Reply<T>) -> ClientResult<T> {
        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::Fail(msg) => Err(ClientError::Request(msg)),
            Reply::Reject(msg) => Err(ClientError::Rejected(msg)),
            Reply::Hang => std::future::pending().await,
        }
    }

    async fn track_sync<T>(&self, reply: Reply<T>) -> ClientResult<T> {
        let now = self.syncs_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_syncs_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.sync_latency.is_zero() {
            tokio::time::sleep(self.sync_latency).await;
        }
        self.syncs_in_flight.fetch_sub(1, Ordering::SeqCst);
        Self::answer(reply).await
    }
}

impl SessionClient for MockSessionClient {
    fn capability(&self) -> ClientCapability {
        self.capability.clone()
    }

    fn current_identity(&self) -> Option<String> {
        self.identity.lock().unwrap().clone()
    }

    fn fetch_profile(&self) -> ClientFuture<'_, Option<Profile>> {
        let reply = self.scripts.lock().unwrap().profile.next();
        Box::pin(Self::answer(reply))
    }

    fn lightweight_reauth<'a>(&'a self, _session_id: &'a str) -> ClientFuture<'a, bool> {
        let reply = self.scripts.lock().unwrap().reauth.next();
        Box::pin(Self::answer(reply))
    }

    fn simple_sync(&self) -> ClientFuture<'_, SyncReport> {
        let reply = self.scripts.lock().unwrap().simple_sync.next();
        Box::pin(self.track_sync(reply))
    }

    fn versioned_catchup<'a>(
        &'a self,
        max_key: &'a str,
        current_key: &'a str,
    ) -> ClientFuture<'a, Option<CatchupResult>> {
        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts.catchup_args.push((max_key.to_string(), current_key.to_string()));
            scripts.catchup.next()
        };
        Box::pin(self.track_sync(reply))
    }

    fn silent_wake<'a>(&'a self, _session_id: &'a str) -> ClientFuture<'a, bool> {
        let reply = self.scripts.lock().unwrap().wake.next();
        Box::pin(Self::answer(reply))
    }

    fn request_pairing_artifact<'a>(
        &'a self,
        device: &'a DeviceIdentity,
    ) -> ClientFuture<'a, PairingArtifact> {
        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts.pairing_devices.push(device.clone());
            scripts.pairing.next()
        };
        Box::pin(Self::answer(reply))
    }

    fn poll_pairing_status<'a>(
        &'a self,
        _token: &'a str,
        _device_id: &'a str,
    ) -> ClientFuture<'a, PairingStatus> {
        let reply = self.scripts.lock().unwrap().poll.next();
        let latency = self.poll_latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            Self::answer(reply).await
        })
    }

    fn create_device_id(&self) -> String {
        let n = self.device_counter.fetch_add(1, Ordering::SeqCst);
        format!("49mock{:026}", n)
    }

    fn create_device_name(&self) -> String {
        "mock-device".to_string()
    }

    fn cached_device<'a>(&'a self, _session_id: &'a str) -> ClientFuture<'a, Option<DeviceIdentity>> {
        let device = self.scripts.lock().unwrap().cached_device.clone();
        Box::pin(async move { Ok(device) })
    }
}

/// Policy with the documented defaults but a short call timeout.
pub fn test_policy() -> RetryPolicy {
    RetryPolicy { call_timeout_secs: 5, ..RetryPolicy::default() }
}

pub fn pending(current: &str, max: &str) -> Reply<Option<CatchupResult>> {
    Reply::Ok(Some(CatchupResult {
        continue_pending: true,
        current_key: current.into(),
        max_key: max.into(),
    }))
}

pub fn caught_up(current: &str, max: &str) -> Reply<Option<CatchupResult>> {
    Reply::Ok(Some(CatchupResult {
        continue_pending: false,
        current_key: current.into(),
        max_key: max.into(),
    }))
}

pub fn paired() -> Reply<PairingStatus> {
    Reply::Ok(PairingStatus { done: true, payload: json!({"wxid": "wxid_test"}) })
}

/// Asserts that between `secs` and `secs + 1` seconds of virtual time passed.
#[track_caller]
pub fn assert_elapsed(start: tokio::time::Instant, secs: u64) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_secs(secs) && elapsed < Duration::from_secs(secs + 1),
        "expected ~{}s elapsed, got {:?}",
        secs,
        elapsed
    );
}
