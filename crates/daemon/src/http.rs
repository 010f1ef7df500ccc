// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/JSON session client.
//!
//! Every endpoint answers with the same envelope:
//!
//! ```json
//! { "Success": true, "Message": "...", "Data": { ... } }
//! ```
//!
//! Paths are joined as `<url><api prefix><endpoint>`.

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

use std::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use tether_core::{
    CatchupResult, ClientCapability, ClientError, ClientFuture, ClientResult, DeviceIdentity,
    PairingArtifact, PairingStatus, Profile, ProtocolProfile, SessionClient, SyncReport,
};

use crate::config::BackendConfig;
use crate::device;
use crate::error::{Error, Result};

const PROFILE_PATH: &str = "/User/GetProfile";
const TWICE_AUTH_PATH: &str = "/Login/TwiceAutoAuth";
const SYNC_PATH: &str = "/Msg/Sync";
const NEWINIT_PATH: &str = "/Login/Newinit";
const AWAKEN_PATH: &str = "/Login/Awaken";
const QR_PATH: &str = "/Login/GetQR";
const CHECK_QR_PATH: &str = "/Login/CheckQR";
const CACHE_INFO_PATH: &str = "/Login/GetCacheInfo";

/// Response envelope shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NewinitData {
    #[serde(default)]
    continue_flag: i64,
    #[serde(default)]
    current_synckey: SyncKey,
    #[serde(default)]
    max_synckey: SyncKey,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SyncKey {
    #[serde(default)]
    buffer: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileData {
    #[serde(default, rename = "userInfo")]
    user_info: Option<UserInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserInfo {
    #[serde(default)]
    user_name: Option<StringField>,
    #[serde(default)]
    nick_name: Option<StringField>,
}

#[derive(Debug, Default, Deserialize)]
struct StringField {
    #[serde(default)]
    string: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QrData {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    qr_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct CacheInfo {
    #[serde(default, alias = "DeviceId", alias = "deviceId")]
    device_id: String,
    #[serde(default, alias = "DeviceName", alias = "deviceName")]
    device_name: String,
}

/// Session client talking to the backend over HTTP.
pub struct HttpSessionClient {
    http: reqwest::Client,
    base_url: String,
    api_prefix: String,
    capability: ClientCapability,
    timeout_secs: u64,
    identity: Mutex<Option<String>>,
}

impl HttpSessionClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let capability = config.capability();
        let api_prefix = config
            .api_path_prefix
            .clone()
            .unwrap_or_else(|| ProtocolProfile::resolve(&capability).api_path_prefix().to_string());
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(HttpSessionClient {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_prefix,
            capability,
            timeout_secs: config.request_timeout_secs,
            identity: Mutex::new(config.session_id.clone().filter(|id| !id.is_empty())),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn set_identity(&self, session_id: String) {
        let mut identity = self.identity.lock().unwrap_or_else(|e| e.into_inner());
        *identity = Some(session_id);
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Request(err.to_string())
        }
    }

    async fn post(&self, path: &str, body: Value) -> ClientResult<Envelope> {
        let response = self
            .http
            .post(self.endpoint(path))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { code: status.as_u16(), message });
        }

        response.json::<Envelope>().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn newinit(&self, max_key: &str, current_key: &str) -> ClientResult<Option<CatchupResult>> {
        let Some(session_id) = self.current_identity() else {
            return Err(ClientError::Rejected("not logged in".into()));
        };
        let url = self.endpoint(NEWINIT_PATH);
        tracing::debug!(%url, "calling newinit");

        let response = self
            .http
            .post(&url)
            .form(&[
                ("wxid", session_id.as_str()),
                ("MaxSynckey", max_key),
                ("CurrentSynckey", current_key),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %url, "newinit http error");
            return Ok(None);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_json_content_type(&content_type) {
            tracing::warn!(%content_type, "newinit returned non-json content");
            return Ok(None);
        }

        let envelope = response
            .json::<Envelope>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(catchup_from_envelope(envelope))
    }
}

pub(crate) fn is_json_content_type(content_type: &str) -> bool {
    content_type.contains("application/json") || content_type.contains("text/json")
}

pub(crate) fn catchup_from_envelope(envelope: Envelope) -> Option<CatchupResult> {
    if !envelope.success {
        tracing::warn!(message = envelope.message(), "newinit refused");
        return None;
    }
    let data: NewinitData = match serde_json::from_value(envelope.data) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("newinit data malformed: {}", e);
            return None;
        }
    };
    Some(CatchupResult {
        continue_pending: data.continue_flag == 1,
        current_key: data.current_synckey.buffer,
        max_key: data.max_synckey.buffer,
    })
}

pub(crate) fn profile_from_envelope(envelope: Envelope) -> ClientResult<Option<Profile>> {
    if !envelope.success {
        return Ok(None);
    }
    let data: ProfileData = serde_json::from_value(envelope.data)?;
    let Some(info) = data.user_info else {
        return Ok(None);
    };

    let user_name = info.user_name.map(|f| f.string).unwrap_or_default();
    if user_name.is_empty() {
        return Ok(None);
    }
    Ok(Some(Profile {
        user_name,
        nick_name: info.nick_name.map(|f| f.string).filter(|s| !s.is_empty()),
    }))
}

pub(crate) fn artifact_from_envelope(envelope: Envelope) -> ClientResult<PairingArtifact> {
    if !envelope.success {
        return Err(ClientError::Rejected(envelope.message().to_string()));
    }
    let data: QrData = serde_json::from_value(envelope.data)?;
    Ok(PairingArtifact { token: data.uuid, presentation_url: data.qr_url })
}

/// The logged-in session id, once pairing completed.
pub(crate) fn paired_identity(envelope: &Envelope) -> Option<String> {
    if !envelope.success {
        return None;
    }
    envelope
        .data
        .get("acctSectResp")
        .and_then(|resp| resp.get("userName"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

pub(crate) fn device_from_envelope(envelope: Envelope) -> Option<DeviceIdentity> {
    if !envelope.success || envelope.data.is_null() {
        return None;
    }
    let info: CacheInfo = serde_json::from_value(envelope.data).ok()?;
    if info.device_id.is_empty() && info.device_name.is_empty() {
        return None;
    }
    Some(DeviceIdentity::new(info.device_id, info.device_name))
}

impl SessionClient for HttpSessionClient {
    fn capability(&self) -> ClientCapability {
        self.capability.clone()
    }

    fn current_identity(&self) -> Option<String> {
        self.identity.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn fetch_profile(&self) -> ClientFuture<'_, Option<Profile>> {
        Box::pin(async move {
            let Some(session_id) = self.current_identity() else {
                return Ok(None);
            };
            let envelope = self.post(PROFILE_PATH, json!({ "Wxid": session_id })).await?;
            profile_from_envelope(envelope)
        })
    }

    fn lightweight_reauth<'a>(&'a self, session_id: &'a str) -> ClientFuture<'a, bool> {
        Box::pin(async move {
            let envelope = self.post(TWICE_AUTH_PATH, json!({ "Wxid": session_id })).await?;
            if !envelope.success {
                tracing::debug!(message = envelope.message(), "twice auth refused");
            }
            Ok(envelope.success)
        })
    }

    fn simple_sync(&self) -> ClientFuture<'_, SyncReport> {
        Box::pin(async move {
            let session_id = self.current_identity().unwrap_or_default();
            let envelope = self
                .post(SYNC_PATH, json!({ "Wxid": session_id, "Scene": 0, "Synckey": "" }))
                .await?;
            let payload = if envelope.success {
                envelope.data
            } else {
                Value::String(envelope.message().to_string())
            };
            Ok(SyncReport { ok: envelope.success, payload })
        })
    }

    fn versioned_catchup<'a>(
        &'a self,
        max_key: &'a str,
        current_key: &'a str,
    ) -> ClientFuture<'a, Option<CatchupResult>> {
        Box::pin(self.newinit(max_key, current_key))
    }

    fn silent_wake<'a>(&'a self, session_id: &'a str) -> ClientFuture<'a, bool> {
        Box::pin(async move {
            let envelope = self.post(AWAKEN_PATH, json!({ "Wxid": session_id })).await?;
            Ok(envelope.success)
        })
    }

    fn request_pairing_artifact<'a>(
        &'a self,
        device: &'a DeviceIdentity,
    ) -> ClientFuture<'a, PairingArtifact> {
        Box::pin(async move {
            let body = json!({ "DeviceID": device.device_id, "DeviceName": device.device_name });
            artifact_from_envelope(self.post(QR_PATH, body).await?)
        })
    }

    fn poll_pairing_status<'a>(
        &'a self,
        token: &'a str,
        device_id: &'a str,
    ) -> ClientFuture<'a, PairingStatus> {
        Box::pin(async move {
            let envelope = self
                .post(CHECK_QR_PATH, json!({ "Uuid": token, "DeviceID": device_id }))
                .await?;
            let done = match paired_identity(&envelope) {
                Some(session_id) => {
                    self.set_identity(session_id);
                    true
                }
                None => false,
            };
            Ok(PairingStatus { done, payload: envelope.data })
        })
    }

    fn create_device_id(&self) -> String {
        device::create_device_id(self.current_identity().as_deref())
    }

    fn create_device_name(&self) -> String {
        device::create_device_name(self.current_identity().as_deref())
    }

    fn cached_device<'a>(&'a self, session_id: &'a str) -> ClientFuture<'a, Option<DeviceIdentity>> {
        Box::pin(async move {
            if session_id.is_empty() {
                return Ok(None);
            }
            let envelope = self.post(CACHE_INFO_PATH, json!({ "Wxid": session_id })).await?;
            Ok(device_from_envelope(envelope))
        })
    }
}
