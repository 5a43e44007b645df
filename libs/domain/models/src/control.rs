//! [libs/domain/models/src/control.rs]
//! Device Lease / Lock Manager entities (C7, §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// `{ host_name, device_id, session_id, user_id, tree_id?, acquired_at, expires_at }`.
/// At most one active lease per `(host_name, device_id)` (§3).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLease {
    pub host_name: String,
    pub device_id: String,
    pub session_id: String,
    pub user_id: String,
    #[serde(default)]
    pub tree_id: Option<String>,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeControlRequest {
    pub host_name: String,
    pub device_id: String,
    pub session_id: String,
    pub user_id: String,
    #[serde(default)]
    pub tree_id: Option<String>,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TakeControlError {
    DeviceLocked,
    DeviceNotFound,
    StreamServiceError,
    AdbConnectionError,
    NetworkError,
}

impl TakeControlError {
    pub fn as_str(&self) -> &'static str {
        match self {
            TakeControlError::DeviceLocked => "device_locked",
            TakeControlError::DeviceNotFound => "device_not_found",
            TakeControlError::StreamServiceError => "stream_service_error",
            TakeControlError::AdbConnectionError => "adb_connection_error",
            TakeControlError::NetworkError => "network_error",
        }
    }
}
