// [apps/host-agent/src/driver.rs]
//! Device control backends (§9 "explicit registration interface per command kind"): one
//! implementation per `CommandKind` (remote/adb/web/ir), dispatched by a small registry keyed on
//! `device_id`. Validation of the command name/params already happened at the server (C6) before
//! the request reached this process; this layer only has to execute it.

use crate::errors::DriverError;
use async_trait::async_trait;
use fleetmesh_domain_models::{Action, CommandKind};
use std::collections::HashMap;
use std::process::Stdio;
use tracing::{instrument, warn};

#[async_trait]
pub trait DeviceDriver: Send + Sync {
    async fn dispatch(&self, device_id: &str, action: &Action) -> Result<serde_json::Value, DriverError>;
}

/// Drives Android devices over `adb shell`. One `adb` binary serves every device on this host,
/// selected by serial (`-s <device_id>`).
pub struct AdbDriver;

#[async_trait]
impl DeviceDriver for AdbDriver {
    #[instrument(skip(self, action), fields(device_id, command = %action.command))]
    async fn dispatch(&self, device_id: &str, action: &Action) -> Result<serde_json::Value, DriverError> {
        let output = tokio::process::Command::new("adb")
            .args(["-s", device_id, "shell", &action.command])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DriverError::BackendUnavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(DriverError::Rejected {
                command: action.command.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(serde_json::json!({ "stdout": String::from_utf8_lossy(&output.stdout).trim() }))
    }
}

/// Drives a command over a local HTTP sidecar. Used for `web` (a webdriver/playwright bridge),
/// `remote` (a set-top-box RPC shim) and `ir` (an IR-blaster service) — the wire shape is the
/// same in all three cases, only the listening process differs.
pub struct HttpBackedDriver {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackedDriver {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }
}

#[async_trait]
impl DeviceDriver for HttpBackedDriver {
    #[instrument(skip(self, action), fields(device_id, command = %action.command))]
    async fn dispatch(&self, device_id: &str, action: &Action) -> Result<serde_json::Value, DriverError> {
        let response = self
            .http
            .post(format!("{}/dispatch", self.base_url))
            .json(&serde_json::json!({ "device_id": device_id, "command": action.command, "params": action.params }))
            .send()
            .await
            .map_err(|e| DriverError::BackendUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DriverError::Rejected { command: action.command.clone(), message });
        }
        response.json().await.map_err(|e| DriverError::BackendUnavailable(e.to_string()))
    }
}

/// Routes a device's actions to the backend matching its configured `CommandKind` (§10
/// configuration: `DEVICE_DRIVERS`).
pub struct DriverRegistry {
    device_kinds: HashMap<String, CommandKind>,
    adb: AdbDriver,
    web: HttpBackedDriver,
    remote: HttpBackedDriver,
    ir: HttpBackedDriver,
}

impl DriverRegistry {
    pub fn new(http: reqwest::Client, device_kinds: HashMap<String, CommandKind>) -> Self {
        Self {
            device_kinds,
            adb: AdbDriver,
            web: HttpBackedDriver::new(http.clone(), std::env::var("WEB_DRIVER_URL").unwrap_or_else(|_| "http://localhost:9500".into())),
            remote: HttpBackedDriver::new(http.clone(), std::env::var("REMOTE_BACKEND_URL").unwrap_or_else(|_| "http://localhost:9501".into())),
            ir: HttpBackedDriver::new(http, std::env::var("IR_BLASTER_URL").unwrap_or_else(|_| "http://localhost:9502".into())),
        }
    }

    #[instrument(skip(self, action), fields(device_id, command = %action.command))]
    pub async fn dispatch(&self, device_id: &str, action: &Action) -> Result<serde_json::Value, DriverError> {
        let kind = self
            .device_kinds
            .get(device_id)
            .copied()
            .ok_or_else(|| DriverError::UnknownDevice { device_id: device_id.to_string() })?;

        let driver: &dyn DeviceDriver = match kind {
            CommandKind::Adb => &self.adb,
            CommandKind::Web => &self.web,
            CommandKind::Remote => &self.remote,
            CommandKind::Ir => &self.ir,
        };

        let result = driver.dispatch(device_id, action).await;
        if let Err(ref e) = result {
            warn!(error = %e, "device dispatch failed");
        }
        result
    }
}
