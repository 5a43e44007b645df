// [apps/host-agent/src/errors.rs]
//! Error taxonomy for this process (§7): device-control failures are Transport or Semantic
//! depending on whether the underlying backend was unreachable or simply rejected the command.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("device '{device_id}' has no registered control backend")]
    UnknownDevice { device_id: String },

    #[error("control backend process failed: {0}")]
    BackendUnavailable(String),

    #[error("command '{command}' rejected by the device: {message}")]
    Rejected { command: String, message: String },
}

#[derive(Error, Debug)]
pub enum HostAgentError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("session '{presented}' does not hold the current lease for this device")]
    SessionMismatch { presented: String },

    #[error("no capture frame recorded yet")]
    NoCaptureFrame,

    #[error("upstream server request failed: {0}")]
    ServerUnreachable(#[from] reqwest::Error),

    #[error("capture filesystem error: {0}")]
    Capture(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_type: &'static str,
    error: String,
}

impl IntoResponse for HostAgentError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            HostAgentError::Driver(DriverError::UnknownDevice { .. }) => (StatusCode::NOT_FOUND, "not_found"),
            HostAgentError::Driver(DriverError::BackendUnavailable(_)) => (StatusCode::BAD_GATEWAY, "transport"),
            HostAgentError::Driver(DriverError::Rejected { .. }) => (StatusCode::UNPROCESSABLE_ENTITY, "semantic"),
            HostAgentError::SessionMismatch { .. } => (StatusCode::CONFLICT, "lease_expired"),
            HostAgentError::NoCaptureFrame => (StatusCode::NOT_FOUND, "not_found"),
            HostAgentError::ServerUnreachable(_) => (StatusCode::BAD_GATEWAY, "transport"),
            HostAgentError::Capture(_) => (StatusCode::INTERNAL_SERVER_ERROR, "fatal"),
        };
        (status, Json(ErrorBody { error_type, error: self.to_string() })).into_response()
    }
}
