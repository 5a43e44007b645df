// [apps/server/src/errors.rs]
//! HTTP-facing error shape (§7): every handler error collapses into
//! `{error_type, error, available_commands?, suggestion?}` via a single `IntoResponse` impl.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleetmesh_domain_models::{CommandSpec, ValidationOutcome};
use fleetmesh_infra_db::DbError;
use fleetmesh_infra_host_client::HostClientError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error_type: &'static str,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_commands: Vec<CommandSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    pub fn validation(outcome: ValidationOutcome) -> Self {
        let message = outcome
            .issues
            .iter()
            .filter(|i| i.blocking)
            .map(|i| i.message.clone())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody {
                error_type: "validation",
                error: message,
                available_commands: outcome.available_commands,
                suggestion: outcome.suggestion,
            },
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ApiErrorBody {
                error_type: "semantic",
                error: message.into(),
                available_commands: Vec::new(),
                suggestion: None,
            },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: ApiErrorBody {
                error_type: "transport",
                error: message.into(),
                available_commands: Vec::new(),
                suggestion: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DeviceLocked { host_name, device_id, held_by_user_id } => Self {
                status: StatusCode::CONFLICT,
                body: ApiErrorBody {
                    error_type: "device_locked",
                    error: format!("{device_id} on {host_name} is held by {held_by_user_id}"),
                    available_commands: Vec::new(),
                    suggestion: None,
                },
            },
            DbError::LeaseNotFound { host_name, device_id } => Self {
                status: StatusCode::CONFLICT,
                body: ApiErrorBody {
                    error_type: "lease_expired",
                    error: format!("no active lease for {device_id} on {host_name}"),
                    available_commands: Vec::new(),
                    suggestion: None,
                },
            },
            DbError::TreeNotFound(_) | DbError::NodeNotFound { .. } | DbError::EdgeNotFound { .. }
            | DbError::CommandNotFound { .. } | DbError::ReferenceNotFound(_) | DbError::NoCaptureFrame { .. } => Self {
                status: StatusCode::NOT_FOUND,
                body: ApiErrorBody {
                    error_type: "not_found",
                    error: err.to_string(),
                    available_commands: Vec::new(),
                    suggestion: None,
                },
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ApiErrorBody {
                    error_type: "fatal",
                    error: other.to_string(),
                    available_commands: Vec::new(),
                    suggestion: None,
                },
            },
        }
    }
}

impl From<HostClientError> for ApiError {
    fn from(err: HostClientError) -> Self {
        Self::transport(err.to_string())
    }
}
