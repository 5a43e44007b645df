// [apps/script-runner/src/client.rs]
//! Thin HTTP client over `apps/server`'s stable surface (§6). Unlike `fleetmesh-infra-host-client`
//! (C8's outbound leg from inside the orchestrator), this one speaks to the orchestrator itself,
//! since script-runner is an external caller.

use crate::errors::RunnerError;
use fleetmesh_domain_models::{Action, NavigationTree, TakeControlRequest, Verification, ZapEvent};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

pub struct ServerClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OkResponse {
    #[allow(dead_code)]
    ok: bool,
}

#[derive(Debug, Deserialize)]
struct GetTreeResponse {
    #[allow(dead_code)]
    success: bool,
    tree: NavigationTree,
}

#[derive(Debug, Serialize)]
struct ExecuteBatchRequest<'a> {
    host: &'a str,
    device_id: &'a str,
    session_id: &'a str,
    device_model: &'a str,
    actions: &'a [Action],
    retry_actions: &'a [Action],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionResultDto {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub results: Vec<ActionResultDto>,
    pub passed_count: u32,
    pub total_count: u32,
}

#[derive(Debug, Serialize)]
struct ExecuteVerificationRequest<'a> {
    host: &'a str,
    device_id: &'a str,
    session_id: &'a str,
    device_model: &'a str,
    verifications: &'a [Verification],
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationResultDto {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationResponse {
    pub success: bool,
    pub results: Vec<VerificationResultDto>,
    pub passed_count: u32,
    pub total_count: u32,
}

#[derive(Debug, Deserialize)]
struct ZapObserveResponse {
    event: ZapEvent,
}

impl ServerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RunnerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RunnerError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    async fn post<B: Serialize + Sync, R: for<'de> Deserialize<'de>>(&self, path: &str, body: &B) -> Result<R, RunnerError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| RunnerError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RunnerError::Rejected { status: status.as_u16(), body });
        }
        response.json::<R>().await.map_err(|e| RunnerError::Transport(e.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn take_control(
        &self,
        host_name: &str,
        device_id: &str,
        session_id: &str,
        user_id: &str,
    ) -> Result<(), RunnerError> {
        let _: OkResponse = self
            .post(
                "/server/control/takeControl",
                &TakeControlRequest {
                    host_name: host_name.into(),
                    device_id: device_id.into(),
                    session_id: session_id.into(),
                    user_id: user_id.into(),
                    tree_id: None,
                },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn release_control(&self, host_name: &str, device_id: &str, session_id: &str) -> Result<(), RunnerError> {
        let _: OkResponse = self
            .post(
                "/server/control/releaseControl",
                &serde_json::json!({ "host_name": host_name, "device_id": device_id, "session_id": session_id }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_tree_by_userinterface_id(&self, userinterface_id: &str) -> Result<NavigationTree, RunnerError> {
        let url = format!("{}/server/navigationTrees/getTreeByUserInterfaceId/{}", self.base_url, userinterface_id);
        let response = self.http.get(url).send().await.map_err(|e| RunnerError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RunnerError::Rejected { status: status.as_u16(), body });
        }
        let parsed: GetTreeResponse = response.json().await.map_err(|e| RunnerError::Transport(e.to_string()))?;
        Ok(parsed.tree)
    }

    #[instrument(skip(self, actions, retry_actions))]
    #[allow(clippy::too_many_arguments)]
    pub async fn execute_batch(
        &self,
        host: &str,
        device_id: &str,
        session_id: &str,
        device_model: &str,
        actions: &[Action],
        retry_actions: &[Action],
    ) -> Result<BatchResponse, RunnerError> {
        self.post(
            "/server/action/executeBatch",
            &ExecuteBatchRequest { host, device_id, session_id, device_model, actions, retry_actions },
        )
        .await
    }

    #[instrument(skip(self, verifications))]
    pub async fn execute_verification(
        &self,
        host: &str,
        device_id: &str,
        session_id: &str,
        device_model: &str,
        verifications: &[Verification],
    ) -> Result<VerificationResponse, RunnerError> {
        self.post(
            "/server/verification/execute",
            &ExecuteVerificationRequest { host, device_id, session_id, device_model, verifications },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn zap_reset(&self, host: &str, device_id: &str, session_id: &str) -> Result<(), RunnerError> {
        let _: OkResponse = self
            .post("/server/zap/reset", &serde_json::json!({ "host": host, "device_id": device_id, "session_id": session_id }))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn zap_observe(
        &self,
        host: &str,
        device_id: &str,
        session_id: &str,
        action_command: &str,
        key_release_ts: f64,
    ) -> Result<ZapEvent, RunnerError> {
        let response: ZapObserveResponse = self
            .post(
                "/server/zap/observe",
                &serde_json::json!({
                    "host": host,
                    "device_id": device_id,
                    "session_id": session_id,
                    "action_command": action_command,
                    "key_release_ts": key_release_ts,
                }),
            )
            .await?;
        Ok(response.event)
    }
}
