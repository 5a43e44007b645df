// [libs/infra/host-client/src/client.rs]
//! Host Proxy's (C8) outbound leg: reqwest calls into a host-agent's RPC surface, with bounded
//! backoff on transport failures (§7: "host unreachable, connection reset ... retried with
//! bounded backoff (default 2 retries) before surfacing as a Transport error").

use crate::errors::HostClientError;
use fleetmesh_domain_models::{Action, Verification};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{instrument, warn};

const DEFAULT_RETRIES: u32 = 2;
const RETRY_BASE_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteActionRequest<'a> {
    pub device_id: &'a str,
    pub session_id: &'a str,
    pub action: &'a Action,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteActionResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteBatchRequest<'a> {
    pub device_id: &'a str,
    pub session_id: &'a str,
    pub actions: &'a [Action],
    pub retry_actions: &'a [Action],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionResult {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteBatchResponse {
    pub success: bool,
    pub results: Vec<ActionResult>,
    pub passed_count: u32,
    pub total_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteVerificationRequest<'a> {
    pub device_id: &'a str,
    pub session_id: &'a str,
    pub verifications: &'a [Verification],
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationResult {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteVerificationResponse {
    pub success: bool,
    pub results: Vec<VerificationResult>,
    pub passed_count: u32,
    pub total_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TakeScreenshotResponse {
    pub success: bool,
    pub screenshot_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestJsonResponse {
    pub success: bool,
    pub latest_json_url: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentSegmentsResponse {
    pub success: bool,
    pub segment_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZapObserveRequest<'a> {
    pub device_id: &'a str,
    pub session_id: &'a str,
    pub action_command: &'a str,
    pub key_release_ts: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZapObserveResponse {
    pub event: fleetmesh_domain_models::ZapEvent,
}

/// One client per host-agent base URL; the server keeps a small pool of these keyed by
/// `host_name` (§4.8).
pub struct HostProxyClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl HostProxyClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into(), retries: DEFAULT_RETRIES }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    async fn post_json<B: Serialize + Sync, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        session_id: &str,
        body: &B,
    ) -> Result<R, HostClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            let outcome = self
                .http
                .post(&url)
                .header("x-fleetmesh-session", session_id)
                .json(body)
                .send()
                .await;

            match outcome {
                Ok(response) => {
                    if !response.status().is_success() {
                        let status = response.status().as_u16();
                        let body = response.text().await.unwrap_or_default();
                        return Err(HostClientError::Rejected { status, body });
                    }
                    return response
                        .json::<R>()
                        .await
                        .map_err(|e| HostClientError::Decode(e.to_string()));
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(attempt, %url, error = %e, "host agent unreachable, retrying");
                    tokio::time::sleep(Duration::from_millis(RETRY_BASE_DELAY_MS * attempt as u64)).await;
                }
                Err(_) => {
                    return Err(HostClientError::Timeout { base_url: self.base_url.clone(), attempts: attempt + 1 });
                }
            }
        }
    }

    #[instrument(skip(self, action), fields(device_id, session_id))]
    pub async fn execute_action(
        &self,
        device_id: &str,
        session_id: &str,
        action: &Action,
    ) -> Result<ExecuteActionResponse, HostClientError> {
        self.post_json("/host/executeAction", session_id, &ExecuteActionRequest { device_id, session_id, action })
            .await
    }

    #[instrument(skip(self, actions, retry_actions), fields(device_id, session_id))]
    pub async fn execute_batch(
        &self,
        device_id: &str,
        session_id: &str,
        actions: &[Action],
        retry_actions: &[Action],
    ) -> Result<ExecuteBatchResponse, HostClientError> {
        self.post_json(
            "/host/executeBatch",
            session_id,
            &ExecuteBatchRequest { device_id, session_id, actions, retry_actions },
        )
        .await
    }

    #[instrument(skip(self, verifications), fields(device_id, session_id))]
    pub async fn execute_verification(
        &self,
        device_id: &str,
        session_id: &str,
        verifications: &[Verification],
    ) -> Result<ExecuteVerificationResponse, HostClientError> {
        self.post_json(
            "/host/executeVerification",
            session_id,
            &ExecuteVerificationRequest { device_id, session_id, verifications },
        )
        .await
    }

    #[instrument(skip(self), fields(device_id, session_id))]
    pub async fn take_screenshot(
        &self,
        device_id: &str,
        session_id: &str,
    ) -> Result<TakeScreenshotResponse, HostClientError> {
        self.post_json(
            "/host/takeScreenshot",
            session_id,
            &serde_json::json!({ "device_id": device_id, "session_id": session_id }),
        )
        .await
    }

    #[instrument(skip(self), fields(device_id, session_id))]
    pub async fn get_latest_json(
        &self,
        device_id: &str,
        session_id: &str,
    ) -> Result<LatestJsonResponse, HostClientError> {
        self.post_json(
            "/host/getLatestJson",
            session_id,
            &serde_json::json!({ "device_id": device_id, "session_id": session_id }),
        )
        .await
    }

    #[instrument(skip(self), fields(device_id, session_id))]
    pub async fn recent_segments(
        &self,
        device_id: &str,
        session_id: &str,
        n: usize,
    ) -> Result<RecentSegmentsResponse, HostClientError> {
        self.post_json(
            "/host/recentSegments",
            session_id,
            &serde_json::json!({ "device_id": device_id, "session_id": session_id, "n": n }),
        )
        .await
    }

    /// Clears the host-agent's per-device zap detector at script `setup` (§4.12 step 1).
    #[instrument(skip(self), fields(device_id, session_id))]
    pub async fn zap_reset(&self, device_id: &str, session_id: &str) -> Result<(), HostClientError> {
        self.post_json::<_, serde_json::Value>(
            "/host/zap/reset",
            session_id,
            &serde_json::json!({ "device_id": device_id, "session_id": session_id }),
        )
        .await?;
        Ok(())
    }

    /// Invokes C11 for a single zap event at the action's key-release timestamp (§4.12 step 2).
    #[instrument(skip(self), fields(device_id, session_id))]
    pub async fn zap_observe(
        &self,
        device_id: &str,
        session_id: &str,
        action_command: &str,
        key_release_ts: f64,
    ) -> Result<ZapObserveResponse, HostClientError> {
        self.post_json(
            "/host/zap/observe",
            session_id,
            &ZapObserveRequest { device_id, session_id, action_command, key_release_ts },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn action(command: &str) -> Action {
        Action { command: command.into(), params: Default::default() }
    }

    #[tokio::test]
    async fn execute_action_returns_the_decoded_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/host/executeAction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "result": null, "error": null
            })))
            .mount(&server)
            .await;

        let client = HostProxyClient::new(reqwest::Client::new(), server.uri());
        let result = client.execute_action("dev1", "sess1", &action("power_on")).await.unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn non_2xx_surfaces_as_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/host/executeAction"))
            .respond_with(ResponseTemplate::new(409).set_body_string("locked"))
            .mount(&server)
            .await;

        let client = HostProxyClient::new(reqwest::Client::new(), server.uri());
        let err = client.execute_action("dev1", "sess1", &action("power_on")).await.unwrap_err();
        match err {
            HostClientError::Rejected { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "locked");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn execute_batch_reports_per_action_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/host/executeBatch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "results": [
                    {"command": "tap", "success": true, "error": null},
                    {"command": "swipe", "success": false, "error": "timed out"},
                ],
                "passed_count": 1,
                "total_count": 2,
            })))
            .mount(&server)
            .await;

        let client = HostProxyClient::new(reqwest::Client::new(), server.uri());
        let actions = vec![action("tap"), action("swipe")];
        let result = client.execute_batch("dev1", "sess1", &actions, &[]).await.unwrap();
        assert_eq!(result.passed_count, 1);
        assert_eq!(result.total_count, 2);
        assert!(!result.results[1].success);
    }

    #[tokio::test]
    async fn take_screenshot_returns_the_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/host/takeScreenshot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "screenshot_url": "https://host/cap.jpg"
            })))
            .mount(&server)
            .await;

        let client = HostProxyClient::new(reqwest::Client::new(), server.uri());
        let result = client.take_screenshot("dev1", "sess1").await.unwrap();
        assert_eq!(result.screenshot_url.as_deref(), Some("https://host/cap.jpg"));
    }
}
