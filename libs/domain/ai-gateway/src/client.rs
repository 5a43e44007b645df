// [libs/domain/ai-gateway/src/client.rs]
//! The AI-service boundary (§4.11 "Banner analysis", §4.10 "Subtitle / speech"). `AiGateway` is
//! the seam `fleetmesh-core-zap-engine` and `apps/host-agent`'s frame-analysis loop call through
//! so neither depends on reqwest or a concrete service address directly.

use crate::errors::AiGatewayError;
use crate::subtitle::SubtitleSpeechResult;
use crate::translate::{TranslateBatchRequest, TranslateBatchResponse};
use async_trait::async_trait;
use fleetmesh_domain_models::ChannelInfo;

#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Extracts channel/program info from a banner-candidate frame (an image URL or inline
    /// bytes encoded by the caller into `frame_ref`). Called at most once per zap event, gated
    /// by early termination once the result is complete (§4.11).
    async fn extract_channel_info(&self, frame_ref: &str) -> Result<ChannelInfo, AiGatewayError>;

    /// One call per analysis window, not per frame (§4.10); the caller caches the result across
    /// the window.
    async fn detect_subtitle_speech(&self, window_ref: &str) -> Result<SubtitleSpeechResult, AiGatewayError>;

    async fn translate_batch(
        &self,
        request: &TranslateBatchRequest,
    ) -> Result<TranslateBatchResponse, AiGatewayError>;
}

/// reqwest-backed client against a configured AI-service base URL (§10 configuration).
pub struct HttpAiGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAiGateway {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    async fn post_json<B: serde::Serialize + Sync, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AiGatewayError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiGatewayError::ServiceError { status, body });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| AiGatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AiGateway for HttpAiGateway {
    async fn extract_channel_info(&self, frame_ref: &str) -> Result<ChannelInfo, AiGatewayError> {
        self.post_json("/banner/extract", &serde_json::json!({ "frame_ref": frame_ref })).await
    }

    async fn detect_subtitle_speech(&self, window_ref: &str) -> Result<SubtitleSpeechResult, AiGatewayError> {
        self.post_json("/window/analyze", &serde_json::json!({ "window_ref": window_ref })).await
    }

    async fn translate_batch(
        &self,
        request: &TranslateBatchRequest,
    ) -> Result<TranslateBatchResponse, AiGatewayError> {
        self.post_json("/translate/restart-batch", request).await
    }
}
