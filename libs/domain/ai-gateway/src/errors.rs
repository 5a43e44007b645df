// [libs/domain/ai-gateway/src/errors.rs]
//! Transport-category errors for the AI-service client (§7 taxonomy).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiGatewayError {
    #[error("AI service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("AI service returned an error response: {status}: {body}")]
    ServiceError { status: u16, body: String },
    #[error("AI service response could not be decoded: {0}")]
    Decode(String),
}
