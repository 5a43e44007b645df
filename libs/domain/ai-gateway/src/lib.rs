// [libs/domain/ai-gateway/src/lib.rs]
//! External AI-service client abstraction: channel/banner extraction for C11, subtitle/speech
//! detection scheduling for C10, and batch translation for the `/server/translate/restart-batch`
//! endpoint (§4.10, §4.11, §6).

pub mod client;
pub mod errors;
pub mod subtitle;
pub mod translate;

pub use client::{AiGateway, HttpAiGateway};
pub use errors::AiGatewayError;
pub use subtitle::SubtitleSpeechResult;
pub use translate::{ContentBlocks, TranscriptSegments, TranslateBatchRequest, TranslateBatchResponse};
