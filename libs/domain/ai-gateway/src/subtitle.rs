// [libs/domain/ai-gateway/src/subtitle.rs]
//! Subtitle / speech detection result, cached across an analysis window (§4.10).

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubtitleSpeechResult {
    pub subtitle_detected: bool,
    pub speech_detected: bool,
    #[serde(default)]
    pub language: Option<String>,
}
