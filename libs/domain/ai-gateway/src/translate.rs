// [libs/domain/ai-gateway/src/translate.rs]
//! Wire types for `POST /server/translate/restart-batch` (§6, scenario S6).

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranscriptSegments {
    pub texts: Vec<String>,
    pub source_language: String,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub chunk_index: Option<u32>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentBlocks {
    #[serde(default)]
    pub video_summary: Option<String>,
    #[serde(default)]
    pub audio_transcript: Option<String>,
    #[serde(default)]
    pub frame_descriptions: Option<String>,
    #[serde(default)]
    pub frame_subtitles: Option<String>,
    #[serde(default)]
    pub transcript_segments: Option<TranscriptSegments>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateBatchRequest {
    pub host_name: String,
    pub content_blocks: ContentBlocks,
    pub target_language: String,
}

/// Mirrors `content_blocks` field-for-field; `transcript_segments`, when the request carried
/// one, returns a parallel translated array with empty entries preserved as empty (S6).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranslateBatchResponse {
    #[serde(default)]
    pub video_summary: Option<String>,
    #[serde(default)]
    pub audio_transcript: Option<String>,
    #[serde(default)]
    pub frame_descriptions: Option<String>,
    #[serde(default)]
    pub frame_subtitles: Option<String>,
    #[serde(default)]
    pub transcript_segments: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mirrors scenario S6: an empty input string in `texts` stays empty in the translated
    /// output array rather than being dropped or translated into something non-empty. This is
    /// a wire-shape guarantee the client must preserve when decoding the AI service's response,
    /// not a guarantee this crate computes itself.
    #[test]
    fn response_preserves_positional_alignment_with_empty_entries() {
        let response = TranslateBatchResponse {
            transcript_segments: Some(vec!["Hola".into(), "Cómo estás".into(), "".into()]),
            ..Default::default()
        };
        let segments = response.transcript_segments.unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2], "");
    }
}
