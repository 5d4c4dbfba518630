pub mod whisper;

pub use whisper::WhisperClient;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// A timestamped unit of recognized speech.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

impl Segment {
    /// Derive a segment carrying new text with the same timing.
    pub fn with_text(&self, text: impl Into<String>) -> Segment {
        Segment {
            start: self.start,
            end: self.end,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub language: Option<String>,
}

impl Transcript {
    /// All non-empty segment texts joined with single spaces.
    pub fn joined_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a normalized waveform, requesting segment-level timestamps
    /// in the given spoken language.
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<Transcript>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start_ms: u64, end_ms: u64, text: &str) -> Segment {
        Segment {
            start: Duration::from_millis(start_ms),
            end: Duration::from_millis(end_ms),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_with_text_preserves_timing() {
        let original = seg(1500, 4000, "Hello");
        let translated = original.with_text("こんにちは");

        assert_eq!(translated.start, original.start);
        assert_eq!(translated.end, original.end);
        assert_eq!(translated.text, "こんにちは");
        assert_eq!(original.text, "Hello");
    }

    #[test]
    fn test_joined_text_skips_blank_segments() {
        let transcript = Transcript {
            segments: vec![seg(0, 1000, "Hello"), seg(1000, 2000, "  "), seg(2000, 3000, "world")],
            language: None,
        };
        assert_eq!(transcript.joined_text(), "Hello world");
    }

    #[test]
    fn test_joined_text_empty_transcript() {
        let transcript = Transcript {
            segments: vec![],
            language: None,
        };
        assert_eq!(transcript.joined_text(), "");
    }
}
