use crate::error::{Result, SubcastError};
use crate::transcribe::{Segment, Transcriber, Transcript};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// OpenAI Whisper API endpoint.
const WHISPER_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Maximum file size accepted by the Whisper API (25 MB).
const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// OpenAI Whisper API client.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl WhisperClient {
    /// Create a new Whisper client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: "whisper-1".to_string(),
            base_url: WHISPER_API_URL.to_string(),
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the multipart form for the API request.
    async fn build_form(&self, audio_path: &Path, language: &str) -> Result<Form> {
        let file_bytes = fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        Ok(Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .text("language", language.to_string()))
    }

    async fn call_api(&self, form: Form) -> Result<WhisperResponse> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Whisper API response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(SubcastError::TranscriptionUnavailable(format!(
                    "Whisper API error: {} ({})",
                    api_error.error.message, api_error.error.r#type
                )));
            }
            return Err(SubcastError::TranscriptionUnavailable(format!(
                "Whisper API error ({status}): {body}"
            )));
        }

        let parsed: WhisperResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }

    /// Convert a Whisper API response to our Transcript format.
    fn parse_response(&self, response: WhisperResponse) -> Result<Transcript> {
        let api_segments = response.segments.ok_or_else(|| {
            SubcastError::TranscriptionUnavailable(
                "transcription response carried no segment data".to_string(),
            )
        })?;

        let segments = api_segments
            .into_iter()
            .map(|seg| Segment {
                start: Duration::from_secs_f64(seg.start.max(0.0)),
                end: Duration::from_secs_f64(seg.end.max(0.0)),
                text: seg.text.trim().to_string(),
            })
            .collect();

        Ok(Transcript {
            segments,
            language: response.language,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<Transcript> {
        debug!("Transcribing {:?} with Whisper ({})", audio, language);

        let metadata = fs::metadata(audio).await?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(SubcastError::TranscriptionUnavailable(format!(
                "file too large for Whisper API: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_FILE_SIZE
            )));
        }

        let form = self.build_form(audio, language).await?;
        let response = self.call_api(form).await?;
        let transcript = self.parse_response(response)?;

        debug!("Whisper returned {} segments", transcript.segments.len());
        Ok(transcript)
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    segments: Option<Vec<WhisperSegment>>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_with_segments() {
        let client = WhisperClient::new("test-key".to_string());

        let response = WhisperResponse {
            segments: Some(vec![
                WhisperSegment {
                    start: 0.0,
                    end: 2.0,
                    text: " Hello world. ".to_string(),
                },
                WhisperSegment {
                    start: 2.5,
                    end: 4.0,
                    text: "How are you?".to_string(),
                },
            ]),
            language: Some("en".to_string()),
        };

        let transcript = client.parse_response(response).unwrap();
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].text, "Hello world.");
        assert_eq!(transcript.segments[0].start, Duration::ZERO);
        assert_eq!(transcript.segments[1].start, Duration::from_millis(2500));
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_parse_response_without_segments_is_unavailable() {
        let client = WhisperClient::new("test-key".to_string());

        let response = WhisperResponse {
            segments: None,
            language: Some("en".to_string()),
        };

        let result = client.parse_response(response);
        assert!(matches!(
            result,
            Err(SubcastError::TranscriptionUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_response_empty_segments_is_empty_transcript() {
        let client = WhisperClient::new("test-key".to_string());

        let response = WhisperResponse {
            segments: Some(vec![]),
            language: None,
        };

        let transcript = client.parse_response(response).unwrap();
        assert!(transcript.segments.is_empty());
    }

    #[tokio::test]
    async fn test_transcribe_missing_file_errors() {
        let client = WhisperClient::new("test-key".to_string());
        let result = client
            .transcribe(Path::new("/tmp/nonexistent_subcast_test.wav"), "en")
            .await;
        assert!(result.is_err());
    }
}
