//! Nijivoice text-to-speech client.

use crate::error::{Result, SubcastError};
use crate::synthesize::Synthesizer;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

/// Nijivoice platform API base URL.
const NIJIVOICE_API_URL: &str = "https://api.nijivoice.com/api/platform/v1";

/// Default voice actor used for narration.
pub const DEFAULT_VOICE_ACTOR_ID: &str = "8c08fd5b-b3eb-4294-b102-a1da00f09c72";

pub struct NijivoiceSynthesizer {
    client: Client,
    api_key: String,
    voice_actor_id: String,
    base_url: String,
}

impl NijivoiceSynthesizer {
    /// Create a new synthesizer with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            voice_actor_id: DEFAULT_VOICE_ACTOR_ID.to_string(),
            base_url: NIJIVOICE_API_URL.to_string(),
        }
    }

    /// Use a different voice actor.
    pub fn with_voice_actor(mut self, voice_actor_id: impl Into<String>) -> Self {
        self.voice_actor_id = voice_actor_id.into();
        self
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct GenerateVoiceRequest<'a> {
    script: &'a str,
    speed: &'a str,
    format: &'a str,
    pitch: &'a str,
    intonation: &'a str,
    volume: &'a str,
}

#[async_trait]
impl Synthesizer for NijivoiceSynthesizer {
    async fn synthesize(&self, script: &str) -> Result<Vec<u8>> {
        debug!(
            "Synthesizing {} chars with voice actor {}",
            script.len(),
            self.voice_actor_id
        );

        let url = format!(
            "{}/voice-actors/{}/generate-voice",
            self.base_url, self.voice_actor_id
        );
        let request = GenerateVoiceRequest {
            script,
            speed: "1.0",
            format: "mp3",
            pitch: "0",
            intonation: "1.0",
            volume: "1.0",
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubcastError::SynthesisFailed(format!("voice request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubcastError::SynthesisFailed(format!(
                "voice API error ({status}): {body}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            SubcastError::SynthesisFailed(format!("failed to read audio bytes: {e}"))
        })?;

        if bytes.is_empty() {
            return Err(SubcastError::SynthesisFailed(
                "voice API returned no audio data".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }

    fn audio_format(&self) -> &'static str {
        "mp3"
    }

    fn name(&self) -> &'static str {
        "nijivoice"
    }
}
