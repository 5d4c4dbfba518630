use crate::error::{Result, SubcastError};
use crate::synthesize::nijivoice::DEFAULT_VOICE_ACTOR_ID;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback transcription/generation API key when a request carries none.
    pub openai_api_key: Option<String>,
    /// Fallback speech-synthesis API key when a request carries none.
    pub voice_api_key: Option<String>,
    /// Voice actor used for narration audio.
    pub voice_actor_id: String,
    /// Language spoken in videos submitted for subtitling (ISO 639-1).
    pub spoken_language: String,
    /// Language subtitles are translated into.
    pub subtitle_language: String,
    /// Language of narration sources and scripts.
    pub narration_language: String,
    /// Minimum on-screen duration for one subtitle entry.
    pub min_subtitle_duration_ms: u64,
    /// Upper bound for any single pipeline stage.
    pub stage_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            voice_api_key: None,
            voice_actor_id: DEFAULT_VOICE_ACTOR_ID.to_string(),
            spoken_language: "en".to_string(),
            subtitle_language: "ja".to_string(),
            narration_language: "ja".to_string(),
            min_subtitle_duration_ms: 500,
            stage_timeout_secs: 600,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("NIJIVOICE_API_KEY") {
            config.voice_api_key = Some(key);
        }
        if let Ok(id) = std::env::var("SUBCAST_VOICE_ACTOR_ID") {
            config.voice_actor_id = id;
        }
        if let Ok(lang) = std::env::var("SUBCAST_SPOKEN_LANGUAGE") {
            config.spoken_language = lang;
        }
        if let Ok(lang) = std::env::var("SUBCAST_SUBTITLE_LANGUAGE") {
            config.subtitle_language = lang;
        }
        if let Ok(lang) = std::env::var("SUBCAST_NARRATION_LANGUAGE") {
            config.narration_language = lang;
        }
        if let Ok(ms) = std::env::var("SUBCAST_MIN_SUBTITLE_DURATION_MS") {
            if let Ok(ms) = ms.parse() {
                config.min_subtitle_duration_ms = ms;
            }
        }
        if let Ok(secs) = std::env::var("SUBCAST_STAGE_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.stage_timeout_secs = secs;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spoken_language.trim().is_empty()
            || self.subtitle_language.trim().is_empty()
            || self.narration_language.trim().is_empty()
        {
            return Err(SubcastError::Config(
                "Language codes must not be empty".to_string(),
            ));
        }

        if self.voice_actor_id.trim().is_empty() {
            return Err(SubcastError::Config(
                "Voice actor id must not be empty".to_string(),
            ));
        }

        if self.min_subtitle_duration_ms == 0 {
            return Err(SubcastError::Config(
                "Minimum subtitle duration must be greater than 0".to_string(),
            ));
        }

        if self.stage_timeout_secs == 0 {
            return Err(SubcastError::Config(
                "Stage timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("subcast").join("config.toml"))
    }
}
