//! Chat-completion-backed translation and narration scripting.

use crate::error::{Result, SubcastError};
use crate::generate::Generator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI chat completions endpoint.
const CHAT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Sampling temperature for subtitle translation.
const TRANSLATE_TEMPERATURE: f32 = 0.3;

/// Sampling temperature for narration scripts.
const SUMMARIZE_TEMPERATURE: f32 = 0.7;

pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGenerator {
    /// Create a new generator with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: "gpt-4o-mini".to_string(),
            base_url: CHAT_API_URL.to_string(),
        }
    }

    /// Set a different model (e.g. "gpt-4o").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn translate_prompt(text: &str, target_lang: &str) -> String {
        let lang_name = language_code_to_name(target_lang);
        format!(
            "Translate the following subtitle line into natural, conversational {lang_name}. \
Keep the nuance of spoken dialogue and return ONLY the translation.\n\n{text}"
        )
    }

    fn summarize_prompt(transcript: &str, language: &str) -> String {
        let lang_name = language_code_to_name(language);
        format!(
            "Based on the transcript below, write a short podcast narration script in {lang_name} \
that explains the video's main points in a friendly spoken style, using playful comparisons \
where they help. Keep it to about 100 characters and return ONLY the script.\n\n\
Transcript:\n{transcript}"
        )
    }

    async fn complete(&self, prompt: String, temperature: f32) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| SubcastError::GenerationFailed(format!("chat request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubcastError::GenerationFailed(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(SubcastError::GenerationFailed(format!(
                "chat API error ({status}): {body}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            SubcastError::GenerationFailed(format!("failed to parse chat response: {e}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(SubcastError::GenerationFailed(error.message));
        }

        let content = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(SubcastError::GenerationFailed(
                "chat response contained no text".to_string(),
            ));
        }

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        debug!("Translating {} chars to {}", text.len(), target_lang);
        self.complete(Self::translate_prompt(text, target_lang), TRANSLATE_TEMPERATURE)
            .await
    }

    async fn summarize(&self, transcript: &str, language: &str) -> Result<String> {
        debug!("Summarizing {} chars of transcript", transcript.len());
        self.complete(
            Self::summarize_prompt(transcript, language),
            SUMMARIZE_TEMPERATURE,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "openai-chat"
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ChatError>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatError {
    message: String,
}

/// Convert a language code to a human-readable name for prompting.
fn language_code_to_name(code: &str) -> &'static str {
    match code.to_lowercase().as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "id" => "Indonesian",
        "nl" => "Dutch",
        "pl" => "Polish",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "sv" => "Swedish",
        "fi" => "Finnish",
        "no" => "Norwegian",
        "da" => "Danish",
        _ => "the target language",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_creation() {
        let generator = OpenAiGenerator::new("test-key".to_string());
        assert_eq!(generator.name(), "openai-chat");
        assert_eq!(generator.model, "gpt-4o-mini");
    }

    #[test]
    fn test_with_model() {
        let generator = OpenAiGenerator::new("test-key".to_string()).with_model("gpt-4o");
        assert_eq!(generator.model, "gpt-4o");
    }

    #[test]
    fn test_translate_prompt_names_language() {
        let prompt = OpenAiGenerator::translate_prompt("Hello, world!", "ja");
        assert!(prompt.contains("Japanese"));
        assert!(prompt.contains("Hello, world!"));
    }

    #[test]
    fn test_summarize_prompt_contains_transcript() {
        let prompt = OpenAiGenerator::summarize_prompt("A video about cats.", "ja");
        assert!(prompt.contains("Japanese"));
        assert!(prompt.contains("A video about cats."));
        assert!(prompt.contains("podcast"));
    }

    #[test]
    fn test_language_code_to_name() {
        assert_eq!(language_code_to_name("ja"), "Japanese");
        assert_eq!(language_code_to_name("EN"), "English");
        assert_eq!(language_code_to_name("xyz"), "the target language");
    }
}
