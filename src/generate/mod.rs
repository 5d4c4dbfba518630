pub mod openai;

pub use openai::OpenAiGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Text-transformation boundary: per-line translation for subtitles and
/// whole-transcript summarization for narration scripts.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
    async fn summarize(&self, transcript: &str, language: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}
