//! The fixed-order media pipeline behind both operations.
//!
//! One `Pipeline` owns the external-collaborator adapters and runs each
//! request through the same stage sequence: acquire source, extract audio,
//! transcribe, transform, produce output. Every temp artifact is registered
//! in the run's [`Scratch`] the moment it is created, so cleanup happens on
//! every exit path, including client disconnects that drop the request
//! future mid-stage.

use crate::error::{Result, SubcastError};
use crate::generate::Generator;
use crate::media::{MediaFetcher, MediaSource, Transcoder};
use crate::scratch::Scratch;
use crate::subtitle::{self, SrtFormatter, SubtitleFormatter};
use crate::synthesize::Synthesizer;
use crate::transcribe::{Segment, Transcriber};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

/// Options shared by both pipeline operations.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Language spoken in videos submitted for subtitling (ISO 639-1).
    pub spoken_language: String,
    /// Language subtitles are translated into.
    pub subtitle_language: String,
    /// Language of narration sources and scripts.
    pub narration_language: String,
    /// Minimum on-screen duration for one subtitle entry.
    pub min_subtitle_duration: Duration,
    /// Upper bound for any single pipeline stage.
    pub stage_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            spoken_language: "en".to_string(),
            subtitle_language: "ja".to_string(),
            narration_language: "ja".to_string(),
            min_subtitle_duration: subtitle::MIN_DURATION,
            stage_timeout: Duration::from_secs(600),
        }
    }
}

/// A subtitled video ready for delivery.
#[derive(Debug)]
pub struct SubtitleOutput {
    pub video: Vec<u8>,
    pub media_type: &'static str,
    pub file_name: &'static str,
    /// Entries burned in; zero means the source was copied through unchanged.
    pub entries: usize,
}

/// A narrated summary ready for delivery.
#[derive(Debug)]
pub struct NarrationOutput {
    /// Inline `data:` URI carrying the narration audio.
    pub audio_data: String,
    pub script: String,
}

pub struct Pipeline {
    fetcher: Arc<dyn MediaFetcher>,
    transcoder: Arc<dyn Transcoder>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn Generator>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        transcoder: Arc<dyn Transcoder>,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn Generator>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            fetcher,
            transcoder,
            transcriber,
            generator,
            synthesizer: None,
            options,
        }
    }

    /// Attach a speech synthesizer; required for narration runs only.
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Produce a copy of the source video with translated subtitles burned in.
    pub async fn subtitle_video(&self, source: MediaSource) -> Result<SubtitleOutput> {
        let scratch = Scratch::new()?;

        info!("Stage 1/5: Acquiring source video");
        let input_path = self.acquire_source(&scratch, source).await?;

        info!("Stage 2/5: Extracting audio");
        let audio_path = self.extract_audio(&scratch, &input_path).await?;

        info!(
            "Stage 3/5: Transcribing ({})",
            self.options.spoken_language
        );
        let transcript = self
            .bounded(
                "transcription",
                self.transcriber
                    .transcribe(&audio_path, &self.options.spoken_language),
                SubcastError::TranscriptionUnavailable,
            )
            .await?;
        info!(
            "Transcription produced {} segments",
            transcript.segments.len()
        );

        info!(
            "Stage 4/5: Translating segments to {}",
            self.options.subtitle_language
        );
        let translated = self.translate_segments(&transcript.segments).await?;
        let entries = subtitle::build_entries(&translated, self.options.min_subtitle_duration);
        let formatter = SrtFormatter;
        let subtitle_text = formatter.format(&entries);

        info!("Stage 5/5: Producing output video ({} entries)", entries.len());
        let output_path = scratch.register(scratch.path().join("output.mp4"));
        if subtitle_text.is_empty() {
            info!("No subtitles survived filtering; copying source through unchanged");
            self.bounded(
                "video copy",
                self.transcoder.copy_video(&input_path, &output_path),
                SubcastError::Transcode,
            )
            .await?;
        } else {
            let subtitle_path = scratch.register(
                scratch
                    .path()
                    .join(format!("subtitles.{}", formatter.extension())),
            );
            fs::write(&subtitle_path, &subtitle_text).await?;
            self.bounded(
                "subtitle burn-in",
                self.transcoder
                    .burn_subtitles(&input_path, &subtitle_path, &output_path),
                SubcastError::Transcode,
            )
            .await?;
        }

        let video = fs::read(&output_path).await?;
        Ok(SubtitleOutput {
            video,
            media_type: "video/mp4",
            file_name: "output.mp4",
            entries: entries.len(),
        })
    }

    /// Produce a short narrated audio summary of the video behind `url`.
    pub async fn narrate(&self, url: &str) -> Result<NarrationOutput> {
        let synthesizer = self.synthesizer.clone().ok_or_else(|| {
            SubcastError::Config("no speech synthesizer configured for narration".to_string())
        })?;
        let scratch = Scratch::new()?;

        info!("Stage 1/5: Acquiring source video");
        let input_path = self
            .acquire_source(&scratch, MediaSource::Url(url.to_string()))
            .await?;

        info!("Stage 2/5: Extracting audio");
        let audio_path = self.extract_audio(&scratch, &input_path).await?;

        info!(
            "Stage 3/5: Transcribing ({})",
            self.options.narration_language
        );
        let transcript = self
            .bounded(
                "transcription",
                self.transcriber
                    .transcribe(&audio_path, &self.options.narration_language),
                SubcastError::TranscriptionUnavailable,
            )
            .await?;

        info!("Stage 4/5: Generating narration script");
        let joined = transcript.joined_text();
        let script = self
            .bounded(
                "script generation",
                self.generator
                    .summarize(&joined, &self.options.narration_language),
                SubcastError::GenerationFailed,
            )
            .await?;
        debug!("Narration script: {script}");

        info!("Stage 5/5: Synthesizing narration audio");
        let audio_bytes = self
            .bounded(
                "speech synthesis",
                synthesizer.synthesize(&script),
                SubcastError::SynthesisFailed,
            )
            .await?;

        let format = synthesizer.audio_format();
        let narration_path = scratch.register(scratch.path().join(format!("narration.{format}")));
        fs::write(&narration_path, &audio_bytes).await?;
        let stored = fs::read(&narration_path).await?;
        let audio_data = format!("data:audio/{format};base64,{}", BASE64.encode(&stored));

        Ok(NarrationOutput { audio_data, script })
    }

    async fn acquire_source(&self, scratch: &Scratch, source: MediaSource) -> Result<PathBuf> {
        match source {
            MediaSource::Upload { file_name, bytes } => {
                if bytes.is_empty() {
                    return Err(SubcastError::SourceUnavailable(
                        "uploaded file is empty".to_string(),
                    ));
                }
                let ext = Path::new(&file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("mp4");
                let path = scratch.register(scratch.path().join(format!("upload.{ext}")));
                fs::write(&path, &bytes).await?;
                debug!("Stored {}-byte upload at {:?}", bytes.len(), path);
                Ok(path)
            }
            MediaSource::Url(url) => {
                if url.trim().is_empty() {
                    return Err(SubcastError::BadRequest(
                        "no video URL provided".to_string(),
                    ));
                }
                let path = self
                    .bounded(
                        "source fetch",
                        self.fetcher.fetch(&url, scratch.path()),
                        SubcastError::SourceUnavailable,
                    )
                    .await?;
                Ok(scratch.register(path))
            }
        }
    }

    async fn extract_audio(&self, scratch: &Scratch, input: &Path) -> Result<PathBuf> {
        let audio_path = scratch.register(scratch.path().join("audio.wav"));
        self.bounded(
            "audio extraction",
            self.transcoder.extract_audio(input, &audio_path),
            SubcastError::Transcode,
        )
        .await?;
        Ok(audio_path)
    }

    /// Translate segments one at a time, in input order. Blank segments pass
    /// through untouched; the formatter drops them later.
    async fn translate_segments(&self, segments: &[Segment]) -> Result<Vec<Segment>> {
        let mut translated = Vec::with_capacity(segments.len());
        for segment in segments {
            let text = segment.text.trim();
            if text.is_empty() {
                translated.push(segment.clone());
                continue;
            }
            let rendered = self
                .bounded(
                    "translation",
                    self.generator
                        .translate(text, &self.options.subtitle_language),
                    SubcastError::GenerationFailed,
                )
                .await?;
            translated.push(segment.with_text(rendered));
        }
        Ok(translated)
    }

    /// Run one stage under the configured timeout; expiry becomes that
    /// stage's fatal error kind.
    async fn bounded<T, F>(
        &self,
        stage: &'static str,
        fut: F,
        on_timeout: fn(String) -> SubcastError,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.options.stage_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(format!(
                "{stage} timed out after {:?}",
                self.options.stage_timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_options_default() {
        let options = PipelineOptions::default();
        assert_eq!(options.spoken_language, "en");
        assert_eq!(options.subtitle_language, "ja");
        assert_eq!(options.narration_language, "ja");
        assert_eq!(options.min_subtitle_duration, Duration::from_millis(500));
        assert_eq!(options.stage_timeout, Duration::from_secs(600));
    }
}
