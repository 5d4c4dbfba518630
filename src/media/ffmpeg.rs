//! FFmpeg-backed transcoding: audio extraction, subtitle burn-in, passthrough
//! copies.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, SubcastError};
use crate::media::Transcoder;

/// Rendering style for burned-in subtitles: bottom-centered white text in an
/// opaque box, sized for CJK glyphs.
const SUBTITLE_STYLE: &str = "Alignment=2,FontName=Noto Sans CJK JP,FontSize=24,\
PrimaryColour=&HFFFFFF,OutlineColour=&H000000,BorderStyle=3,Outline=1,Shadow=0,MarginV=35";

/// Check if FFmpeg is installed and accessible.
pub async fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            SubcastError::Transcode(format!(
                "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(SubcastError::Transcode("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, mut command: Command, what: &str, output_file: &Path) -> Result<()> {
        let output = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SubcastError::Transcode(format!("failed to run FFmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(5)..].join("\n");
            return Err(SubcastError::Transcode(format!("{what} failed: {tail}")));
        }

        if !output_file.exists() {
            return Err(SubcastError::Transcode(format!(
                "{what} produced no output file"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract_audio(&self, input: &Path, output: &Path) -> Result<()> {
        if !input.exists() {
            return Err(SubcastError::SourceUnavailable(
                input.display().to_string(),
            ));
        }

        info!("Extracting audio from {}", input.display());

        let mut command = Command::new("ffmpeg");
        command
            .args(["-y", "-i"])
            .arg(input)
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
            .arg(output);
        self.run(command, "audio extraction", output).await?;

        info!("Audio extracted to {}", output.display());
        Ok(())
    }

    async fn burn_subtitles(&self, input: &Path, subtitles: &Path, output: &Path) -> Result<()> {
        info!(
            "Burning subtitles {} into {}",
            subtitles.display(),
            input.display()
        );

        let filter = format!(
            "subtitles={}:force_style='{}'",
            subtitles.display(),
            SUBTITLE_STYLE
        );

        let mut command = Command::new("ffmpeg");
        command
            .args(["-y", "-i"])
            .arg(input)
            .arg("-vf")
            .arg(&filter)
            .args(["-c:a", "copy"])
            .arg(output);
        self.run(command, "subtitle burn-in", output).await
    }

    async fn copy_video(&self, input: &Path, output: &Path) -> Result<()> {
        debug!("Copying {} through unchanged", input.display());

        let mut command = Command::new("ffmpeg");
        command
            .args(["-y", "-i"])
            .arg(input)
            .args(["-c", "copy"])
            .arg(output);
        self.run(command, "video copy", output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffmpeg_available() -> bool {
        std::process::Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_check_ffmpeg() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: FFmpeg not available");
            return;
        }
        assert!(check_ffmpeg().await.is_ok());
    }

    #[tokio::test]
    async fn test_extract_audio_missing_input() {
        let transcoder = FfmpegTranscoder::new();
        let result = transcoder
            .extract_audio(Path::new("/nonexistent/input.mp4"), Path::new("/tmp/out.wav"))
            .await;
        assert!(matches!(result, Err(SubcastError::SourceUnavailable(_))));
    }

    #[test]
    fn test_subtitle_style_is_bottom_centered() {
        assert!(SUBTITLE_STYLE.contains("Alignment=2"));
        assert!(SUBTITLE_STYLE.contains("MarginV=35"));
    }
}
