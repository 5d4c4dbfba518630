pub mod fetch;
pub mod ffmpeg;

pub use fetch::YtDlpFetcher;
pub use ffmpeg::{check_ffmpeg, FfmpegTranscoder};

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Where one pipeline run gets its video from.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// A file uploaded with the request.
    Upload { file_name: String, bytes: Vec<u8> },
    /// A remote video to fetch.
    Url(String),
}

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the media behind `url` into `dest_dir`, returning the local path.
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert the source's audio track to mono 16 kHz 16-bit PCM WAV.
    async fn extract_audio(&self, input: &Path, output: &Path) -> Result<()>;
    /// Burn a subtitle file into the video, copying the audio stream.
    async fn burn_subtitles(&self, input: &Path, subtitles: &Path, output: &Path) -> Result<()>;
    /// Copy the video through unchanged.
    async fn copy_video(&self, input: &Path, output: &Path) -> Result<()>;
}
