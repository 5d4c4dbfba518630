//! Remote video acquisition via yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, SubcastError};
use crate::media::MediaFetcher;

/// Basename for fetched videos; the container extension is chosen by the
/// downloader.
const OUTPUT_STEM: &str = "video";

pub struct YtDlpFetcher {
    program: String,
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
        }
    }

    /// Use a different downloader binary (e.g. an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Check if the downloader binary is available.
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let template = dest_dir.join(format!("{OUTPUT_STEM}.%(ext)s"));
        info!("Fetching {} into {:?}", url, dest_dir);

        let output = Command::new(&self.program)
            .args(["--format", "best", "--no-playlist", "--output"])
            .arg(&template)
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                SubcastError::SourceUnavailable(format!(
                    "failed to run {}: {e}. Install it: https://github.com/yt-dlp/yt-dlp",
                    self.program
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubcastError::SourceUnavailable(format!(
                "{} failed: {}",
                self.program,
                stderr.trim()
            )));
        }

        let path = find_downloaded(dest_dir)?;
        debug!("Fetched video at {:?}", path);
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Locate the downloaded file; the exact extension depends on the source.
fn find_downloaded(dir: &Path) -> Result<PathBuf> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry
            .file_name()
            .to_string_lossy()
            .starts_with(&format!("{OUTPUT_STEM}."))
        {
            return Ok(entry.path());
        }
    }
    Err(SubcastError::SourceUnavailable(
        "downloaded video not found in scratch directory".to_string(),
    ))
}
