use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ClipError, Result};

use super::{Transcoder, TrimJob};

/// Number of stderr lines kept in encode error messages.
const DIAGNOSTIC_TAIL_LINES: usize = 20;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Check if FFmpeg is installed and accessible.
pub async fn check_ffmpeg(ffmpeg: &Path) -> Result<()> {
    let output = Command::new(ffmpeg)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            ClipError::Config(format!(
                "FFmpeg not found at '{}'. \
                 Please install FFmpeg and ensure it's in your PATH. Error: {e}",
                ffmpeg.display()
            ))
        })?;

    if !output.status.success() {
        return Err(ClipError::Config("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Keep the last few lines of a diagnostic stream.
fn diagnostic_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
    lines[start..].join("\n")
}

fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// FFmpeg-backed transcoder. Staging downloads go over HTTP.
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    client: reqwest::Client,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(PathBuf::from("ffmpeg"))
    }
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: PathBuf) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .read_timeout(DEFAULT_READ_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { ffmpeg, client }
    }

    /// Use a preconfigured HTTP client for staging downloads.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn download(&self, url: &str, staging: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClipError::DownloadFailed(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClipError::DownloadFailed(format!(
                "Stream server returned {status}"
            )));
        }

        let mut file = tokio::fs::File::create(staging).await.map_err(|e| {
            ClipError::DownloadFailed(format!(
                "Cannot create staging file {}: {e}",
                staging.display()
            ))
        })?;

        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk =
                chunk.map_err(|e| ClipError::DownloadFailed(format!("Stream interrupted: {e}")))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ClipError::DownloadFailed(format!("Write to staging failed: {e}")))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ClipError::DownloadFailed(format!("Write to staging failed: {e}")))?;

        Ok(written)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn materialize(&self, source: &str, staging: &Path) -> Result<()> {
        info!("Downloading full stream to {}", staging.display());

        let bytes = if is_http(source) {
            self.download(source, staging).await?
        } else {
            tokio::fs::copy(source, staging).await.map_err(|e| {
                ClipError::DownloadFailed(format!("Cannot copy {source}: {e}"))
            })?
        };

        if bytes == 0 {
            return Err(ClipError::DownloadFailed(
                "Stream contained no data".to_string(),
            ));
        }

        debug!("Staged {} bytes", bytes);
        Ok(())
    }

    async fn trim(&self, job: &TrimJob) -> Result<()> {
        debug!(
            "Running {} with start={}s duration={}s",
            self.ffmpeg.display(),
            job.start_seconds,
            job.duration_seconds
        );

        let output = Command::new(&self.ffmpeg)
            .args(job.ffmpeg_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ClipError::EncodeFailed(format!("Failed to run FFmpeg: {e}")))?;

        if !output.status.success() {
            return Err(ClipError::EncodeFailed(format!(
                "FFmpeg exited with {}: {}",
                output.status,
                diagnostic_tail(&output.stderr)
            )));
        }

        if !job.output.exists() {
            return Err(ClipError::EncodeFailed(
                "Output file was not created".to_string(),
            ));
        }

        info!("Clip written to {}", job.output.display());
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        check_ffmpeg(&self.ffmpeg).await
    }

    fn name(&self) -> &'static str {
        "FFmpeg"
    }
}
