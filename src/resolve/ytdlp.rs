use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::clip::ResolvedSource;
use crate::error::{ClipError, Result};

use super::StreamResolver;

/// Best progressive (audio and video in one file) format, preferring mp4.
const FORMAT_SELECTOR: &str = "best[ext=mp4]/best";

#[derive(Debug, Deserialize)]
struct VideoInfo {
    url: Option<String>,
    duration: Option<f64>,
    title: Option<String>,
    #[serde(default)]
    is_live: Option<bool>,
}

/// Parse the `--dump-json` output of yt-dlp.
fn parse_video_info(json: &str) -> Result<ResolvedSource> {
    let info: VideoInfo = serde_json::from_str(json.trim())
        .map_err(|e| ClipError::Resolve(format!("Unexpected yt-dlp output: {e}")))?;

    if info.is_live == Some(true) {
        return Err(ClipError::Resolve(
            "Live streams have no fixed length and cannot be clipped".to_string(),
        ));
    }

    let stream_url = info
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ClipError::Resolve("No single-file stream available".to_string()))?;

    let duration = info
        .duration
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ClipError::Resolve("Video length is unknown".to_string()))?;

    Ok(ResolvedSource {
        stream_url,
        total_duration_seconds: duration.floor() as i64,
        title: info.title,
    })
}

/// Resolver that shells out to yt-dlp.
pub struct YtDlpResolver {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new(PathBuf::from("yt-dlp"))
    }
}

impl YtDlpResolver {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the maximum time allowed for a single resolve call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl StreamResolver for YtDlpResolver {
    async fn resolve(&self, url: &str) -> Result<ResolvedSource> {
        debug!("Resolving {} with {}", url, self.binary.display());

        let child = Command::new(&self.binary)
            .args([
                "--dump-json",
                "--no-playlist",
                "--no-warnings",
                "-f",
                FORMAT_SELECTOR,
            ])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| {
                ClipError::Resolve(format!(
                    "yt-dlp timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ClipError::Resolve(format!(
                    "yt-dlp not found at '{}'. Error: {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipError::Resolve(stderr.trim().to_string()));
        }

        let resolved = parse_video_info(&String::from_utf8_lossy(&output.stdout))?;
        info!(
            "Resolved {} ({}s)",
            resolved.title.as_deref().unwrap_or(url),
            resolved.total_duration_seconds
        );
        Ok(resolved)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
