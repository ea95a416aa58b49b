pub mod ffmpeg;

pub use ffmpeg::{check_ffmpeg, FfmpegTranscoder};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Output codec pair used for every clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSet {
    pub video: String,
    pub audio: String,
    pub audio_bitrate: String,
}

impl Default for CodecSet {
    fn default() -> Self {
        Self {
            video: "libx264".to_string(),
            audio: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

/// Where the transcoder reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimInput {
    /// A staged file on local storage.
    Local(PathBuf),
    /// A directly fetchable stream URL.
    Remote(String),
}

impl TrimInput {
    fn as_arg(&self) -> OsString {
        match self {
            TrimInput::Local(path) => path.as_os_str().to_owned(),
            TrimInput::Remote(url) => OsString::from(url),
        }
    }
}

/// One trim-and-re-encode invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimJob {
    pub input: TrimInput,
    pub start_seconds: i64,
    pub duration_seconds: i64,
    pub output: PathBuf,
    pub codecs: CodecSet,
}

impl TrimJob {
    /// FFmpeg arguments: input-side seek, fixed duration, forced overwrite.
    pub fn ffmpeg_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect();

        args.push("-ss".into());
        args.push(self.start_seconds.to_string().into());
        args.push("-i".into());
        args.push(self.input.as_arg());
        args.push("-t".into());
        args.push(self.duration_seconds.to_string().into());
        args.push("-c:v".into());
        args.push(self.codecs.video.clone().into());
        args.push("-c:a".into());
        args.push(self.codecs.audio.clone().into());
        args.push("-b:a".into());
        args.push(self.codecs.audio_bitrate.clone().into());
        args.push(self.output.as_os_str().to_owned());
        args
    }
}

/// Media engine that fetches and cuts video bytes.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Copy the full stream at `source` into `staging`.
    async fn materialize(&self, source: &str, staging: &Path) -> Result<()>;

    /// Cut and re-encode according to `job`.
    async fn trim(&self, job: &TrimJob) -> Result<()>;

    /// Verify the engine is usable before any work is submitted.
    async fn check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
