pub mod download;
pub mod remote;

pub use download::DownloadThenCut;
pub use remote::RemoteSeekCut;

use crate::clip::{CutWindow, ResolvedSource};
use crate::config::{Config, Strategy};
use crate::error::{ClipError, Result};
use crate::transcode::{CodecSet, Transcoder};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings shared by both extraction strategies.
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub staging_dir: PathBuf,
    pub codecs: CodecSet,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            staging_dir: std::env::temp_dir(),
            codecs: CodecSet::default(),
        }
    }
}

impl From<&Config> for ExtractSettings {
    fn from(config: &Config) -> Self {
        Self {
            staging_dir: config.staging_dir(),
            codecs: config.codecs.clone(),
        }
    }
}

#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Write the `window` of `resolved` to `destination`.
    async fn execute(
        &self,
        resolved: &ResolvedSource,
        window: &CutWindow,
        destination: &Path,
    ) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Create the executor for a strategy.
pub fn create_strategy(
    strategy: Strategy,
    transcoder: Arc<dyn Transcoder>,
    settings: &ExtractSettings,
) -> Box<dyn ExtractionStrategy> {
    match strategy {
        Strategy::DownloadThenCut => Box::new(DownloadThenCut::new(
            transcoder,
            settings.staging_dir.clone(),
            settings.codecs.clone(),
        )),
        Strategy::RemoteSeekCut => {
            Box::new(RemoteSeekCut::new(transcoder, settings.codecs.clone()))
        }
    }
}

/// Fail early when the destination directory does not exist.
pub(crate) fn ensure_destination_dir(destination: &Path) -> Result<()> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };

    if !parent.is_dir() {
        return Err(ClipError::EncodeFailed(format!(
            "Destination directory does not exist: {}",
            parent.display()
        )));
    }

    Ok(())
}

pub(crate) fn as_download_failure(err: ClipError) -> ClipError {
    match err {
        ClipError::DownloadFailed(_) | ClipError::Cancelled => err,
        other => ClipError::DownloadFailed(other.to_string()),
    }
}

pub(crate) fn as_encode_failure(err: ClipError) -> ClipError {
    match err {
        ClipError::EncodeFailed(_) | ClipError::Cancelled => err,
        other => ClipError::EncodeFailed(other.to_string()),
    }
}
