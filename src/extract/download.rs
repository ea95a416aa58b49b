use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::clip::{CutWindow, ResolvedSource};
use crate::error::{ClipError, Result};
use crate::transcode::{CodecSet, Transcoder, TrimInput, TrimJob};

use super::{as_download_failure, as_encode_failure, ensure_destination_dir, ExtractionStrategy};

/// Materialize the whole stream into a staging file, then cut it locally.
pub struct DownloadThenCut {
    transcoder: Arc<dyn Transcoder>,
    staging_dir: PathBuf,
    codecs: CodecSet,
}

impl DownloadThenCut {
    pub fn new(transcoder: Arc<dyn Transcoder>, staging_dir: PathBuf, codecs: CodecSet) -> Self {
        Self {
            transcoder,
            staging_dir,
            codecs,
        }
    }

    /// Reserve a uniquely named staging file. It is deleted when the guard drops.
    fn create_staging_file(&self) -> Result<TempPath> {
        let file = tempfile::Builder::new()
            .prefix("ytclip-")
            .suffix(".mp4")
            .tempfile_in(&self.staging_dir)
            .map_err(|e| {
                ClipError::DownloadFailed(format!(
                    "Cannot create staging file in {}: {e}",
                    self.staging_dir.display()
                ))
            })?;

        // Close our handle so the transcoder can reopen the path.
        Ok(file.into_temp_path())
    }

    async fn download_and_cut(
        &self,
        resolved: &ResolvedSource,
        window: &CutWindow,
        destination: &Path,
        staged: &Path,
    ) -> Result<()> {
        self.transcoder
            .materialize(&resolved.stream_url, staged)
            .await
            .map_err(as_download_failure)?;

        let job = TrimJob {
            input: TrimInput::Local(staged.to_path_buf()),
            start_seconds: window.start_seconds,
            duration_seconds: window.duration_seconds(),
            output: destination.to_path_buf(),
            codecs: self.codecs.clone(),
        };

        self.transcoder.trim(&job).await.map_err(as_encode_failure)
    }
}

#[async_trait]
impl ExtractionStrategy for DownloadThenCut {
    async fn execute(
        &self,
        resolved: &ResolvedSource,
        window: &CutWindow,
        destination: &Path,
    ) -> Result<()> {
        ensure_destination_dir(destination)?;

        let staged = self.create_staging_file()?;
        debug!("Staging to {}", staged.display());

        let result = self
            .download_and_cut(resolved, window, destination, &staged)
            .await;

        let staged_path = staged.to_path_buf();
        match staged.close() {
            Ok(()) => debug!("Removed staging file {}", staged_path.display()),
            Err(e) => warn!(
                "Failed to remove staging file {}: {}",
                staged_path.display(),
                e
            ),
        }

        if result.is_ok() {
            info!(
                "Cut {}s..{}s from staged download",
                window.start_seconds, window.end_seconds
            );
        }
        result
    }

    fn name(&self) -> &'static str {
        "download-then-cut"
    }
}
