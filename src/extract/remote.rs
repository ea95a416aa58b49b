use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::clip::{CutWindow, ResolvedSource};
use crate::error::Result;
use crate::transcode::{CodecSet, Transcoder, TrimInput, TrimJob};

use super::{as_encode_failure, ensure_destination_dir, ExtractionStrategy};

/// Seek straight into the remote stream. Nothing is stored besides the output.
///
/// A dropped connection mid-transcode fails the whole request; the destination
/// may then hold a truncated file, which is left for the caller to inspect.
pub struct RemoteSeekCut {
    transcoder: Arc<dyn Transcoder>,
    codecs: CodecSet,
}

impl RemoteSeekCut {
    pub fn new(transcoder: Arc<dyn Transcoder>, codecs: CodecSet) -> Self {
        Self { transcoder, codecs }
    }
}

#[async_trait]
impl ExtractionStrategy for RemoteSeekCut {
    async fn execute(
        &self,
        resolved: &ResolvedSource,
        window: &CutWindow,
        destination: &Path,
    ) -> Result<()> {
        ensure_destination_dir(destination)?;

        let job = TrimJob {
            input: TrimInput::Remote(resolved.stream_url.clone()),
            start_seconds: window.start_seconds,
            duration_seconds: window.duration_seconds(),
            output: destination.to_path_buf(),
            codecs: self.codecs.clone(),
        };

        self.transcoder.trim(&job).await.map_err(as_encode_failure)?;

        info!(
            "Cut {}s..{}s directly from remote stream",
            window.start_seconds, window.end_seconds
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "remote-seek-cut"
    }
}
