//! Stub collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use ytclip::clip::ResolvedSource;
use ytclip::error::{ClipError, Result};
use ytclip::resolve::StreamResolver;
use ytclip::transcode::{Transcoder, TrimInput, TrimJob};

pub const STREAM_URL: &str = "https://cdn.example.com/videoplayback?id=42";

/// Resolver returning a fixed answer and counting calls.
pub struct StubResolver {
    pub calls: AtomicUsize,
    duration: i64,
    fail: bool,
}

impl StubResolver {
    pub fn with_duration(duration: i64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            duration,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            duration: 0,
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamResolver for StubResolver {
    async fn resolve(&self, _url: &str) -> Result<ResolvedSource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClipError::Resolve("Video unavailable".to_string()));
        }
        Ok(ResolvedSource {
            stream_url: STREAM_URL.to_string(),
            total_duration_seconds: self.duration,
            title: Some("Stub video".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Which step the recording transcoder should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Materialize,
    Trim,
    /// Panic inside `trim`.
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Materialize { source: String, staging: PathBuf },
    Trim(TrimJob),
}

/// Transcoder that writes placeholder files and records every call.
pub struct RecordingTranscoder {
    pub calls: Mutex<Vec<Call>>,
    /// Number of entries in `watch_dir` observed when `trim` ran.
    pub staged_during_trim: Mutex<Option<usize>>,
    watch_dir: Option<PathBuf>,
    fail_at: FailAt,
    trim_delay: Option<Duration>,
}

impl RecordingTranscoder {
    pub fn new(fail_at: FailAt) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            staged_during_trim: Mutex::new(None),
            watch_dir: None,
            fail_at,
            trim_delay: None,
        }
    }

    pub fn watching(mut self, dir: &Path) -> Self {
        self.watch_dir = Some(dir.to_path_buf());
        self
    }

    pub fn with_trim_delay(mut self, delay: Duration) -> Self {
        self.trim_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn staged_during_trim(&self) -> Option<usize> {
        *self.staged_during_trim.lock().unwrap()
    }
}

pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn materialize(&self, source: &str, staging: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Materialize {
            source: source.to_string(),
            staging: staging.to_path_buf(),
        });
        if self.fail_at == FailAt::Materialize {
            return Err(ClipError::DownloadFailed("connection reset".to_string()));
        }
        std::fs::write(staging, b"full video bytes")?;
        Ok(())
    }

    async fn trim(&self, job: &TrimJob) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Trim(job.clone()));
        if let Some(dir) = &self.watch_dir {
            *self.staged_during_trim.lock().unwrap() = Some(dir_entries(dir));
        }
        if let TrimInput::Local(path) = &job.input {
            assert!(path.exists(), "staged input missing during trim");
        }
        if let Some(delay) = self.trim_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at == FailAt::Panic {
            panic!("encoder crashed");
        }
        if self.fail_at == FailAt::Trim {
            return Err(ClipError::EncodeFailed("Unknown encoder 'libx264'".to_string()));
        }
        std::fs::write(&job.output, b"clip bytes")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
