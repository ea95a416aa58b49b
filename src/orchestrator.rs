use crate::clip::{parse_duration, parse_time_spec, plan, ClipRequest, CutWindow};
use crate::config::{Config, Strategy};
use crate::error::{ClipError, FailureKind, InvalidFields, Result};
use crate::extract::{create_strategy, ExtractSettings};
use crate::resolve::{StreamResolver, YtDlpResolver};
use crate::transcode::{FfmpegTranscoder, Transcoder};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

/// How often a running stage checks the cancellation flag.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of one clip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    Idle,
    Validating,
    Resolving,
    Planning,
    Extracting,
    Done,
    Failed(FailureKind),
}

impl ClipState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClipState::Done | ClipState::Failed(_))
    }
}

impl std::fmt::Display for ClipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipState::Idle => write!(f, "idle"),
            ClipState::Validating => write!(f, "validating"),
            ClipState::Resolving => write!(f, "resolving"),
            ClipState::Planning => write!(f, "planning"),
            ClipState::Extracting => write!(f, "extracting"),
            ClipState::Done => write!(f, "done"),
            ClipState::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// Raw caller input, exactly as collected.
#[derive(Debug, Clone)]
pub struct ClipSubmission {
    pub url: String,
    pub start_hours: String,
    pub start_minutes: String,
    pub start_seconds: String,
    pub duration: String,
    pub destination: PathBuf,
    pub strategy: Strategy,
}

impl ClipSubmission {
    /// Turn the raw fields into a `ClipRequest` without touching network or disk.
    pub fn validate(&self) -> Result<ClipRequest> {
        let start = parse_time_spec(&self.start_hours, &self.start_minutes, &self.start_seconds);
        let duration = parse_duration(&self.duration);

        let (start, duration_seconds) = match (start, duration) {
            (Ok(start), Ok(duration)) => (start, duration),
            (start, duration) => {
                let mut invalid = InvalidFields::default();
                for err in [start.err(), duration.err()].into_iter().flatten() {
                    if let ClipError::InvalidTimeFormat(fields) = err {
                        invalid.0.extend(fields.0);
                    }
                }
                return Err(ClipError::InvalidTimeFormat(invalid));
            }
        };

        if duration_seconds <= 0 {
            return Err(ClipError::NonPositiveDuration(duration_seconds));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(ClipError::DestinationUnselected);
        }

        let url = self.url.trim();
        if url.is_empty() {
            return Err(ClipError::Resolve("No video URL provided".to_string()));
        }

        let mut destination = self.destination.clone();
        if destination.extension().is_none() {
            destination.set_extension("mp4");
        }

        Ok(ClipRequest {
            source_url: url.to_string(),
            start,
            duration_seconds,
            destination,
            strategy: self.strategy,
        })
    }
}

/// Details of a finished clip.
#[derive(Debug, Clone)]
pub struct ClipReport {
    pub destination: PathBuf,
    pub window: CutWindow,
    pub strategy: Strategy,
    pub source_title: Option<String>,
    pub source_duration_seconds: i64,
    pub resolve_time: Duration,
    pub extract_time: Duration,
    pub total_time: Duration,
}

/// The single terminal result delivered to the caller.
#[derive(Debug, Clone)]
pub enum ClipOutcome {
    Success(ClipReport),
    Failure { kind: FailureKind, message: String },
}

impl ClipOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClipOutcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ClipOutcome::Success(_) => None,
            ClipOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<Result<ClipReport>> for ClipOutcome {
    fn from(result: Result<ClipReport>) -> Self {
        match result {
            Ok(report) => ClipOutcome::Success(report),
            Err(e) => ClipOutcome::Failure {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

/// Caller-side view of a submitted request.
pub struct RequestHandle {
    id: u64,
    state: watch::Receiver<ClipState>,
    outcome: oneshot::Receiver<ClipOutcome>,
    cancelled: Arc<AtomicBool>,
}

impl RequestHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current state of the request.
    pub fn state(&self) -> ClipState {
        *self.state.borrow()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ClipState> {
        self.state.clone()
    }

    /// Ask the request to stop. A running transcoder process is killed and
    /// any staging file is discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// The flag behind [`RequestHandle::cancel`], for signal handlers.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Non-blocking poll for the outcome.
    pub fn try_outcome(&mut self) -> Option<ClipOutcome> {
        match self.outcome.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(lost_outcome()),
        }
    }

    /// Wait for the terminal outcome.
    pub async fn outcome(self) -> ClipOutcome {
        self.outcome.await.unwrap_or_else(|_| lost_outcome())
    }
}

fn lost_outcome() -> ClipOutcome {
    ClipOutcome::Failure {
        kind: FailureKind::Internal,
        message: "Clip task ended without reporting an outcome".to_string(),
    }
}

/// Publishes state transitions for one request.
struct StateReporter {
    id: u64,
    tx: watch::Sender<ClipState>,
}

impl StateReporter {
    fn enter(&self, state: ClipState) {
        debug!("Request {}: {}", self.id, state);
        self.tx.send_replace(state);
    }
}

async fn wait_for_cancel(cancelled: &AtomicBool) {
    while !cancelled.load(Ordering::Relaxed) {
        tokio::time::sleep(CANCEL_POLL_INTERVAL).await;
    }
}

/// Run `stage` unless cancellation is requested first. Dropping the stage
/// future kills child processes and removes staging files.
async fn cancellable<T, F>(cancelled: &AtomicBool, stage: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancelled.load(Ordering::Relaxed) {
        return Err(ClipError::Cancelled);
    }

    tokio::select! {
        result = stage => result,
        _ = wait_for_cancel(cancelled) => Err(ClipError::Cancelled),
    }
}

/// Sequences validation, resolution, planning and extraction for clip requests.
#[derive(Clone)]
pub struct ClipOrchestrator {
    resolver: Arc<dyn StreamResolver>,
    transcoder: Arc<dyn Transcoder>,
    settings: ExtractSettings,
}

impl ClipOrchestrator {
    pub fn new(
        resolver: Arc<dyn StreamResolver>,
        transcoder: Arc<dyn Transcoder>,
        settings: ExtractSettings,
    ) -> Self {
        Self {
            resolver,
            transcoder,
            settings,
        }
    }

    /// Build an orchestrator backed by yt-dlp and FFmpeg.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = YtDlpResolver::new(config.ytdlp_path.clone())
            .with_timeout(config.resolve_timeout());

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .build()
            .map_err(|e| ClipError::Config(format!("Failed to build HTTP client: {}", e)))?;
        let transcoder = FfmpegTranscoder::new(config.ffmpeg_path.clone()).with_client(client);

        Ok(Self::new(
            Arc::new(resolver),
            Arc::new(transcoder),
            ExtractSettings::from(config),
        ))
    }

    pub fn transcoder(&self) -> &Arc<dyn Transcoder> {
        &self.transcoder
    }

    /// Start a request on its own task and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, submission: ClipSubmission) -> RequestHandle {
        let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        let (state_tx, state_rx) = watch::channel(ClipState::Idle);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        let orchestrator = self.clone();
        let flag = cancelled.clone();
        tokio::spawn(async move {
            let reporter = StateReporter { id, tx: state_tx };
            let run = orchestrator.drive(submission, &reporter, &flag);
            let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(result) => ClipOutcome::from(result),
                Err(_) => {
                    error!("Request {}: clip task panicked", id);
                    reporter.enter(ClipState::Failed(FailureKind::Internal));
                    lost_outcome()
                }
            };
            if outcome_tx.send(outcome).is_err() {
                debug!("Request {}: caller dropped the handle", id);
            }
        });

        RequestHandle {
            id,
            state: state_rx,
            outcome: outcome_rx,
            cancelled,
        }
    }

    /// Run a request to completion on the current task.
    pub async fn run(&self, submission: ClipSubmission) -> Result<ClipReport> {
        let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, _rx) = watch::channel(ClipState::Idle);
        let reporter = StateReporter { id, tx };
        self.drive(submission, &reporter, &AtomicBool::new(false))
            .await
    }

    async fn drive(
        &self,
        submission: ClipSubmission,
        reporter: &StateReporter,
        cancelled: &AtomicBool,
    ) -> Result<ClipReport> {
        let result = self.stages(submission, reporter, cancelled).await;
        match &result {
            Ok(report) => {
                reporter.enter(ClipState::Done);
                info!(
                    "Request {}: clip saved to {} in {:.2}s",
                    reporter.id,
                    report.destination.display(),
                    report.total_time.as_secs_f64()
                );
            }
            Err(e) => {
                reporter.enter(ClipState::Failed(e.kind()));
                if e.is_local_validation() {
                    info!("Request {}: rejected: {}", reporter.id, e);
                } else {
                    warn!("Request {}: {}", reporter.id, e);
                }
            }
        }
        result
    }

    async fn stages(
        &self,
        submission: ClipSubmission,
        reporter: &StateReporter,
        cancelled: &AtomicBool,
    ) -> Result<ClipReport> {
        let start_time = Instant::now();

        reporter.enter(ClipState::Validating);
        let request = submission.validate()?;
        info!(
            "Request {}: {} from {} for {}s ({})",
            reporter.id,
            request.source_url,
            request.start,
            request.duration_seconds,
            request.strategy
        );

        reporter.enter(ClipState::Resolving);
        let resolve_start = Instant::now();
        let resolved = cancellable(cancelled, self.resolver.resolve(&request.source_url))
            .await
            .map_err(|e| match e {
                ClipError::Resolve(_) | ClipError::Cancelled => e,
                other => ClipError::Resolve(other.to_string()),
            })?;
        let resolve_time = resolve_start.elapsed();

        reporter.enter(ClipState::Planning);
        let window = plan(
            &request.start,
            request.duration_seconds,
            resolved.total_duration_seconds,
        )?;

        reporter.enter(ClipState::Extracting);
        let extract_start = Instant::now();
        let strategy =
            create_strategy(request.strategy, self.transcoder.clone(), &self.settings);
        debug!("Request {}: using {}", reporter.id, strategy.name());
        cancellable(
            cancelled,
            strategy.execute(&resolved, &window, &request.destination),
        )
        .await?;
        let extract_time = extract_start.elapsed();

        Ok(ClipReport {
            destination: request.destination,
            window,
            strategy: request.strategy,
            source_title: resolved.title,
            source_duration_seconds: resolved.total_duration_seconds,
            resolve_time,
            extract_time,
            total_time: start_time.elapsed(),
        })
    }
}

/// Print a summary of a finished clip.
pub fn print_summary(report: &ClipReport) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                          Clip Saved                           ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", report.destination.display());
    if let Some(ref title) = report.source_title {
        println!("  Source:     {}", title);
    }
    println!(
        "  Window:     {}s to {}s of {}s",
        report.window.start_seconds,
        report.window.end_seconds,
        report.source_duration_seconds
    );
    println!("  Strategy:   {}", report.strategy);
    println!();
    println!("  Timing:");
    println!("    Resolve:  {:.2}s", report.resolve_time.as_secs_f64());
    println!("    Extract:  {:.2}s", report.extract_time.as_secs_f64());
    println!("    Total:    {:.2}s", report.total_time.as_secs_f64());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimeField;

    fn submission() -> ClipSubmission {
        ClipSubmission {
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            start_hours: "0".to_string(),
            start_minutes: "1".to_string(),
            start_seconds: "5".to_string(),
            duration: "20".to_string(),
            destination: PathBuf::from("cut_video.mp4"),
            strategy: Strategy::RemoteSeekCut,
        }
    }

    #[test]
    fn test_validate_builds_request() {
        let request = submission().validate().unwrap();
        assert_eq!(request.start.total_seconds(), Some(65));
        assert_eq!(request.duration_seconds, 20);
        assert_eq!(request.destination, PathBuf::from("cut_video.mp4"));
    }

    #[test]
    fn test_validate_collects_duration_and_time_errors() {
        let sub = ClipSubmission {
            start_minutes: "one".to_string(),
            duration: "twenty".to_string(),
            ..submission()
        };
        match sub.validate() {
            Err(ClipError::InvalidTimeFormat(fields)) => {
                assert_eq!(fields.0, vec![TimeField::Minutes, TimeField::Duration]);
            }
            other => panic!("Expected InvalidTimeFormat, got: {other:?}"),
        }
    }

    #[test]
    fn test_validate_blank_duration_is_non_positive() {
        let sub = ClipSubmission {
            duration: " ".to_string(),
            ..submission()
        };
        assert!(matches!(
            sub.validate(),
            Err(ClipError::NonPositiveDuration(0))
        ));
    }

    #[test]
    fn test_validate_empty_destination() {
        let sub = ClipSubmission {
            destination: PathBuf::new(),
            ..submission()
        };
        assert!(matches!(
            sub.validate(),
            Err(ClipError::DestinationUnselected)
        ));
    }

    #[test]
    fn test_validate_empty_url() {
        let sub = ClipSubmission {
            url: "   ".to_string(),
            ..submission()
        };
        assert!(matches!(sub.validate(), Err(ClipError::Resolve(_))));
    }

    #[test]
    fn test_validate_adds_mp4_extension() {
        let sub = ClipSubmission {
            destination: PathBuf::from("/videos/highlight"),
            ..submission()
        };
        assert_eq!(
            sub.validate().unwrap().destination,
            PathBuf::from("/videos/highlight.mp4")
        );
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome = ClipOutcome::from(Err(ClipError::NonPositiveDuration(-5)));
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.failure_kind(),
            Some(FailureKind::NonPositiveDuration)
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ClipState::Extracting.to_string(), "extracting");
        assert_eq!(
            ClipState::Failed(FailureKind::EncodeFailed).to_string(),
            "failed (encode failed)"
        );
        assert!(ClipState::Done.is_terminal());
        assert!(!ClipState::Planning.is_terminal());
    }

    #[tokio::test]
    async fn test_cancellable_short_circuits_when_already_cancelled() {
        let flag = AtomicBool::new(true);
        let result: Result<()> = cancellable(&flag, async { Ok(()) }).await;
        assert!(matches!(result, Err(ClipError::Cancelled)));
    }
}
