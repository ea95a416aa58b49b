use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use ytclip::clip::extract_start_fields;
use ytclip::config::{Config, Strategy};
use ytclip::interactive::run_interactive_wizard;
use ytclip::{
    print_summary, ClipOrchestrator, ClipOutcome, ClipState, ClipSubmission, RequestHandle,
};

#[derive(Parser)]
#[command(name = "ytclip")]
#[command(version, about = "Cut a clip out of an online video")]
#[command(
    long_about = "Resolve a video link with yt-dlp and cut a time window out of it with FFmpeg. \
A start time embedded in the link (e.g. &t=125) is used unless overridden."
)]
struct Cli {
    /// Video link (omit to use the interactive wizard)
    url: Option<String>,

    /// Start offset hours
    #[arg(long)]
    hours: Option<String>,

    /// Start offset minutes
    #[arg(long)]
    minutes: Option<String>,

    /// Start offset seconds
    #[arg(long)]
    seconds: Option<String>,

    /// Clip duration in seconds
    #[arg(short, long)]
    duration: Option<String>,

    /// Output file (defaults to cut_video.mp4)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extraction strategy: remote, download
    #[arg(short, long)]
    strategy: Option<String>,

    /// Directory for the staged download (download strategy only)
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Prompt for every field
    #[arg(short, long)]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Explicit start fields win; missing ones come from the link's `t=` marker.
fn build_submission(
    cli: &Cli,
    url: &str,
    strategy: Strategy,
    default_output: PathBuf,
) -> ClipSubmission {
    let (hours, minutes, seconds) = extract_start_fields(url);

    ClipSubmission {
        url: url.to_string(),
        start_hours: cli.hours.clone().unwrap_or(hours),
        start_minutes: cli.minutes.clone().unwrap_or(minutes),
        start_seconds: cli.seconds.clone().unwrap_or(seconds),
        duration: cli.duration.clone().unwrap_or_default(),
        destination: cli.output.clone().unwrap_or(default_output),
        strategy,
    }
}

fn stage_message(state: ClipState) -> &'static str {
    match state {
        ClipState::Idle | ClipState::Validating => "Checking input...",
        ClipState::Resolving => "Resolving video stream...",
        ClipState::Planning => "Planning cut...",
        ClipState::Extracting => "Cutting clip...",
        ClipState::Done => "Finishing...",
        ClipState::Failed(_) => "Failed",
    }
}

async fn wait_with_spinner(handle: RequestHandle) -> ClipOutcome {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut states = handle.subscribe();
    let spinner = pb.clone();
    let watcher = tokio::spawn(async move {
        loop {
            let state = *states.borrow_and_update();
            spinner.set_message(stage_message(state));
            if state.is_terminal() || states.changed().await.is_err() {
                break;
            }
        }
    });

    let outcome = handle.outcome().await;
    watcher.abort();

    match &outcome {
        ClipOutcome::Success(_) => pb.finish_with_message("✓ Clip saved"),
        ClipOutcome::Failure { .. } => pb.abandon_with_message("✗ Clip failed"),
    }
    outcome
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load and validate configuration
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(ref dir) = cli.staging_dir {
        config.staging_dir = Some(dir.clone());
    }
    if let Some(ref strategy) = cli.strategy {
        config.default_strategy = strategy.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    let submission = match cli.url.as_deref() {
        Some(url) if !cli.interactive => {
            build_submission(&cli, url, config.default_strategy, config.default_output.clone())
        }
        _ => run_interactive_wizard(&config)?,
    };

    let orchestrator =
        ClipOrchestrator::from_config(&config).context("Failed to set up the clip pipeline")?;
    orchestrator
        .transcoder()
        .check()
        .await
        .context("FFmpeg is required")?;

    info!("Link:     {}", submission.url);
    info!("Output:   {}", submission.destination.display());
    info!("Strategy: {}", submission.strategy);

    let handle = orchestrator.submit(submission);

    let cancel = handle.cancel_flag();
    ctrlc::set_handler(move || {
        cancel.store(true, Ordering::Relaxed);
    })
    .context("Failed to install Ctrl+C handler")?;

    match wait_with_spinner(handle).await {
        ClipOutcome::Success(report) => {
            print_summary(&report);
            Ok(())
        }
        ClipOutcome::Failure { kind, message } => {
            error!("{} ({})", message, kind);
            anyhow::bail!(message)
        }
    }
}
