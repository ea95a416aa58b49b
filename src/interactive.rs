use crate::clip::extract_start_fields;
use crate::config::{Config, Strategy};
use crate::orchestrator::ClipSubmission;
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};

const STRATEGIES: &[(&str, &str, Strategy)] = &[
    (
        "Remote seek",
        "Cut straight from the stream, no local copy",
        Strategy::RemoteSeekCut,
    ),
    (
        "Download then cut",
        "Fetch the whole video first, more tolerant of flaky connections",
        Strategy::DownloadThenCut,
    ),
];

pub fn run_interactive_wizard(config: &Config) -> anyhow::Result<ClipSubmission> {
    print_header();

    // Step 1: Video URL
    let url: String = Input::new()
        .with_prompt("Video link")
        .interact_text()?;
    let url = url.trim().to_string();
    if url.is_empty() {
        anyhow::bail!("A video link is required");
    }

    // Step 2: Start time, pre-filled from a `t=` marker in the link
    let (hours, minutes, seconds) = extract_start_fields(&url);
    if (hours.as_str(), minutes.as_str(), seconds.as_str()) != ("0", "0", "0") {
        println!(
            "{} Start time {}:{}:{} taken from the link",
            style("✓").green(),
            hours,
            minutes,
            seconds
        );
    }

    let start_hours = prompt_field("Start hours", &hours)?;
    let start_minutes = prompt_field("Start minutes", &minutes)?;
    let start_seconds = prompt_field("Start seconds", &seconds)?;

    // Step 3: Clip duration
    let duration: String = Input::new()
        .with_prompt("Clip duration (seconds)")
        .interact_text()?;

    // Step 4: Strategy
    let strategy = select_strategy(config.default_strategy)?;

    // Step 5: Destination
    let destination: String = Input::new()
        .with_prompt("Save the cut video as")
        .default(config.default_output.display().to_string())
        .interact_text()?;
    let destination = PathBuf::from(destination.trim());

    let submission = ClipSubmission {
        url,
        start_hours,
        start_minutes,
        start_seconds,
        duration,
        destination,
        strategy,
    };

    // Step 6: Confirm
    print_summary(&submission);

    if !Confirm::new()
        .with_prompt("Proceed with these settings?")
        .default(true)
        .interact()?
    {
        anyhow::bail!("Cancelled by user");
    }

    println!();
    Ok(submission)
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║            ytclip - Video Clip Cutter             ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

fn prompt_field(prompt: &str, prefill: &str) -> anyhow::Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(prefill.to_string())
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

fn select_strategy(default: Strategy) -> anyhow::Result<Strategy> {
    let items: Vec<String> = STRATEGIES
        .iter()
        .map(|(name, desc, _)| format!("{} - {}", name, desc))
        .collect();

    let default_idx = STRATEGIES
        .iter()
        .position(|(_, _, s)| *s == default)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Extraction strategy")
        .items(&items)
        .default(default_idx)
        .interact()?;

    Ok(STRATEGIES[selection].2)
}

fn format_start(submission: &ClipSubmission) -> String {
    let field = |s: &str| {
        if s.trim().is_empty() {
            "0".to_string()
        } else {
            s.trim().to_string()
        }
    };
    format!(
        "{}:{}:{}",
        field(&submission.start_hours),
        field(&submission.start_minutes),
        field(&submission.start_seconds)
    )
}

fn display_path(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        "(none)".to_string()
    } else {
        path.display().to_string()
    }
}

fn print_summary(submission: &ClipSubmission) {
    println!("\n{}", style("═══ Summary ═══").bold());
    println!("  Link:      {}", style(&submission.url).cyan());
    println!("  Start:     {}", format_start(submission));
    println!("  Duration:  {}s", submission.duration.trim());
    println!("  Strategy:  {}", submission.strategy);
    println!(
        "  Output:    {}",
        style(display_path(&submission.destination)).cyan()
    );
    println!();
}
