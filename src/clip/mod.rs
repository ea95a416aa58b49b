pub mod planner;
pub mod timespec;
pub mod url_time;

pub use planner::plan;
pub use timespec::{parse_duration, parse_time_spec};
pub use url_time::{extract_start_fields, extract_start_time};

use crate::config::Strategy;
use std::path::PathBuf;

/// A start offset split into its hour, minute and second components.
///
/// Components are not normalized: `{0, 0, 90}` is a valid 90 second offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpec {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeSpec {
    pub fn new(hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Split a second count into hours, minutes and seconds.
    pub fn from_total_seconds(total: i64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// The offset in seconds, or `None` if it does not fit in an `i64`.
    pub fn total_seconds(&self) -> Option<i64> {
        self.hours
            .checked_mul(3600)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)
    }

    /// The offset in seconds, clamped to the `i64` range.
    pub fn saturating_total_seconds(&self) -> i64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    /// Render the components as text, for pre-filling input fields.
    pub fn to_fields(&self) -> (String, String, String) {
        (
            self.hours.to_string(),
            self.minutes.to_string(),
            self.seconds.to_string(),
        )
    }
}

impl std::fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// A validated clip request, built once at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRequest {
    pub source_url: String,
    pub start: TimeSpec,
    pub duration_seconds: i64,
    pub destination: PathBuf,
    pub strategy: Strategy,
}

/// A playable stream resolved from a video page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub stream_url: String,
    pub total_duration_seconds: i64,
    pub title: Option<String>,
}

/// The `[start, end)` range to cut, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutWindow {
    pub start_seconds: i64,
    pub end_seconds: i64,
}

impl CutWindow {
    pub fn duration_seconds(&self) -> i64 {
        self.end_seconds - self.start_seconds
    }
}
