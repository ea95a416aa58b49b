use regex::Regex;
use std::sync::OnceLock;

use super::TimeSpec;

/// `t=` opening a query or fragment parameter, followed by a second count.
fn start_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?:^|[?&#])t=(\d+)").expect("valid start-time regex"))
}

/// Extract the start offset embedded in a video URL (`...&t=125`).
///
/// Returns a zero offset when no marker is present. Only the first marker is used.
pub fn extract_start_time(url: &str) -> TimeSpec {
    start_marker()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(TimeSpec::from_total_seconds)
        .unwrap_or_default()
}

/// Same as [`extract_start_time`], rendered as text fields.
pub fn extract_start_fields(url: &str) -> (String, String, String) {
    extract_start_time(url).to_fields()
}
