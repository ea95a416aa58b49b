use crate::error::{ClipError, Result};

use super::{CutWindow, TimeSpec};

/// Compute the cut window and reject requests that fall outside the source.
///
/// Offsets too large for `i64` are range errors, never wrapped.
pub fn plan(
    start: &TimeSpec,
    duration_seconds: i64,
    total_duration_seconds: i64,
) -> Result<CutWindow> {
    if duration_seconds <= 0 {
        return Err(ClipError::NonPositiveDuration(duration_seconds));
    }

    let start_seconds = start
        .total_seconds()
        .unwrap_or_else(|| start.saturating_total_seconds());
    if start_seconds < 0 {
        return Err(ClipError::NegativeStart(start_seconds));
    }

    let end_seconds = start
        .total_seconds()
        .and_then(|s| s.checked_add(duration_seconds));

    match end_seconds {
        Some(end_seconds) if end_seconds <= total_duration_seconds => Ok(CutWindow {
            start_seconds,
            end_seconds,
        }),
        end => Err(ClipError::DurationExceedsSource {
            start: start_seconds,
            end: end.unwrap_or(i64::MAX),
            total: total_duration_seconds,
        }),
    }
}
