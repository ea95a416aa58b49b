use std::fmt;

use thiserror::Error;

/// Caller-supplied text field that can fail integer parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Hours,
    Minutes,
    Seconds,
    Duration,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Hours => write!(f, "hours"),
            TimeField::Minutes => write!(f, "minutes"),
            TimeField::Seconds => write!(f, "seconds"),
            TimeField::Duration => write!(f, "duration"),
        }
    }
}

/// The set of fields that failed to parse, in the order they were checked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvalidFields(pub Vec<TimeField>);

impl InvalidFields {
    pub fn contains(&self, field: TimeField) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InvalidFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|field| field.to_string()).collect();
        write!(f, "{}", names.join(", "))
    }
}

#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Invalid integer value for {0}")]
    InvalidTimeFormat(InvalidFields),

    #[error("Clip duration must be greater than zero (got {0})")]
    NonPositiveDuration(i64),

    #[error("Start offset cannot be negative (got {0}s)")]
    NegativeStart(i64),

    #[error("The selected clip ({start}s to {end}s) exceeds the video length of {total}s")]
    DurationExceedsSource { start: i64, end: i64, total: i64 },

    #[error("Could not resolve video stream: {0}")]
    Resolve(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    #[error("No destination file selected")]
    DestinationUnselected,

    #[error("Clip request cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terminal failure category reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidTimeFormat,
    NonPositiveDuration,
    NegativeStart,
    DurationExceedsSource,
    ResolveError,
    DownloadFailed,
    EncodeFailed,
    DestinationUnselected,
    Cancelled,
    Configuration,
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::InvalidTimeFormat => "invalid time format",
            FailureKind::NonPositiveDuration => "non-positive duration",
            FailureKind::NegativeStart => "negative start",
            FailureKind::DurationExceedsSource => "duration exceeds source",
            FailureKind::ResolveError => "resolve error",
            FailureKind::DownloadFailed => "download failed",
            FailureKind::EncodeFailed => "encode failed",
            FailureKind::DestinationUnselected => "destination unselected",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Configuration => "configuration",
            FailureKind::Internal => "internal",
        };
        write!(f, "{name}")
    }
}

impl ClipError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClipError::InvalidTimeFormat(_) => FailureKind::InvalidTimeFormat,
            ClipError::NonPositiveDuration(_) => FailureKind::NonPositiveDuration,
            ClipError::NegativeStart(_) => FailureKind::NegativeStart,
            ClipError::DurationExceedsSource { .. } => FailureKind::DurationExceedsSource,
            ClipError::Resolve(_) | ClipError::Json(_) => FailureKind::ResolveError,
            ClipError::DownloadFailed(_) | ClipError::Http(_) => FailureKind::DownloadFailed,
            ClipError::EncodeFailed(_) | ClipError::Io(_) => FailureKind::EncodeFailed,
            ClipError::DestinationUnselected => FailureKind::DestinationUnselected,
            ClipError::Cancelled => FailureKind::Cancelled,
            ClipError::Config(_) => FailureKind::Configuration,
        }
    }

    /// True for failures detected before any network or disk work.
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            ClipError::InvalidTimeFormat(_)
                | ClipError::NonPositiveDuration(_)
                | ClipError::DestinationUnselected
        )
    }
}

pub type Result<T> = std::result::Result<T, ClipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fields_display() {
        let err = ClipError::InvalidTimeFormat(InvalidFields(vec![
            TimeField::Hours,
            TimeField::Seconds,
        ]));
        assert_eq!(err.to_string(), "Invalid integer value for hours, seconds");
        assert_eq!(err.kind(), FailureKind::InvalidTimeFormat);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ClipError::DurationExceedsSource {
                start: 10,
                end: 30,
                total: 25
            }
            .kind(),
            FailureKind::DurationExceedsSource
        );
        assert_eq!(
            ClipError::Resolve("private video".into()).kind(),
            FailureKind::ResolveError
        );
        assert_eq!(
            ClipError::Io(std::io::Error::other("disk full")).kind(),
            FailureKind::EncodeFailed
        );
        assert!(ClipError::DestinationUnselected.is_local_validation());
        assert!(!ClipError::EncodeFailed("x".into()).is_local_validation());
    }
}
