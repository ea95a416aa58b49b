use crate::error::{ClipError, InvalidFields, Result, TimeField};

use super::TimeSpec;

/// Parse one field: blank means zero, anything else must be a base-10 integer.
fn parse_field(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse::<i64>().ok()
}

/// Build a `TimeSpec` from the hour, minute and second text fields.
///
/// Negative values are accepted here; range checks happen in the planner.
/// Every field that fails is reported, not just the first.
pub fn parse_time_spec(hours: &str, minutes: &str, seconds: &str) -> Result<TimeSpec> {
    let mut invalid = InvalidFields::default();

    let mut field = |text: &str, which: TimeField| {
        parse_field(text).unwrap_or_else(|| {
            invalid.0.push(which);
            0
        })
    };

    let spec = TimeSpec {
        hours: field(hours, TimeField::Hours),
        minutes: field(minutes, TimeField::Minutes),
        seconds: field(seconds, TimeField::Seconds),
    };

    if !invalid.is_empty() {
        return Err(ClipError::InvalidTimeFormat(invalid));
    }

    Ok(spec)
}

/// Parse the clip duration field with the same rules as the time fields.
pub fn parse_duration(text: &str) -> Result<i64> {
    parse_field(text)
        .ok_or_else(|| ClipError::InvalidTimeFormat(InvalidFields(vec![TimeField::Duration])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_zero() {
        for (h, m, s) in [("", "", ""), ("  ", "\t", " "), ("0", "", "0")] {
            let spec = parse_time_spec(h, m, s).unwrap();
            assert_eq!(spec.total_seconds(), Some(0));
        }
    }

    #[test]
    fn test_well_formed_triples() {
        for (h, m, s) in [(0, 0, 0), (1, 0, 0), (0, 59, 59), (2, 30, 15), (10, 120, 7)] {
            let spec = parse_time_spec(&h.to_string(), &m.to_string(), &s.to_string()).unwrap();
            assert_eq!(spec.total_seconds(), Some(h * 3600 + m * 60 + s));
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let spec = parse_time_spec(" 1 ", "2 ", " 3").unwrap();
        assert_eq!(spec, TimeSpec::new(1, 2, 3));
    }

    #[test]
    fn test_negative_values_parse() {
        let spec = parse_time_spec("-1", "0", "0").unwrap();
        assert_eq!(spec.total_seconds(), Some(-3600));
    }

    #[test]
    fn test_invalid_field_fails_whole_spec() {
        match parse_time_spec("abc", "1", "2") {
            Err(ClipError::InvalidTimeFormat(fields)) => {
                assert_eq!(fields.0, vec![TimeField::Hours]);
            }
            other => panic!("Expected InvalidTimeFormat, got: {other:?}"),
        }
    }

    #[test]
    fn test_all_invalid_fields_reported() {
        match parse_time_spec("1.5", "2", "x") {
            Err(ClipError::InvalidTimeFormat(fields)) => {
                assert!(fields.contains(TimeField::Hours));
                assert!(fields.contains(TimeField::Seconds));
                assert!(!fields.contains(TimeField::Minutes));
            }
            other => panic!("Expected InvalidTimeFormat, got: {other:?}"),
        }
    }

    #[test]
    fn test_huge_hours_parse_but_do_not_fit() {
        let spec = parse_time_spec("9999999999999999", "0", "0").unwrap();
        assert_eq!(spec.hours, 9_999_999_999_999_999);
        assert_eq!(spec.total_seconds(), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), 30);
        assert_eq!(parse_duration("").unwrap(), 0);
        assert_eq!(parse_duration("-5").unwrap(), -5);
        assert!(matches!(
            parse_duration("ten"),
            Err(ClipError::InvalidTimeFormat(_))
        ));
    }
}
