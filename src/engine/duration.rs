//! Human-readable holding durations.

use crate::domain::TimeMs;

/// Rendered when either end is missing, unparsable, or the span is negative.
pub const DURATION_UNKNOWN: &str = "-";
/// Rendered for spans shorter than one minute.
pub const DURATION_UNDER_MINUTE: &str = "< 1m";

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Coarse duration between two instants: `"2d 3h"`, `"4h 5m"`, `"7m"`.
///
/// Components truncate. Zero components are omitted and minutes are dropped
/// once the span reaches a full day.
pub fn format_duration(start: Option<TimeMs>, end: Option<TimeMs>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return DURATION_UNKNOWN.to_string();
    };

    let span = match end.as_ms().checked_sub(start.as_ms()) {
        Some(span) if span >= 0 => span,
        _ => return DURATION_UNKNOWN.to_string(),
    };
    if span < MINUTE_MS {
        return DURATION_UNDER_MINUTE.to_string();
    }

    let days = span / DAY_MS;
    let hours = (span % DAY_MS) / HOUR_MS;
    let minutes = (span % HOUR_MS) / MINUTE_MS;

    let mut parts = Vec::with_capacity(2);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 && days == 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.join(" ")
}

/// Same as [`format_duration`], parsing both ends from text first.
pub fn format_duration_text(start: Option<&str>, end: Option<&str>) -> String {
    format_duration(start.and_then(TimeMs::parse), end.and_then(TimeMs::parse))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(ms: i64) -> String {
        format_duration(Some(TimeMs::new(0)), Some(TimeMs::new(ms)))
    }

    #[test]
    fn test_missing_or_reversed_is_unknown() {
        assert_eq!(format_duration(None, Some(TimeMs::new(1))), DURATION_UNKNOWN);
        assert_eq!(format_duration(Some(TimeMs::new(1)), None), DURATION_UNKNOWN);
        assert_eq!(
            format_duration(Some(TimeMs::new(10)), Some(TimeMs::new(5))),
            DURATION_UNKNOWN
        );
    }

    #[test]
    fn test_under_a_minute() {
        assert_eq!(span(0), DURATION_UNDER_MINUTE);
        assert_eq!(span(59_999), DURATION_UNDER_MINUTE);
    }

    #[test]
    fn test_minutes_and_hours() {
        assert_eq!(span(MINUTE_MS), "1m");
        assert_eq!(span(7 * MINUTE_MS + 59_000), "7m");
        assert_eq!(span(4 * HOUR_MS + 5 * MINUTE_MS), "4h 5m");
        assert_eq!(span(3 * HOUR_MS), "3h");
    }

    #[test]
    fn test_days_suppress_minutes() {
        assert_eq!(span(2 * DAY_MS + 3 * HOUR_MS + 59 * MINUTE_MS), "2d 3h");
        assert_eq!(span(DAY_MS + 30 * MINUTE_MS), "1d");
    }

    #[test]
    fn test_text_inputs() {
        assert_eq!(
            format_duration_text(Some("2024-01-01T00:00"), Some("2024-01-01T01:30")),
            "1h 30m"
        );
        assert_eq!(
            format_duration_text(Some("garbage"), Some("2024-01-01T01:30")),
            DURATION_UNKNOWN
        );
        assert_eq!(format_duration_text(None, None), DURATION_UNKNOWN);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        assert_eq!(
            format_duration_text(Some("-9223372036854775808"), Some("9223372036854775807")),
            DURATION_UNKNOWN
        );
        assert_eq!(
            format_duration(Some(TimeMs::new(i64::MAX)), Some(TimeMs::new(i64::MIN))),
            DURATION_UNKNOWN
        );
        assert_eq!(
            format_duration(Some(TimeMs::new(0)), Some(TimeMs::new(i64::MAX))),
            "106751991167d 7h"
        );
    }
}
