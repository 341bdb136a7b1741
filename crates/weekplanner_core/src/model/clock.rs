//! Minute-granularity time-of-day helpers.
//!
//! All persisted and displayed times use the `HH:MM` form.

use chrono::{NaiveTime, Timelike};

const HHMM_FORMAT: &str = "%H:%M";

/// Builds a minute-aligned time, or `None` when hour/minute are out of range.
pub fn minute_time(hour: u32, minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Returns whether `time` carries no seconds or sub-second part.
pub fn is_minute_aligned(time: NaiveTime) -> bool {
    time.second() == 0 && time.nanosecond() == 0
}

/// Formats `time` as `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(HHMM_FORMAT).to_string()
}

/// Parses a strict `HH:MM` value.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), HHMM_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::{format_hhmm, is_minute_aligned, minute_time, parse_hhmm};
    use chrono::NaiveTime;

    #[test]
    fn hhmm_format_is_zero_padded() {
        let time = minute_time(7, 5).expect("valid time");
        assert_eq!(format_hhmm(time), "07:05");
        assert_eq!(parse_hhmm("07:05"), Some(time));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_hhmm("25:00"), None);
        assert_eq!(parse_hhmm("seven"), None);
    }

    #[test]
    fn seconds_break_minute_alignment() {
        let time = NaiveTime::from_hms_opt(7, 0, 30).expect("valid time");
        assert!(!is_minute_aligned(time));
        assert!(is_minute_aligned(minute_time(7, 0).expect("valid time")));
    }
}
