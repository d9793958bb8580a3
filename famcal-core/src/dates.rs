//! Calendar-date helpers shared by the expander and the serializer.
//!
//! Event records carry dates and times as plain strings (`YYYY-MM-DD`, `HH:MM`).
//! Everything here works on naive calendar values: day arithmetic never looks at a
//! timezone.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date. Surrounding whitespace is ignored.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse a wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Minutes elapsed since midnight, used as the same-day sort key.
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// `date + days`, or `None` if the result leaves chrono's supported range.
pub fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Human form used in recurrence descriptions, e.g. `Feb 10, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// iCalendar DATE value (`YYYYMMDD`).
pub fn ics_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// iCalendar local DATE-TIME value (`YYYYMMDDTHHMMSS`), no zone suffix.
pub fn ics_local_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_rejects_garbage() {
        assert_eq!(parse_date("2026-01-20"), NaiveDate::from_ymd_opt(2026, 1, 20));
        assert_eq!(parse_date(" 2026-01-20 "), NaiveDate::from_ymd_opt(2026, 1, 20));
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date("20/01/2026"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parses_times_with_and_without_seconds() {
        assert_eq!(parse_time("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_time("14:30:15"), NaiveTime::from_hms_opt(14, 30, 15));
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("noon"), None);
    }

    #[test]
    fn minutes_since_midnight_ignores_seconds() {
        let t = NaiveTime::from_hms_opt(14, 5, 59).unwrap();
        assert_eq!(minutes_since_midnight(t), 14 * 60 + 5);
    }

    #[test]
    fn day_arithmetic_crosses_month_and_year() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(add_days(d, 1), NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(
            days_between(d, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            60
        );
    }

    #[test]
    fn ics_formats() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(ics_date(d), "20260105");
        assert_eq!(
            ics_local_datetime(d.and_hms_opt(9, 30, 0).unwrap()),
            "20260105T093000"
        );
        assert_eq!(format_long_date(d), "Jan 5, 2026");
    }
}
