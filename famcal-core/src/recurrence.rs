//! Repeat-rule expansion and description.
//!
//! The product's three cadences are expressed as RFC 5545 RRULE values and expanded
//! with the rrule crate, so the dates shown in the agenda are the same dates a
//! calendar client derives from the exported file. Monthly rules follow RRULE
//! semantics: an event anchored on the 31st only appears in months that have a 31st.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rrule::RRuleSet;

use crate::date_range::DateWindow;
use crate::dates::{format_long_date, ics_date};
use crate::event::{EventRecord, Recurrence, RecurrencePattern};

/// Hard cap on generated instances per event and query.
const MAX_INSTANCES: u16 = 4096;

/// The RRULE value (without the `RRULE:` prefix) for a repeat rule.
///
/// `UNTIL` is pinned to the last second of the until day in UTC so that the until
/// date itself is still included.
pub fn rrule_value(rule: &Recurrence) -> String {
    let mut parts = vec![match rule.pattern {
        RecurrencePattern::Weekly | RecurrencePattern::Biweekly => "FREQ=WEEKLY".to_string(),
        RecurrencePattern::Monthly => "FREQ=MONTHLY".to_string(),
    }];

    if rule.pattern == RecurrencePattern::Biweekly {
        parts.push("INTERVAL=2".to_string());
    }

    if let Some(until) = rule.until {
        parts.push(format!("UNTIL={}T235959Z", ics_date(until)));
    }

    parts.join(";")
}

/// Build an iCalendar-format rule set string for the rrule crate parser.
/// Anchor dates become midnight UTC; only the date part is read back.
fn build_rrule_string(anchor: NaiveDate, rule: &Recurrence) -> String {
    [
        format!("DTSTART:{}T000000Z", ics_date(anchor)),
        format!("RRULE:{}", rrule_value(rule)),
    ]
    .join("\n")
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Dates of a repeating event that fall inside `window`.
///
/// Stepping always starts at the anchor so the cadence stays phase-locked to the
/// original date; instances before `window.start` are discarded, and nothing after
/// `min(until, window.end)` is produced.
pub fn recurring_dates(anchor: NaiveDate, rule: &Recurrence, window: &DateWindow) -> Vec<NaiveDate> {
    let upper = match rule.until {
        Some(until) => until.min(window.end),
        None => window.end,
    };
    let lower = window.start.max(anchor);

    if lower > upper {
        return Vec::new();
    }

    let rrule_str = build_rrule_string(anchor, rule);
    let rrule_set: RRuleSet = match rrule_str.parse() {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(%anchor, rule = %rrule_str, error = %e, "could not build repeat rule, showing anchor only");
            return if window.contains(anchor) { vec![anchor] } else { Vec::new() };
        }
    };

    // after/before are exclusive, so widen by a second on each side.
    let tz: rrule::Tz = Utc.into();
    let after = (midnight_utc(lower) - Duration::seconds(1)).with_timezone(&tz);
    let before = (midnight_utc(upper) + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_INSTANCES);
    if result.limited {
        tracing::debug!(%anchor, limit = MAX_INSTANCES, "repeat expansion hit instance cap");
    }

    result
        .dates
        .iter()
        .map(|dt| dt.date_naive())
        .filter(|d| *d >= lower && *d <= upper)
        .collect()
}

/// Human sentence describing how an event repeats, or `""` if it doesn't.
pub fn describe_recurrence(event: &EventRecord) -> String {
    let Some(rule) = event.recurrence() else {
        return String::new();
    };

    let base = match rule.pattern {
        RecurrencePattern::Weekly => "Repeats weekly",
        RecurrencePattern::Biweekly => "Repeats every 2 weeks",
        RecurrencePattern::Monthly => "Repeats monthly",
    };

    match rule.until {
        Some(until) => format!("{} until {}", base, format_long_date(until)),
        None => base.to_string(),
    }
}
