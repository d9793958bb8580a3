//! Occurrence expansion: turn stored event records into the days they occupy
//! inside a query window.
//!
//! Each event takes exactly one shape:
//! - repeating (`recurrence_data` with a supported pattern) takes precedence,
//! - otherwise a multi-day span (`duration_days > 1`),
//! - otherwise a single day on its anchor date.
//!
//! Results from all events are concatenated and then stably sorted by day and
//! same-day slot (see [`sort_occurrences`]).

use chrono::NaiveDate;

use crate::date_range::DateWindow;
use crate::dates::{add_days, days_between};
use crate::error::FamcalResult;
use crate::event::EventRecord;
use crate::occurrence::{Occurrence, sort_occurrences};
use crate::recurrence::recurring_dates;

/// True when the event spans more than one calendar day.
pub fn is_multi_day_event(event: &EventRecord) -> bool {
    event
        .schedule_data
        .as_ref()
        .and_then(|s| s.duration_days)
        .is_some_and(|d| d > 1)
}

/// True when the event is flagged recurring *and* carries a supported pattern.
pub fn is_recurring_event(event: &EventRecord) -> bool {
    event.recurrence().is_some()
}

/// Expand `events` into sorted occurrences within `[range_start, range_end]`.
///
/// An inverted range yields an empty list. The only error is an event whose
/// `event_date` cannot be parsed; malformed optional fields degrade to defaults.
pub fn expand(
    events: &[EventRecord],
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> FamcalResult<Vec<Occurrence>> {
    expand_window(events, &DateWindow::new(range_start, range_end))
}

/// [`expand`] over a [`DateWindow`].
pub fn expand_window(events: &[EventRecord], window: &DateWindow) -> FamcalResult<Vec<Occurrence>> {
    if window.is_empty() {
        return Ok(Vec::new());
    }

    let mut occurrences = Vec::new();
    for event in events {
        expand_event(event, window, &mut occurrences)?;
    }

    sort_occurrences(&mut occurrences);

    tracing::debug!(
        events = events.len(),
        occurrences = occurrences.len(),
        start = %window.start,
        end = %window.end,
        "expanded events"
    );

    Ok(occurrences)
}

fn expand_event(event: &EventRecord, window: &DateWindow, out: &mut Vec<Occurrence>) -> FamcalResult<()> {
    let anchor = event.anchor_date()?;

    if let Some(rule) = event.recurrence() {
        out.extend(
            recurring_dates(anchor, &rule, window)
                .into_iter()
                .map(|date| Occurrence::recurring(event, date)),
        );
    } else if is_multi_day_event(event) {
        expand_span(event, anchor, event.duration_days(), window, out);
    } else if window.contains(anchor) {
        out.push(Occurrence::single(event, anchor));
    }

    Ok(())
}

/// Emit the days of `[anchor, anchor + total - 1]` that fall inside the window,
/// numbered by their position in the full span.
fn expand_span(
    event: &EventRecord,
    anchor: NaiveDate,
    total: i64,
    window: &DateWindow,
    out: &mut Vec<Occurrence>,
) {
    let first = days_between(anchor, window.start).max(0);
    let last = days_between(anchor, window.end).min(total - 1);

    for offset in first..=last {
        let Some(date) = add_days(anchor, offset as u64) else {
            break;
        };
        out.push(Occurrence::span_day(event, date, offset + 1, total));
    }
}
