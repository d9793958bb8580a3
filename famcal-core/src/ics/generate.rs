//! ICS document generation for a single family event.

use chrono::{Datelike, DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use icalendar::{Alarm, Calendar, CalendarComponent, Component, EventLike, Property, Trigger, ValueType};

use crate::dates::{add_days, ics_date, ics_local_datetime};
use crate::error::{FamcalError, FamcalResult};
use crate::event::EventRecord;
use crate::ics::timezone::{resolve_timezone, vtimezone_component, zone_profile};
use crate::recurrence::rrule_value;

pub const PRODID: &str = "-//Famcal//Family Calendar//EN";
pub const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

const UID_DOMAIN: &str = "famcal";
const REMINDER_MINUTES: i64 = 60;

/// Start/end of the exported VEVENT.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Timing {
    /// `end` is exclusive: the day after the last covered day.
    AllDay { start: NaiveDate, end: NaiveDate },
    Timed {
        tzid: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Timing {
    fn resolve(event: &EventRecord, anchor: NaiveDate, timezone: &str) -> FamcalResult<Self> {
        let span = event.duration_days() as u64;
        let out_of_range = || FamcalError::IcsGenerate(format!("event '{}' spans past the supported date range", event.id));

        let start_time = match event.start_time() {
            Some(t) if !event.is_all_day() => t,
            _ => {
                let end = add_days(anchor, span).ok_or_else(out_of_range)?;
                return Ok(Timing::AllDay { start: anchor, end });
            }
        };

        // Fail before producing anything tied to a zone we can't represent.
        resolve_timezone(timezone)?;

        let start = anchor.and_time(start_time);
        let last_day = add_days(anchor, span - 1).ok_or_else(out_of_range)?;
        let mut end = match event.end_time() {
            Some(end_time) => last_day.and_time(end_time),
            None => last_day.and_time(start_time) + Duration::hours(1),
        };
        // An end time at or before the start on a single day means it runs past midnight.
        if end <= start {
            end += Duration::days(1);
        }

        Ok(Timing::Timed {
            tzid: timezone.trim().to_string(),
            start,
            end,
        })
    }
}

/// Serialize `event` as a complete calendar document with `DTSTAMP` set to now.
pub fn serialize(event: &EventRecord, timezone: &str) -> FamcalResult<String> {
    serialize_at(event, timezone, Utc::now())
}

/// Serialize `event` as a complete calendar document.
///
/// Timed events are attributed to `timezone` and get a matching VTIMEZONE block;
/// all-day events use DATE values and carry no zone. The output is identical for
/// identical inputs, `generated_at` only feeds `DTSTAMP`.
pub fn serialize_at(event: &EventRecord, timezone: &str, generated_at: DateTime<Utc>) -> FamcalResult<String> {
    let anchor = event.anchor_date()?;
    let timing = Timing::resolve(event, anchor, timezone)?;

    let mut cal = Calendar::empty();
    cal.append_property(Property::new("VERSION", "2.0"));
    cal.append_property(Property::new("PRODID", PRODID));
    cal.append_property(Property::new("CALSCALE", "GREGORIAN"));

    if let Timing::Timed { tzid, start, .. } = &timing {
        let profile = zone_profile(tzid, start.year())?;
        cal.push(CalendarComponent::from(vtimezone_component(tzid, &profile)));
    }

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event_uid(&event.id));
    ics_event.timestamp(generated_at);

    match &timing {
        Timing::AllDay { start, end } => {
            add_date_property(&mut ics_event, "DTSTART", *start);
            add_date_property(&mut ics_event, "DTEND", *end);
        }
        Timing::Timed { tzid, start, end } => {
            add_zoned_property(&mut ics_event, "DTSTART", *start, tzid);
            add_zoned_property(&mut ics_event, "DTEND", *end, tzid);
        }
    }

    if let Some(rule) = event.recurrence() {
        ics_event.add_property("RRULE", rrule_value(&rule));
    }

    ics_event.summary(&text_value(&summary(event)));

    let names = event.participant_names();
    if !names.is_empty() {
        ics_event.description(&text_value(&format!("Participants: {}", names.join(", "))));
    }

    let mut alarm = Alarm::display(
        &text_value(&format!("Reminder: {}", event.title)),
        Trigger::before_start(Duration::minutes(REMINDER_MINUTES)),
    );
    // Minutes form (-PT60M) with no RELATED parameter
    alarm.append_property(Property::new("TRIGGER", format!("-PT{}M", REMINDER_MINUTES)));
    ics_event.alarm(alarm);

    cal.push(ics_event.done());
    let output = strip_ics_bloat(&cal.done().to_string());

    tracing::debug!(event_id = %event.id, timezone, "serialized event to ics");

    Ok(output)
}

/// Clean up ICS output from the icalendar crate: it stamps `DTSTAMP` and a random
/// `UID` onto every component, but only the VEVENT should carry them.
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut open: Vec<&str> = Vec::new();
    let mut skipping = false;

    for line in ics.lines() {
        // Folded continuation of the previous line
        if line.starts_with(' ') {
            if !skipping {
                result.push_str(line);
                result.push_str("\r\n");
            }
            continue;
        }

        if let Some(name) = line.strip_prefix("BEGIN:") {
            open.push(name);
        } else if line.starts_with("END:") {
            open.pop();
        }

        skipping = (line.starts_with("DTSTAMP:") || line.starts_with("UID:"))
            && open.last() != Some(&"VEVENT");
        if skipping {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, ics_date(date));
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, datetime: NaiveDateTime, tzid: &str) {
    let mut prop = Property::new(name, ics_local_datetime(datetime));
    prop.add_parameter("TZID", tzid);
    ics_event.append_property(prop);
}

/// `{id}@famcal` with control characters removed, so a stored id can never
/// start a new content line.
fn event_uid(id: &str) -> String {
    let cleaned: String = id.chars().filter(|c| !c.is_control()).collect();
    format!("{}@{}", cleaned, UID_DOMAIN)
}

/// TEXT values: the crate escapes `\n` but not bare CR, so fold every line
/// break into `\n` first.
fn text_value(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

fn summary(event: &EventRecord) -> String {
    match event.emoji() {
        Some(emoji) => format!("{} {}", emoji, event.title),
        None => event.title.clone(),
    }
}

/// Download file name: slugified title plus `.ics`.
pub fn ics_filename(event: &EventRecord) -> String {
    let base = slug::slugify(&event.title);
    if base.is_empty() {
        "event.ics".to_string()
    } else {
        format!("{}.ics", base)
    }
}

/// `Content-Disposition` header value for downloading `event`.
pub fn content_disposition(event: &EventRecord) -> String {
    format!("attachment; filename=\"{}\"", ics_filename(event))
}
