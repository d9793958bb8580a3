//! Occurrences: one concrete day on which an event is shown.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::minutes_since_midnight;
use crate::event::EventRecord;

/// An event as it appears on one calendar day of a query window.
///
/// Produced fresh per query and never stored; its identity is the pair
/// `(event.id, display_date)`. The source record's fields are flattened into the
/// serialized form so renderers see a single flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    #[serde(flatten)]
    pub event: EventRecord,
    pub display_date: NaiveDate,
    /// e.g. `" (Day 2 of 3)"` for multi-day spans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_suffix: Option<String>,
    /// 1-based position within the unclipped span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_days: Option<i64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring_instance: bool,
}

impl Occurrence {
    /// The anchor day itself, with no extra annotations.
    pub fn single(event: &EventRecord, date: NaiveDate) -> Self {
        Occurrence {
            event: event.clone(),
            display_date: date,
            display_suffix: None,
            day_index: None,
            total_days: None,
            is_recurring_instance: false,
        }
    }

    /// Day `index` (1-based) of a `total`-day span.
    pub fn span_day(event: &EventRecord, date: NaiveDate, index: i64, total: i64) -> Self {
        Occurrence {
            display_suffix: Some(format!(" (Day {} of {})", index, total)),
            day_index: Some(index),
            total_days: Some(total),
            ..Occurrence::single(event, date)
        }
    }

    /// One generated instance of a repeating event.
    pub fn recurring(event: &EventRecord, date: NaiveDate) -> Self {
        Occurrence {
            is_recurring_instance: true,
            ..Occurrence::single(event, date)
        }
    }

    /// Title with the span suffix applied, as shown in listings.
    pub fn display_title(&self) -> String {
        match &self.display_suffix {
            Some(suffix) => format!("{}{}", self.event.title, suffix),
            None => self.event.title.clone(),
        }
    }

    fn slot(&self) -> DaySlot {
        if self.event.is_all_day() {
            return DaySlot::AllDay;
        }
        match self.event.start_time() {
            Some(t) => DaySlot::Timed(minutes_since_midnight(t)),
            None => DaySlot::Untimed,
        }
    }
}

/// Position within a day: all-day first, then by start time, then untimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DaySlot {
    AllDay,
    Timed(u32),
    Untimed,
}

/// Stable sort by day, then by position within the day. Equal keys keep their
/// input order.
pub fn sort_occurrences(occurrences: &mut [Occurrence]) {
    occurrences.sort_by_cached_key(|o| (o.display_date, o.slot()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ScheduleData;

    fn event(id: &str, schedule: Option<ScheduleData>) -> EventRecord {
        EventRecord {
            id: id.into(),
            title: id.into(),
            event_date: "2026-01-22".into(),
            schedule_data: schedule,
            recurrence_data: None,
            participants: vec![],
            metadata: None,
        }
    }

    fn timed(id: &str, start: &str) -> EventRecord {
        event(
            id,
            Some(ScheduleData {
                start_time: Some(start.into()),
                ..ScheduleData::default()
            }),
        )
    }

    fn ids(occurrences: &[Occurrence]) -> Vec<&str> {
        occurrences.iter().map(|o| o.event.id.as_str()).collect()
    }

    #[test]
    fn same_day_order_all_day_then_time_then_untimed() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 22).unwrap();
        let all_day = event(
            "all-day",
            Some(ScheduleData {
                all_day: Some(true),
                start_time: Some("18:00".into()),
                ..ScheduleData::default()
            }),
        );

        let mut occurrences = vec![
            Occurrence::single(&event("untimed", None), day),
            Occurrence::single(&timed("afternoon", "14:00"), day),
            Occurrence::single(&all_day, day),
            Occurrence::single(&timed("morning", "09:00"), day),
        ];
        sort_occurrences(&mut occurrences);

        assert_eq!(ids(&occurrences), vec!["all-day", "morning", "afternoon", "untimed"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 22).unwrap();
        let mut occurrences = vec![
            Occurrence::single(&timed("b", "09:00"), day),
            Occurrence::single(&event("x", None), day),
            Occurrence::single(&timed("a", "09:00"), day),
            Occurrence::single(&event("w", None), day),
        ];
        sort_occurrences(&mut occurrences);

        assert_eq!(ids(&occurrences), vec!["b", "a", "x", "w"]);
    }

    #[test]
    fn date_dominates_time() {
        let mut occurrences = vec![
            Occurrence::single(&timed("late-day", "07:00"), NaiveDate::from_ymd_opt(2026, 1, 23).unwrap()),
            Occurrence::single(&timed("early-day", "20:00"), NaiveDate::from_ymd_opt(2026, 1, 22).unwrap()),
        ];
        sort_occurrences(&mut occurrences);

        assert_eq!(ids(&occurrences), vec!["early-day", "late-day"]);
    }

    #[test]
    fn serializes_flat_with_optional_annotations() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let json = serde_json::to_value(Occurrence::span_day(&event("trip", None), day, 2, 3)).unwrap();

        assert_eq!(json["id"], "trip");
        assert_eq!(json["display_date"], "2026-01-20");
        assert_eq!(json["display_suffix"], " (Day 2 of 3)");
        assert_eq!(json["day_index"], 2);
        assert!(json.get("is_recurring_instance").is_none());

        let json = serde_json::to_value(Occurrence::recurring(&event("piano", None), day)).unwrap();
        assert_eq!(json["is_recurring_instance"], true);
        assert!(json.get("display_suffix").is_none());
    }
}
