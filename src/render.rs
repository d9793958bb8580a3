//! Colored terminal rendering for agenda listings and event details.

use chrono::NaiveDate;
use famcal_core::dates::format_long_date;
use famcal_core::{EventRecord, Occurrence, describe_recurrence};
use owo_colors::OwoColorize;

/// Day heading: "Today", "Tomorrow", or e.g. "Tue Feb 10".
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Time column (e.g. "  16:00" or "all-day"); blank for events without a time.
pub fn time_label(event: &EventRecord) -> String {
    if event.is_all_day() {
        return "all-day".to_string();
    }
    match event.start_time() {
        Some(t) => format!("{:>7}", t.format("%H:%M")),
        None => " ".repeat(7),
    }
}

fn occurrence_line(occurrence: &Occurrence) -> String {
    let event = &occurrence.event;
    let title = match event.emoji() {
        Some(emoji) => format!("{} {}", emoji, occurrence.display_title()),
        None => occurrence.display_title(),
    };

    let mut line = format!("  {} {}", time_label(event), title);

    let names = event.participant_names();
    if !names.is_empty() {
        line.push_str(&format!(" {}", format!("[{}]", names.join(", ")).dimmed()));
    }
    if occurrence.is_recurring_instance {
        line.push_str(&format!(" {}", "↻".dimmed()));
    }
    line
}

/// Render sorted occurrences grouped under day headings.
pub fn render_agenda(occurrences: &[Occurrence], today: NaiveDate) -> String {
    if occurrences.is_empty() {
        return "No events found".dimmed().to_string();
    }

    let mut lines = Vec::new();
    let mut current_date: Option<NaiveDate> = None;

    for occurrence in occurrences {
        if current_date != Some(occurrence.display_date) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(date_label(occurrence.display_date, today).bold().to_string());
            current_date = Some(occurrence.display_date);
        }
        lines.push(occurrence_line(occurrence));
    }

    lines.join("\n")
}

/// Multi-line summary of a single event.
pub fn render_event_details(event: &EventRecord, anchor: NaiveDate) -> String {
    let title = match event.emoji() {
        Some(emoji) => format!("{} {}", emoji, event.title),
        None => event.title.clone(),
    };
    let mut lines = vec![title.bold().to_string()];

    let mut when = format_long_date(anchor);
    if event.duration_days() > 1 {
        when.push_str(&format!(" for {} days", event.duration_days()));
    }
    match (event.is_all_day(), event.start_time(), event.end_time()) {
        (true, _, _) => when.push_str(", all day"),
        (false, Some(start), Some(end)) => {
            when.push_str(&format!(", {}–{}", start.format("%H:%M"), end.format("%H:%M")))
        }
        (false, Some(start), None) => when.push_str(&format!(" at {}", start.format("%H:%M"))),
        (false, None, _) => {}
    }
    lines.push(format!("   {}", when));

    let repeats = describe_recurrence(event);
    if !repeats.is_empty() {
        lines.push(format!("   {}", repeats.dimmed()));
    }

    let names = event.participant_names();
    if !names.is_empty() {
        lines.push(format!("   {} {}", "With:".dimmed(), names.join(", ")));
    }

    lines.join("\n")
}
