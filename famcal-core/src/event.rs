//! Family event records as handed over by the storage layer.
//!
//! Records are immutable from the expander's and serializer's point of view. The
//! optional `schedule_data` and `recurrence_data` blocks are typed, and every loose
//! field resolves through one accessor here so the defaulting rules live in a
//! single place.

use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dates::{parse_date, parse_time};
use crate::error::{FamcalError, FamcalResult};

/// A stored family event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    /// Anchor date, `YYYY-MM-DD`.
    pub event_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_data: Option<ScheduleData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_data: Option<RecurrenceData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// Time-of-day and span information. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleData {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    /// Number of calendar days covered. Absent or `1` means single-day.
    #[serde(default, deserialize_with = "lenient_days", skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
}

/// Repeat settings as stored. Use [`EventRecord::recurrence`] for the resolved view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceData {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub until_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Display-only extras. Unknown keys are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Optional field that reads as `None` when the stored JSON has the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!(%value, error = %e, "ignoring optional field with unexpected type");
            Ok(None)
        }
    }
}

/// Like [`lenient`], but whole floats such as `2.0` count as integers.
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let days = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    });
    if days.is_none() {
        tracing::warn!(%value, "ignoring duration_days that is not a whole number");
    }
    Ok(days)
}

/// The repeat cadences the product offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(RecurrencePattern::Weekly),
            "biweekly" => Some(RecurrencePattern::Biweekly),
            "monthly" => Some(RecurrencePattern::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Biweekly => "biweekly",
            RecurrencePattern::Monthly => "monthly",
        }
    }
}

/// A validated repeat rule: a supported pattern and an optional last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    pub until: Option<NaiveDate>,
}

impl EventRecord {
    /// Parse the anchor date. This is the only hard failure on a record.
    pub fn anchor_date(&self) -> FamcalResult<NaiveDate> {
        parse_date(&self.event_date).ok_or_else(|| FamcalError::InvalidEventDate {
            id: self.id.clone(),
            value: self.event_date.clone(),
        })
    }

    pub fn is_all_day(&self) -> bool {
        self.schedule_data
            .as_ref()
            .and_then(|s| s.all_day)
            .unwrap_or(false)
    }

    /// Span length in days; anything absent or below 1 counts as a single day.
    pub fn duration_days(&self) -> i64 {
        self.schedule_data
            .as_ref()
            .and_then(|s| s.duration_days)
            .filter(|d| *d >= 1)
            .unwrap_or(1)
    }

    /// Parsed start time. Malformed values are treated as absent.
    pub fn start_time(&self) -> Option<NaiveTime> {
        let raw = self.schedule_data.as_ref()?.start_time.as_deref()?;
        let parsed = parse_time(raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            tracing::warn!(event_id = %self.id, start_time = raw, "ignoring unparsable start_time");
        }
        parsed
    }

    /// Parsed end time. Malformed values are treated as absent.
    pub fn end_time(&self) -> Option<NaiveTime> {
        let raw = self.schedule_data.as_ref()?.end_time.as_deref()?;
        let parsed = parse_time(raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            tracing::warn!(event_id = %self.id, end_time = raw, "ignoring unparsable end_time");
        }
        parsed
    }

    /// The repeat rule, if the event repeats.
    ///
    /// An event repeats only when `is_recurring` is `true` *and* `pattern` names a
    /// supported cadence. An unparsable `until_date` is dropped, leaving the rule
    /// unbounded.
    pub fn recurrence(&self) -> Option<Recurrence> {
        let data = self.recurrence_data.as_ref()?;
        if data.is_recurring != Some(true) {
            return None;
        }
        let pattern = RecurrencePattern::parse(data.pattern.as_deref()?)?;

        let until = data.until_date.as_deref().and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                tracing::warn!(event_id = %self.id, until_date = raw, "ignoring unparsable until_date");
            }
            parsed
        });

        Some(Recurrence { pattern, until })
    }

    pub fn emoji(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.emoji.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Non-empty participant names in stored order.
    pub fn participant_names(&self) -> Vec<&str> {
        self.participants
            .iter()
            .map(|p| p.name.trim())
            .filter(|n| !n.is_empty())
            .collect()
    }
}
