//! VTIMEZONE generation from IANA zone names.
//!
//! Zones are sampled at two fixed instants of the event's year (1 January
//! and 1 July, 12:00 UTC). Equal offsets produce a single fixed STANDARD
//! observance. Different offsets produce one STANDARD (lesser offset) and one
//! DAYLIGHT (greater offset) observance. Each observance starts at 02:00 local on
//! the day the zone switched in that year and repeats yearly on the same
//! nth weekday of the month. Historical rule changes are not reproduced.
//!
//! Profiles are memoized per `(zone, year)`; the cache never changes output.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Weekday};
use chrono_tz::Tz;

use icalendar::Property;
use icalendar::parser::Component as RawComponent;

use crate::dates::ics_local_datetime;
use crate::error::{FamcalError, FamcalResult};

/// Local wall-clock hour at which every observance is assumed to begin.
const TRANSITION_HOUR: u32 = 2;

static PROFILE_CACHE: OnceLock<Mutex<HashMap<(String, i32), ZoneProfile>>> = OnceLock::new();

/// Resolve an IANA zone name; unknown names are an error, never a fallback.
pub fn resolve_timezone(name: &str) -> FamcalResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| FamcalError::UnknownTimezone(name.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservanceKind {
    Standard,
    Daylight,
}

impl ObservanceKind {
    fn component(&self) -> &'static str {
        match self {
            ObservanceKind::Standard => "STANDARD",
            ObservanceKind::Daylight => "DAYLIGHT",
        }
    }
}

/// One STANDARD or DAYLIGHT sub-block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observance {
    pub kind: ObservanceKind,
    pub onset: NaiveDateTime,
    /// Offsets in seconds east of UTC.
    pub offset_from: i32,
    pub offset_to: i32,
    pub abbreviation: String,
    /// Yearly repeat rule, absent when no switch day could be located.
    pub rule: Option<String>,
}

/// How a zone behaves through one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneProfile {
    Fixed { offset: i32, abbreviation: String },
    Seasonal { standard: Observance, daylight: Observance },
}

/// Profile for `name` in `year`, computed once per pair and then served from cache.
pub fn zone_profile(name: &str, year: i32) -> FamcalResult<ZoneProfile> {
    let key = (name.to_string(), year);
    let cache = PROFILE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(profile) = cache.lock().ok().and_then(|guard| guard.get(&key).cloned()) {
        return Ok(profile);
    }

    let profile = compute_profile(resolve_timezone(name)?, year)?;

    if let Ok(mut guard) = cache.lock() {
        guard.insert(key, profile.clone());
    }

    Ok(profile)
}

fn compute_profile(tz: Tz, year: i32) -> FamcalResult<ZoneProfile> {
    let (jan_offset, jan_abbr) = sample(tz, year, 1)?;
    let (jul_offset, jul_abbr) = sample(tz, year, 7)?;

    if jan_offset == jul_offset {
        return Ok(ZoneProfile::Fixed {
            offset: jan_offset,
            abbreviation: jan_abbr,
        });
    }

    let (standard_offset, standard_abbr, standard_month, daylight_offset, daylight_abbr, daylight_month) =
        if jan_offset < jul_offset {
            (jan_offset, jan_abbr, 1, jul_offset, jul_abbr, 7)
        } else {
            (jul_offset, jul_abbr, 7, jan_offset, jan_abbr, 1)
        };

    let daylight = observance(
        tz,
        year,
        ObservanceKind::Daylight,
        standard_offset,
        daylight_offset,
        daylight_abbr,
        daylight_month,
    )?;
    let standard = observance(
        tz,
        year,
        ObservanceKind::Standard,
        daylight_offset,
        standard_offset,
        standard_abbr,
        standard_month,
    )?;

    Ok(ZoneProfile::Seasonal { standard, daylight })
}

/// Offset and abbreviation at 12:00 UTC on the first of `month`.
fn sample(tz: Tz, year: i32, month: u32) -> FamcalResult<(i32, String)> {
    let instant = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .ok_or_else(|| FamcalError::IcsGenerate(format!("year {} out of range", year)))?
        .and_utc();
    let local = instant.with_timezone(&tz);
    Ok((
        local.offset().fix().local_minus_utc(),
        local.format("%Z").to_string(),
    ))
}

fn observance(
    tz: Tz,
    year: i32,
    kind: ObservanceKind,
    offset_from: i32,
    offset_to: i32,
    abbreviation: String,
    sample_month: u32,
) -> FamcalResult<Observance> {
    let transition = NaiveTime::from_hms_opt(TRANSITION_HOUR, 0, 0)
        .ok_or_else(|| FamcalError::IcsGenerate("invalid transition hour".into()))?;

    let (onset_day, rule) = match switch_day(tz, year, offset_to) {
        Some(day) => (day, Some(yearly_rule(day))),
        None => {
            let day = NaiveDate::from_ymd_opt(year, sample_month, 1)
                .ok_or_else(|| FamcalError::IcsGenerate(format!("year {} out of range", year)))?;
            (day, None)
        }
    };

    Ok(Observance {
        kind,
        onset: onset_day.and_time(transition),
        offset_from,
        offset_to,
        abbreviation,
        rule,
    })
}

fn local_noon_offset(tz: Tz, date: NaiveDate) -> Option<i32> {
    let noon = date.and_hms_opt(12, 0, 0)?;
    tz.from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.offset().fix().local_minus_utc())
}

/// First day of `year` whose local noon is at `offset` while the previous day's was not.
fn switch_day(tz: Tz, year: i32, offset: i32) -> Option<NaiveDate> {
    let mut day = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let mut previous = local_noon_offset(tz, day)?;

    loop {
        let next = day.succ_opt()?;
        if next.year() != year {
            return None;
        }
        let current = local_noon_offset(tz, next)?;
        if current == offset && previous != offset {
            return Some(next);
        }
        previous = current;
        day = next;
    }
}

/// `FREQ=YEARLY;BYMONTH=m;BYDAY=nWD`, using `-1` for a last-weekday-of-month switch.
fn yearly_rule(day: NaiveDate) -> String {
    let nth = (day.day() - 1) / 7 + 1;
    let is_last = day
        .checked_add_days(chrono::Days::new(7))
        .is_none_or(|d| d.month() != day.month());

    let position = if is_last && nth >= 4 {
        "-1".to_string()
    } else {
        nth.to_string()
    };

    format!(
        "FREQ=YEARLY;BYMONTH={};BYDAY={}{}",
        day.month(),
        position,
        weekday_code(day.weekday())
    )
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Signed `HHMM`, e.g. `+0300`, `-0500`, `+0530`.
pub fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    format!("{}{:02}{:02}", sign, abs / 3600, (abs % 3600) / 60)
}

/// VTIMEZONE block for `tzid`, built as a raw component so it can carry
/// STANDARD/DAYLIGHT children.
pub fn vtimezone_component(tzid: &str, profile: &ZoneProfile) -> RawComponent<'static> {
    let observances = match profile {
        ZoneProfile::Fixed {
            offset,
            abbreviation,
        } => vec![raw_component(
            "STANDARD",
            vec![
                Property::new("DTSTART", "19700101T000000"),
                Property::new("TZOFFSETFROM", format_offset(*offset)),
                Property::new("TZOFFSETTO", format_offset(*offset)),
                Property::new("TZNAME", abbreviation),
            ],
        )],
        ZoneProfile::Seasonal { standard, daylight } => {
            vec![observance_component(standard), observance_component(daylight)]
        }
    };

    let mut vtimezone = raw_component("VTIMEZONE", vec![Property::new("TZID", tzid)]);
    vtimezone.components = observances;
    vtimezone
}

fn observance_component(observance: &Observance) -> RawComponent<'static> {
    let mut properties = vec![Property::new("DTSTART", ics_local_datetime(observance.onset))];
    if let Some(rule) = &observance.rule {
        properties.push(Property::new("RRULE", rule));
    }
    properties.push(Property::new("TZOFFSETFROM", format_offset(observance.offset_from)));
    properties.push(Property::new("TZOFFSETTO", format_offset(observance.offset_to)));
    properties.push(Property::new("TZNAME", &observance.abbreviation));

    raw_component(observance.kind.component(), properties)
}

fn raw_component(name: &str, properties: Vec<Property>) -> RawComponent<'static> {
    RawComponent {
        name: name.to_string().into(),
        properties: properties.into_iter().map(Into::into).collect(),
        components: Vec::new(),
    }
}
