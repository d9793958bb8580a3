//! Inclusive date window for occurrence queries.

use chrono::{Local, NaiveDate};

use crate::dates::{add_days, parse_date};
use crate::error::{FamcalError, FamcalResult};

pub const DEFAULT_WINDOW_DAYS: u64 = 7;

/// A closed `[start, end]` range of calendar days.
///
/// An inverted window (`start > end`) is allowed and simply contains no days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateWindow { start, end }
    }

    /// A window of `days` days beginning at `start`.
    pub fn starting(start: NaiveDate, days: u64) -> Self {
        let end = add_days(start, days.saturating_sub(1)).unwrap_or(NaiveDate::MAX);
        DateWindow { start, end }
    }

    /// Build a window from optional `YYYY-MM-DD` arguments.
    /// - `from` defaults to today (local)
    /// - `to` defaults to `from + default_days - 1`
    pub fn from_args(from: Option<&str>, to: Option<&str>, default_days: u64) -> FamcalResult<Self> {
        let start = match from {
            Some(s) => parse_arg(s)?,
            None => Local::now().date_naive(),
        };

        match to {
            Some(s) => Ok(DateWindow::new(start, parse_arg(s)?)),
            None => Ok(DateWindow::starting(start, default_days)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_arg(s: &str) -> FamcalResult<NaiveDate> {
    parse_date(s).ok_or_else(|| FamcalError::InvalidDate(s.to_string()))
}
