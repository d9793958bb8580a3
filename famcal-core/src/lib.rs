//! Core of the famcal family calendar.
//!
//! - [`expand()`] turns stored event records into per-day occurrences for a window
//! - [`ics::serialize`] renders one event as an RFC 5545 calendar file
//! - [`store`] and [`config`] describe where records and settings come from

pub mod config;
pub mod date_range;
pub mod dates;
pub mod error;
pub mod event;
pub mod expand;
pub mod ics;
pub mod occurrence;
pub mod recurrence;
pub mod store;

pub use date_range::DateWindow;
pub use error::{FamcalError, FamcalResult};
pub use event::{EventRecord, Recurrence, RecurrencePattern};
pub use expand::{expand, expand_window, is_multi_day_event, is_recurring_event};
pub use occurrence::Occurrence;
pub use recurrence::describe_recurrence;
