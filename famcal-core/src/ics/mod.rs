//! Calendar file (RFC 5545) export.

mod generate;
pub mod timezone;

pub use generate::{ICS_CONTENT_TYPE, PRODID, content_disposition, ics_filename, serialize, serialize_at};
