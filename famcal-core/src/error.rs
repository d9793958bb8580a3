//! Error types for famcal.

use thiserror::Error;

/// Errors that can occur while expanding or exporting family events.
#[derive(Error, Debug)]
pub enum FamcalError {
    #[error("Event '{id}' has an invalid event_date '{value}' (expected YYYY-MM-DD)")]
    InvalidEventDate { id: String, value: String },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Family not found: {0}")]
    FamilyNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FamcalError {
    /// True for errors caused by a missing family or event.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FamcalError::EventNotFound(_) | FamcalError::FamilyNotFound(_)
        )
    }

    /// True for errors caused by malformed caller input rather than the environment.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            FamcalError::InvalidEventDate { .. }
                | FamcalError::InvalidDate(_)
                | FamcalError::UnknownTimezone(_)
        )
    }
}

/// Result type alias for famcal operations.
pub type FamcalResult<T> = Result<T, FamcalError>;
