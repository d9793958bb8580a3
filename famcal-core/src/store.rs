//! Storage boundary: where event records and profile preferences come from.
//!
//! The expander and serializer never talk to storage; callers fetch a family's
//! records through an [`EventSource`] and hand them over.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FamcalError, FamcalResult};
use crate::event::EventRecord;

pub trait EventSource {
    /// All event records belonging to a family.
    fn family_events(&self, family_id: &str) -> FamcalResult<Vec<EventRecord>>;

    /// A profile's preferred IANA timezone, if it has set one.
    fn profile_timezone(&self, profile_id: &str) -> FamcalResult<Option<String>>;

    fn find_event(&self, family_id: &str, event_id: &str) -> FamcalResult<EventRecord> {
        self.family_events(family_id)?
            .into_iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| FamcalError::EventNotFound(event_id.to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// The whole store as one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub families: Vec<Family>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl StoreDocument {
    pub fn family_ids(&self) -> Vec<String> {
        self.families.iter().map(|f| f.id.clone()).collect()
    }
}

impl EventSource for StoreDocument {
    fn family_events(&self, family_id: &str) -> FamcalResult<Vec<EventRecord>> {
        self.families
            .iter()
            .find(|f| f.id == family_id)
            .map(|f| f.events.clone())
            .ok_or_else(|| FamcalError::FamilyNotFound(family_id.to_string()))
    }

    fn profile_timezone(&self, profile_id: &str) -> FamcalResult<Option<String>> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.id == profile_id)
            .and_then(|p| p.timezone.clone())
            .filter(|tz| !tz.trim().is_empty()))
    }
}

/// Pick the zone for an export: an explicit choice wins, then the profile's
/// preference. `None` leaves the fallback to the caller.
pub fn export_timezone<S: EventSource + ?Sized>(
    source: &S,
    explicit: Option<&str>,
    profile_id: Option<&str>,
) -> FamcalResult<Option<String>> {
    if let Some(tz) = explicit.map(str::trim).filter(|tz| !tz.is_empty()) {
        return Ok(Some(tz.to_string()));
    }
    match profile_id {
        Some(id) => source.profile_timezone(id),
        None => Ok(None),
    }
}

/// A store backed by a JSON file, re-read on every call to pick up edits.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    pub fn load(&self) -> FamcalResult<StoreDocument> {
        if !self.path.exists() {
            return Err(FamcalError::Store(format!(
                "events file not found: {}",
                self.path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let document: StoreDocument = serde_json::from_str(&content)?;

        tracing::debug!(
            path = %self.path.display(),
            families = document.families.len(),
            "loaded event store"
        );

        Ok(document)
    }
}

impl EventSource for JsonStore {
    fn family_events(&self, family_id: &str) -> FamcalResult<Vec<EventRecord>> {
        self.load()?.family_events(family_id)
    }

    fn profile_timezone(&self, profile_id: &str) -> FamcalResult<Option<String>> {
        self.load()?.profile_timezone(profile_id)
    }
}
