use std::sync::Arc;

use anyhow::Result;
use famcal_core::config::FamcalConfig;
use famcal_core::store::{EventSource, JsonStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // The JSON store re-reads its file per request, so edits show up without a restart
    pub store: Arc<dyn EventSource + Send + Sync>,
    /// Zone for exports when neither the request nor the profile names one
    pub default_timezone: String,
    pub window_days: u64,
}

impl AppState {
    pub fn new(config: &FamcalConfig) -> Result<Self> {
        let store = JsonStore::new(config.events_path());
        // Verify the store can be read at startup
        store.load()?;

        Ok(AppState {
            store: Arc::new(store),
            default_timezone: config
                .default_timezone
                .clone()
                .unwrap_or_else(|| "UTC".to_string()),
            window_days: config.agenda_days,
        })
    }

    pub fn with_source(store: Arc<dyn EventSource + Send + Sync>, default_timezone: &str) -> Self {
        AppState {
            store,
            default_timezone: default_timezone.to_string(),
            window_days: famcal_core::date_range::DEFAULT_WINDOW_DAYS,
        }
    }
}
