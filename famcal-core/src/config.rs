//! Famcal configuration.
//!
//! Read from `~/.config/famcal/config.toml`, then overlaid with `FAMCAL_*`
//! environment variables (e.g. `FAMCAL_DEFAULT_TIMEZONE`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::date_range::DEFAULT_WINDOW_DAYS;
use crate::error::{FamcalError, FamcalResult};

static DEFAULT_EVENTS_FILE: &str = "~/.local/share/famcal/events.json";
pub const DEFAULT_SERVER_PORT: u16 = 4097;

fn default_events_file() -> PathBuf {
    PathBuf::from(DEFAULT_EVENTS_FILE)
}

fn default_agenda_days() -> u64 {
    DEFAULT_WINDOW_DAYS
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

#[derive(Debug, Deserialize, Clone)]
pub struct FamcalConfig {
    #[serde(default = "default_events_file")]
    pub events_file: PathBuf,

    /// Family used when a command doesn't name one.
    pub default_family: Option<String>,

    /// IANA zone for exports when no profile preference applies.
    pub default_timezone: Option<String>,

    #[serde(default = "default_agenda_days")]
    pub agenda_days: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

impl Default for FamcalConfig {
    fn default() -> Self {
        FamcalConfig {
            events_file: default_events_file(),
            default_family: None,
            default_timezone: None,
            agenda_days: default_agenda_days(),
            server_port: default_server_port(),
        }
    }
}

impl FamcalConfig {
    pub fn config_path() -> FamcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FamcalError::Config("Could not determine config directory".into()))?
            .join("famcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location plus environment overrides.
    pub fn load() -> FamcalResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (optional) plus environment overrides.
    pub fn load_from(path: &Path) -> FamcalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("FAMCAL").try_parsing(true))
            .build()
            .map_err(|e| FamcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FamcalError::Config(e.to_string()))
    }

    /// Events file with `~` expanded.
    pub fn events_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.events_file.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> FamcalResult<()> {
        let contents = format!(
            "\
# famcal configuration

# JSON file holding families, their events and profile preferences:
# events_file = \"{}\"

# Family used when --family is not given:
# default_family = \"smiths\"

# Timezone for .ics exports when the profile has none (IANA name):
# default_timezone = \"America/New_York\"

# Days shown by `famcal agenda` when --to is not given:
# agenda_days = {}

# Port for famcal-server:
# server_port = {}
",
            DEFAULT_EVENTS_FILE, DEFAULT_WINDOW_DAYS, DEFAULT_SERVER_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FamcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FamcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FamcalConfig::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.events_file, PathBuf::from(DEFAULT_EVENTS_FILE));
        assert_eq!(config.agenda_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
    }

    #[test]
    fn reads_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "events_file = \"/srv/famcal/events.json\"\ndefault_family = \"smiths\"\ndefault_timezone = \"Europe/Oslo\"\nagenda_days = 14\n",
        )
        .unwrap();

        let config = FamcalConfig::load_from(&path).unwrap();
        assert_eq!(config.events_path(), PathBuf::from("/srv/famcal/events.json"));
        assert_eq!(config.default_family.as_deref(), Some("smiths"));
        assert_eq!(config.default_timezone.as_deref(), Some("Europe/Oslo"));
        assert_eq!(config.agenda_days, 14);
    }

    #[test]
    fn default_config_file_is_all_comments_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        FamcalConfig::create_default_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().all(|l| l.is_empty() || l.starts_with('#')));

        let config = FamcalConfig::load_from(&path).unwrap();
        assert_eq!(config.agenda_days, DEFAULT_WINDOW_DAYS);
    }
}
