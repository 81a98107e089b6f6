use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::data::{IntervalClass, WorldClock};
use crate::error::{Error, Result};

/// Default photo service endpoint
pub const DEFAULT_PHOTO_SERVICE: &str = "https://source.unsplash.com";

/// User preferences, persisted as JSON.
///
/// Every field has a default so settings files written by older
/// versions keep loading when new fields are added. A field holding a
/// value of the wrong shape falls back on its own; the rest of the file
/// still loads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Photo category requested from the photo service
    #[serde(deserialize_with = "lenient")]
    pub theme: String,
    /// How often the background is replaced
    #[serde(deserialize_with = "lenient")]
    pub update_interval: IntervalClass,
    /// 24-hour "HH:MM" instead of "h:MM AM"
    #[serde(deserialize_with = "lenient")]
    pub long_time_format: bool,
    /// Show the three world clocks
    #[serde(deserialize_with = "lenient")]
    pub world_time: bool,
    #[serde(deserialize_with = "lenient_clocks")]
    pub clocks: [WorldClock; 3],
    /// When the background was last replaced from the photo service
    #[serde(deserialize_with = "lenient")]
    pub last_background_change: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient")]
    pub photo_service_url: String,
    /// Clear the loading flag when a fetch fails. Off by default, which
    /// keeps the flag set until a forced refresh.
    #[serde(deserialize_with = "lenient")]
    pub reset_loading_on_failure: bool,
}

/// Parse one field, replacing an unusable value with the type's default
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        warn!(%value, error = %e, "ignoring unusable settings value");
        T::default()
    }))
}

fn lenient_clocks<'de, D>(deserializer: D) -> std::result::Result<[WorldClock; 3], D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        warn!(%value, error = %e, "ignoring unusable world clocks");
        Settings::default().clocks
    }))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "nature".to_string(),
            update_interval: IntervalClass::Hour,
            long_time_format: false,
            world_time: false,
            clocks: [
                WorldClock::new("London", "Europe/London"),
                WorldClock::new("New York", "America/New_York"),
                WorldClock::new("Tokyo", "Asia/Tokyo"),
            ],
            last_background_change: None,
            photo_service_url: DEFAULT_PHOTO_SERVICE.to_string(),
            reset_loading_on_failure: false,
        }
    }
}

impl Settings {
    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Convert to pretty JSON for the settings file
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace values the rest of the app cannot use
    fn sanitize(&mut self) {
        for clock in self.clocks.iter_mut() {
            if clock.time_zone.parse::<Tz>().is_err() {
                warn!(zone = %clock.time_zone, clock = %clock.name, "unknown time zone, falling back to UTC");
                clock.time_zone = Tz::UTC.name().to_string();
            }
        }

        if self.theme.trim().is_empty() {
            self.theme = Settings::default().theme;
        }

        if self.photo_service_url.trim().is_empty() {
            self.photo_service_url = DEFAULT_PHOTO_SERVICE.to_string();
        }
    }
}

/// Owns the settings and the file they are saved to.
pub struct SettingsStore {
    settings: Settings,
    path: PathBuf,
}

impl SettingsStore {
    /// Load settings from the user's data directory:
    /// - Linux: ~/.local/share/unsplash-clock/settings.json
    /// - macOS: ~/Library/Application Support/unsplash-clock/settings.json
    /// - Windows: %APPDATA%\unsplash-clock\settings.json
    pub fn load_default() -> Self {
        Self::load(Self::default_path())
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields defaults. A malformed file is logged and
    /// replaced by defaults in memory; it is overwritten on the next save.
    pub fn load(path: PathBuf) -> Self {
        let settings = match fs::read_to_string(&path) {
            Ok(json) => match Settings::from_json(&json) {
                Ok(settings) => {
                    info!(path = %path.display(), "settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "settings file is unreadable, using defaults");
                    Settings::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no settings file yet, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read settings, using defaults");
                Settings::default()
            }
        };

        SettingsStore { settings, path }
    }

    fn default_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir);

        path.push("unsplash-clock");
        path.push("settings.json");
        path
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `edit` and write the result to disk.
    ///
    /// Returns true when the settings actually changed. Write failures
    /// are logged; the in-memory settings keep the edit.
    pub fn update(&mut self, edit: impl FnOnce(&mut Settings)) -> bool {
        let before = self.settings.clone();
        edit(&mut self.settings);

        if self.settings == before {
            return false;
        }

        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), error = %e, "failed to save settings");
        }
        true
    }

    /// Write the current settings to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = self.settings.to_json()?;
        fs::write(&self.path, json).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("path", &self.path)
            .finish()
    }
}
