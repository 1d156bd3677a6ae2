//! Persisted note settings and the panel used to edit them.

use crate::date_format::DateFormat;
use crate::header::HeaderFormat;
use crate::{Result, SequencerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(any(test, feature = "test-helpers"))]
use std::sync::Mutex;
use tracing::debug;

pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD \\at HHːmm";
pub const DEFAULT_HEADER_FORMAT: &str = "<span style=\"display: block;text-align: left;\">←{prev}</span> <span style=\"display: block;text-align: right;\">{next}→</span>\n\n";
pub const DEFAULT_TEMPLATE: &str = "#zettelkasten \n\n";

/// User preferences for naming and linking notes.
///
/// Missing keys in stored data fall back to the defaults one field at a
/// time, and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub date_format: String,
    pub header_format: String,
    /// Static prefix of every new note. Not editable from the panel.
    pub template: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            header_format: DEFAULT_HEADER_FORMAT.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Settings {
    pub fn date_format(&self) -> Result<DateFormat> {
        DateFormat::new(&self.date_format)
    }

    pub fn header_format(&self) -> HeaderFormat {
        HeaderFormat::new(&self.header_format)
    }
}

/// Key-value persistence for [`Settings`]
pub trait SettingsStore: Send + Sync {
    /// Load stored settings, `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<Settings>>;

    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Load settings merged over the defaults
pub fn load_settings(store: &dyn SettingsStore) -> Result<Settings> {
    Ok(store.load()?.unwrap_or_default())
}

/// Settings stored as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No stored settings, using defaults");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let settings = serde_json::from_str(&raw)?;
        Ok(Some(settings))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// In-process store for tests
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Settings>>,
    saves: Mutex<usize>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
            saves: Mutex::new(0),
        }
    }

    /// Number of times `save` was called
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>> {
        let saved = self
            .saved
            .lock()
            .map_err(|e| SequencerError::Internal(format!("settings lock poisoned: {}", e)))?;
        Ok(saved.clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| SequencerError::Internal(format!("settings lock poisoned: {}", e)))?;
        *saved = Some(settings.clone());
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

/// An editable field shown by the settings panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingField {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub value: String,
}

/// Edits settings one field at a time, flushing every change to the store
pub struct SettingsPanel<'a> {
    settings: &'a mut Settings,
    store: &'a dyn SettingsStore,
}

impl<'a> SettingsPanel<'a> {
    pub const TITLE: &'static str = "Unique linked note - settings";

    pub fn new(settings: &'a mut Settings, store: &'a dyn SettingsStore) -> Self {
        Self { settings, store }
    }

    pub fn fields(&self) -> Vec<SettingField> {
        vec![
            SettingField {
                key: "date-format",
                name: "Date format",
                description: "Date format used for ordering your notes",
                value: self.settings.date_format.clone(),
            },
            SettingField {
                key: "header-format",
                name: "Header format",
                description: "Header format used for ordering your notes",
                value: self.settings.header_format.clone(),
            },
        ]
    }

    /// Update a field and persist immediately.
    ///
    /// Date formats are compiled before they are accepted so a broken
    /// pattern never reaches the store.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "date-format" | "dateFormat" => {
                DateFormat::new(value)?;
                self.settings.date_format = value.to_string();
            }
            "header-format" | "headerFormat" => {
                self.settings.header_format = value.to_string();
            }
            other => return Err(SequencerError::UnknownSetting(other.to_string())),
        }

        self.store.save(&*self.settings)
    }
}
