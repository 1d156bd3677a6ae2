use crate::Result;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional config file looked up in the working directory
pub const CONFIG_FILE: &str = "linked_notes.toml";

/// Main runtime configuration for linked-notes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// JSON document holding the note settings
    pub settings_file: PathBuf,
    pub sequencer: SequencerConfig,
    pub workspace: WorkspaceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SequencerConfig {
    /// Enables the folder conform command. Rewrites every note; not idempotent.
    pub reconcile_enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Command used to open notes; the note path is appended
    pub open_with: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(), // pretty, json, compact
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (LINKED_NOTES_*, `__` between sections)
    /// 2. linked_notes.toml in the working directory (if it exists)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_dir(&std::env::current_dir()?)
    }

    /// Load configuration from a specific directory
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_file = dir.join(CONFIG_FILE);
        if config_file.exists() {
            builder = builder.add_source(File::from(config_file));
        }

        builder = builder.add_source(
            Environment::with_prefix("LINKED_NOTES")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Config = builder.build()?.try_deserialize()?;
        if config.settings_file.as_os_str().is_empty() {
            config.settings_file = default_settings_file();
        } else if config.settings_file.is_relative() {
            config.settings_file = dir.join(&config.settings_file);
        }
        Ok(config)
    }

    /// Create a new Config for testing
    #[cfg(test)]
    pub fn for_testing(dir: &Path) -> Self {
        Self {
            settings_file: dir.join("data.json"),
            sequencer: SequencerConfig {
                reconcile_enabled: true,
            },
            workspace: WorkspaceConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

/// `$XDG_CONFIG_HOME/linked-notes/data.json`, falling back to `~/.config`
/// and finally the working directory
pub fn default_settings_file() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("linked-notes").join("data.json")
}
