use thiserror::Error;

pub type Result<T> = std::result::Result<T, SequencerError>;

#[derive(Error, Debug)]
pub enum SequencerError {
    // Standard library errors with automatic conversion
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Note sequencing errors
    #[error("Invalid date format '{pattern}': {reason}")]
    InvalidDateFormat { pattern: String, reason: String },

    #[error("Folder conforming is disabled; enable sequencer.reconcile_enabled to use it")]
    ReconcileDisabled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<&str> for SequencerError {
    fn from(msg: &str) -> Self {
        SequencerError::Internal(msg.to_string())
    }
}

impl From<String> for SequencerError {
    fn from(msg: String) -> Self {
        SequencerError::Internal(msg)
    }
}
