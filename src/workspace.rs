//! Where notes get opened and notices get shown.

use crate::{Result, SequencerError};
use async_trait::async_trait;
use std::path::Path;
#[cfg(any(test, feature = "test-helpers"))]
use std::{path::PathBuf, sync::Mutex};
use tracing::{debug, warn};

#[async_trait]
pub trait Workspace: Send + Sync {
    /// Bring a note to the user's attention
    async fn open_note(&self, path: &Path) -> Result<()>;

    /// Show a transient, non-fatal message
    fn notice(&self, message: &str);
}

/// Terminal workspace: prints opened notes or hands them to a command
#[derive(Debug, Clone, Default)]
pub struct ConsoleWorkspace {
    open_with: Option<String>,
}

impl ConsoleWorkspace {
    pub fn new(open_with: Option<String>) -> Self {
        Self {
            open_with: open_with.filter(|cmd| !cmd.trim().is_empty()),
        }
    }
}

#[async_trait]
impl Workspace for ConsoleWorkspace {
    async fn open_note(&self, path: &Path) -> Result<()> {
        let Some(command) = &self.open_with else {
            println!("{}", path.display());
            return Ok(());
        };

        // "code -r" style commands: first word is the program, the rest are
        // leading arguments before the note path
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| SequencerError::Internal("empty open command".to_string()))?;

        debug!(program, path = %path.display(), "Opening note");
        let status = tokio::process::Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .await?;

        if !status.success() {
            return Err(SequencerError::Internal(format!(
                "'{}' exited with {} while opening {}",
                command,
                status,
                path.display()
            )));
        }
        Ok(())
    }

    fn notice(&self, message: &str) {
        warn!("{}", message);
        eprintln!("⚠️  {}", message);
    }
}

/// Records everything it is asked to do
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingWorkspace {
    opened: Mutex<Vec<PathBuf>>,
    notices: Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
#[async_trait]
impl Workspace for RecordingWorkspace {
    async fn open_note(&self, path: &Path) -> Result<()> {
        self.opened
            .lock()
            .map_err(|e| SequencerError::Internal(format!("workspace lock poisoned: {}", e)))?
            .push(path.to_path_buf());
        Ok(())
    }

    fn notice(&self, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(message.to_string());
        }
    }
}
