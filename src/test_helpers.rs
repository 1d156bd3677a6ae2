//! Test helpers for creating hermetic note folders
//!
//! ```rust,ignore
//! let folder = TestFolder::new()?;
//! folder.add_note("2024-01-01 at 10ː00.md", "#zettelkasten \n\n")?;
//! // work with folder.root()
//! ```

use crate::{Result, SequencerError};
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

/// A note folder in a temporary directory, removed on drop
pub struct TestFolder {
    temp_dir: TempDir,
}

impl TestFolder {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()
            .map_err(|e| SequencerError::Internal(format!("Failed to create temp directory: {}", e)))?;
        Ok(Self { temp_dir })
    }

    /// Write a note at `relative_path`, creating parent folders
    pub fn add_note(&self, relative_path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.path(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)?;
        Ok(file_path)
    }

    pub fn read(&self, relative_path: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path(relative_path))?)
    }

    pub fn mtime(&self, relative_path: &str) -> Result<SystemTime> {
        Ok(fs::metadata(self.path(relative_path))?.modified()?)
    }

    /// Backdate a note so timestamp preservation is observable
    pub fn set_mtime(&self, relative_path: &str, mtime: SystemTime) -> Result<()> {
        File::options()
            .write(true)
            .open(self.path(relative_path))?
            .set_times(FileTimes::new().set_modified(mtime))?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Names of the files directly inside the folder, sorted
    pub fn note_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.root())? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
