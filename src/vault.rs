//! Storage seam for note folders.
//!
//! [`FsVault`] works on the local file system. With the `test-helpers`
//! feature, `MemoryVault` keeps everything in process and can simulate
//! write failures.

use crate::{Result, SequencerError};
use async_trait::async_trait;
use std::fs::{File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// A direct child of a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Creation and modification times of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteStat {
    pub ctime: Option<SystemTime>,
    pub mtime: Option<SystemTime>,
}

#[async_trait]
pub trait Vault: Send + Sync {
    /// Direct children of `folder`, sorted by name
    async fn list(&self, folder: &Path) -> Result<Vec<Entry>>;

    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create `path` with `contents`, replacing any existing file
    async fn create(&self, path: &Path, contents: &str) -> Result<()>;

    async fn read(&self, path: &Path) -> Result<String>;

    /// Timestamps of `path`, `None` if it does not exist
    async fn stat(&self, path: &Path) -> Result<Option<NoteStat>>;

    /// Overwrite `path`. When `times` is given they are restored after the
    /// write instead of letting it bump the modification time.
    async fn write(&self, path: &Path, contents: &str, times: Option<NoteStat>) -> Result<()>;
}

/// Notes stored as files on disk
#[derive(Debug, Clone, Default)]
pub struct FsVault;

impl FsVault {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Vault for FsVault {
    async fn list(&self, folder: &Path) -> Result<Vec<Entry>> {
        let folder = folder.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<Vec<Entry>> {
            let mut entries = Vec::new();

            for entry in WalkDir::new(&folder)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(std::io::Error::from)?;
                let path = entry.path();
                let kind = if path.is_file() {
                    EntryKind::File
                } else if path.is_dir() {
                    EntryKind::Folder
                } else {
                    trace!(path = %path.display(), "Skipping dangling entry");
                    continue;
                };

                entries.push(Entry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: path.to_path_buf(),
                    kind,
                });
            }

            debug!(folder = %folder.display(), count = entries.len(), "Listed folder");
            Ok(entries)
        })
        .await
        .map_err(|e| SequencerError::Internal(format!("folder listing task failed: {}", e)))?
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }

    async fn create(&self, path: &Path, contents: &str) -> Result<()> {
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<String> {
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn stat(&self, path: &Path) -> Result<Option<NoteStat>> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(Some(NoteStat {
                ctime: meta.created().ok(),
                mtime: meta.modified().ok(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &Path, contents: &str, times: Option<NoteStat>) -> Result<()> {
        tokio::fs::write(path, contents).await?;

        if let Some(stat) = times {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || restore_times(&path, stat))
                .await
                .map_err(|e| SequencerError::Internal(format!("timestamp restore task failed: {}", e)))??;
        }
        Ok(())
    }
}

fn restore_times(path: &Path, stat: NoteStat) -> Result<()> {
    let mut times = FileTimes::new();
    if let Some(mtime) = stat.mtime {
        times = times.set_modified(mtime);
    }
    // Creation time can only be set where the platform exposes it; on
    // Linux it stays whatever the file system recorded.
    #[cfg(target_os = "macos")]
    if let Some(ctime) = stat.ctime {
        use std::os::macos::fs::FileTimesExt;
        times = times.set_created(ctime);
    }
    #[cfg(windows)]
    if let Some(ctime) = stat.ctime {
        use std::os::windows::fs::FileTimesExt;
        times = times.set_created(ctime);
    }

    File::options().write(true).open(path)?.set_times(times)?;
    trace!(path = %path.display(), "Restored note timestamps");
    Ok(())
}

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryVault;

#[cfg(any(test, feature = "test-helpers"))]
mod memory {
    use super::{Entry, EntryKind, NoteStat, Vault};
    use crate::{Result, SequencerError};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, BTreeSet, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    #[derive(Debug, Clone)]
    struct MemoryFile {
        contents: String,
        stat: NoteStat,
    }

    #[derive(Debug, Default)]
    struct MemoryState {
        files: BTreeMap<PathBuf, MemoryFile>,
        folders: BTreeSet<PathBuf>,
        failing_writes: HashSet<PathBuf>,
        tick: u64,
    }

    impl MemoryState {
        /// Every mutation advances a logical clock so timestamp changes are visible
        fn next_instant(&mut self) -> SystemTime {
            self.tick += 1;
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + self.tick)
        }
    }

    /// Vault kept entirely in memory
    #[derive(Debug, Default)]
    pub struct MemoryVault {
        state: Mutex<MemoryState>,
    }

    impl MemoryVault {
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
            self.state
                .lock()
                .map_err(|e| SequencerError::Internal(format!("vault lock poisoned: {}", e)))
        }

        pub fn add_folder(&self, path: impl Into<PathBuf>) -> Result<()> {
            self.lock()?.folders.insert(path.into());
            Ok(())
        }

        /// Seed a file, registering its parent as a folder
        pub fn add_file(&self, path: impl Into<PathBuf>, contents: &str) -> Result<()> {
            let path = path.into();
            let mut state = self.lock()?;
            if let Some(parent) = path.parent() {
                state.folders.insert(parent.to_path_buf());
            }
            let now = state.next_instant();
            state.files.insert(
                path,
                MemoryFile {
                    contents: contents.to_string(),
                    stat: NoteStat {
                        ctime: Some(now),
                        mtime: Some(now),
                    },
                },
            );
            Ok(())
        }

        pub fn contents(&self, path: &Path) -> Option<String> {
            self.lock().ok()?.files.get(path).map(|f| f.contents.clone())
        }

        /// Make every later `write` to `path` fail with a permission error
        pub fn fail_writes_to(&self, path: impl Into<PathBuf>) -> Result<()> {
            self.lock()?.failing_writes.insert(path.into());
            Ok(())
        }
    }

    fn not_found(path: &Path) -> SequencerError {
        SequencerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))
    }

    #[async_trait]
    impl Vault for MemoryVault {
        async fn list(&self, folder: &Path) -> Result<Vec<Entry>> {
            let state = self.lock()?;
            if !state.folders.contains(folder) {
                return Err(not_found(folder));
            }

            let mut entries: Vec<Entry> = state
                .files
                .keys()
                .filter(|path| path.parent() == Some(folder))
                .map(|path| (path, EntryKind::File))
                .chain(
                    state
                        .folders
                        .iter()
                        .filter(|path| path.parent() == Some(folder))
                        .map(|path| (path, EntryKind::Folder)),
                )
                .map(|(path, kind)| Entry {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: path.clone(),
                    kind,
                })
                .collect();
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        }

        async fn exists(&self, path: &Path) -> Result<bool> {
            let state = self.lock()?;
            Ok(state.files.contains_key(path) || state.folders.contains(path))
        }

        async fn create(&self, path: &Path, contents: &str) -> Result<()> {
            let mut state = self.lock()?;
            match path.parent() {
                Some(parent) if state.folders.contains(parent) => {}
                _ => return Err(not_found(path)),
            }
            let now = state.next_instant();
            state.files.insert(
                path.to_path_buf(),
                MemoryFile {
                    contents: contents.to_string(),
                    stat: NoteStat {
                        ctime: Some(now),
                        mtime: Some(now),
                    },
                },
            );
            Ok(())
        }

        async fn read(&self, path: &Path) -> Result<String> {
            self.lock()?
                .files
                .get(path)
                .map(|f| f.contents.clone())
                .ok_or_else(|| not_found(path))
        }

        async fn stat(&self, path: &Path) -> Result<Option<NoteStat>> {
            Ok(self.lock()?.files.get(path).map(|f| f.stat))
        }

        async fn write(&self, path: &Path, contents: &str, times: Option<NoteStat>) -> Result<()> {
            let mut state = self.lock()?;
            if state.failing_writes.contains(path) {
                return Err(SequencerError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("write to {} rejected", path.display()),
                )));
            }

            let now = state.next_instant();
            let file = state.files.get_mut(path).ok_or_else(|| not_found(path))?;
            file.contents = contents.to_string();
            file.stat = match times {
                Some(stat) => NoteStat {
                    ctime: stat.ctime.or(file.stat.ctime),
                    mtime: stat.mtime.or(Some(now)),
                },
                None => NoteStat {
                    ctime: file.stat.ctime,
                    mtime: Some(now),
                },
            };
            Ok(())
        }
    }
}
