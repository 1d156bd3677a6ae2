//! Context-menu style command dispatch.
//!
//! Actions are registered against a kind of target (a folder, or a file
//! inside one) and dispatched to the [`Sequencer`].

use crate::ordering::Note;
use crate::sequencer::{CreateOutcome, Sequencer};
use crate::settings::Settings;
use crate::{Result, SequencerError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Folder,
    File,
}

/// What a command was invoked on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Folder(PathBuf),
    File(PathBuf),
}

impl Target {
    /// Classify an existing path on disk. A missing path is an error so
    /// a mistyped folder never falls back to its parent.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                SequencerError::NotFound(format!("{} does not exist", path.display()))
            }
            _ => SequencerError::Io(e),
        })?;

        if metadata.is_dir() {
            Ok(Target::Folder(path.to_path_buf()))
        } else {
            Ok(Target::File(path.to_path_buf()))
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Folder(_) => TargetKind::Folder,
            Target::File(_) => TargetKind::File,
        }
    }

    /// The folder an action on this target works in: the folder itself,
    /// or the parent of a file
    pub fn folder(&self) -> PathBuf {
        match self {
            Target::Folder(path) => path.clone(),
            Target::File(path) => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    NewUniqueNote,
    JumpToLast,
    ConformFolder,
}

impl MenuAction {
    pub fn title(&self) -> &'static str {
        match self {
            MenuAction::NewUniqueNote => "New unique note",
            MenuAction::JumpToLast => "Jump to last unique note",
            MenuAction::ConformFolder => "Conform folder to linked unique note",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Result of a dispatched action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Created(CreateOutcome),
    Opened(Option<Note>),
    Conformed(usize),
}

#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    registrations: Vec<(TargetKind, MenuAction)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard menu: new/jump on folders and files, conform on
    /// folders only and only when enabled
    pub fn standard(reconcile_enabled: bool) -> Self {
        let mut registry = Self::new();
        for kind in [TargetKind::Folder, TargetKind::File] {
            registry.register(kind, MenuAction::NewUniqueNote);
            registry.register(kind, MenuAction::JumpToLast);
        }
        if reconcile_enabled {
            registry.register(TargetKind::Folder, MenuAction::ConformFolder);
        }
        registry
    }

    pub fn register(&mut self, kind: TargetKind, action: MenuAction) {
        if !self.is_registered(kind, action) {
            self.registrations.push((kind, action));
        }
    }

    pub fn is_registered(&self, kind: TargetKind, action: MenuAction) -> bool {
        self.registrations.contains(&(kind, action))
    }

    /// Actions offered for `target`, in registration order
    pub fn menu_for(&self, target: &Target) -> Vec<MenuAction> {
        let kind = target.kind();
        self.registrations
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, action)| *action)
            .collect()
    }

    pub async fn dispatch(
        &self,
        sequencer: &Sequencer,
        settings: &Settings,
        action: MenuAction,
        target: &Target,
    ) -> Result<ActionOutcome> {
        if !self.is_registered(target.kind(), action) {
            return Err(SequencerError::NotFound(format!(
                "'{}' is not available for {:?}",
                action,
                target.kind()
            )));
        }

        let folder = target.folder();
        debug!(%action, folder = %folder.display(), "Dispatching action");

        match action {
            MenuAction::NewUniqueNote => sequencer
                .create_next(settings, &folder)
                .await
                .map(ActionOutcome::Created),
            MenuAction::JumpToLast => sequencer
                .locate_latest(settings, &folder)
                .await
                .map(ActionOutcome::Opened),
            MenuAction::ConformFolder => sequencer
                .reconcile(settings, &folder)
                .await
                .map(ActionOutcome::Conformed),
        }
    }
}
