//! Creating, finding and relinking chronologically ordered notes.

use crate::clock::{Clock, SystemClock};
use crate::header::{replace_header_block, NOTE_EXTENSION};
use crate::ordering::{latest_note, ordered_notes, Note};
use crate::settings::Settings;
use crate::vault::Vault;
use crate::workspace::Workspace;
use crate::{Result, SequencerError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What `create_next` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub path: PathBuf,
    pub name: String,
    /// The note that was latest before this one, now linking forward
    pub previous: Option<Note>,
    /// A file already existed at `path` and was replaced
    pub overwrote: bool,
}

pub struct Sequencer {
    vault: Arc<dyn Vault>,
    workspace: Arc<dyn Workspace>,
    clock: Arc<dyn Clock>,
    reconcile_enabled: bool,
}

impl Sequencer {
    pub fn new(vault: Arc<dyn Vault>, workspace: Arc<dyn Workspace>) -> Self {
        Self {
            vault,
            workspace,
            clock: Arc::new(SystemClock),
            reconcile_enabled: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Allow `reconcile`. It rewrites every note in a folder and is not
    /// idempotent, so it stays off unless asked for.
    pub fn with_reconcile(mut self, enabled: bool) -> Self {
        self.reconcile_enabled = enabled;
        self
    }

    pub fn reconcile_enabled(&self) -> bool {
        self.reconcile_enabled
    }

    /// Open the most recent note in `folder`. Does nothing when no name in
    /// the folder parses.
    #[instrument(skip(self, settings), fields(folder = %folder.display()))]
    pub async fn locate_latest(&self, settings: &Settings, folder: &Path) -> Result<Option<Note>> {
        let date_format = settings.date_format()?;
        let latest = latest_note(self.vault.as_ref(), folder, &date_format).await?;

        match &latest {
            Some(note) => {
                debug!(note = %note.name, "Opening latest note");
                self.workspace.open_note(&note.path).await?;
            }
            None => debug!("No dated notes in folder"),
        }
        Ok(latest)
    }

    /// Create a note named after the current time, linked back to the
    /// latest note, and point that note forward at the new one.
    ///
    /// A name collision only produces a notice; the existing file is
    /// replaced. Errors are not rolled back: if relinking the previous note
    /// fails, the new note has already been created.
    #[instrument(skip(self, settings), fields(folder = %folder.display()))]
    pub async fn create_next(&self, settings: &Settings, folder: &Path) -> Result<CreateOutcome> {
        let date_format = settings.date_format()?;
        let new_name = date_format.format(&self.clock.now());

        let notes = ordered_notes(self.vault.as_ref(), folder, &date_format).await?;
        let previous = notes.last().cloned();

        let path = folder.join(format!("{}{}", new_name, NOTE_EXTENSION));
        let overwrote = self.vault.exists(&path).await?;
        if overwrote {
            warn!(path = %path.display(), "Target note already exists, overwriting");
            self.workspace
                .notice(&format!("File {} already exists", path.display()));
        }

        let prev_name = previous
            .as_ref()
            .map(Note::bare_name)
            .unwrap_or_else(|| new_name.clone());
        let header = settings.header_format().render(&prev_name, &new_name);
        let contents = format!("{}{}", settings.template, header);

        self.vault.create(&path, &contents).await?;
        info!(note = %new_name, previous = %prev_name, "Created note");

        self.workspace.open_note(&path).await?;

        if let Some(prev) = &previous {
            self.relink_previous(prev, &new_name).await?;
        }

        Ok(CreateOutcome {
            path,
            name: new_name,
            previous,
            overwrote,
        })
    }

    /// Swap the first mention of the previous note's own name for the new
    /// note, keeping its timestamps. For a note created after another this
    /// is its "next" self-link; the very first note in a folder links to
    /// itself twice and has its "prev" slot rewritten instead.
    async fn relink_previous(&self, prev: &Note, new_name: &str) -> Result<()> {
        let text = self.vault.read(&prev.path).await?;
        let updated = text.replacen(&prev.bare_name(), new_name, 1);
        let stat = self.vault.stat(&prev.path).await?;
        self.vault.write(&prev.path, &updated, stat).await?;
        debug!(note = %prev.name, next = %new_name, "Relinked previous note");
        Ok(())
    }

    /// Rewrite the header of every note in `folder` to link to its
    /// neighbours. Returns the number of notes rewritten.
    ///
    /// The "next" cursor is clamped to the last note, so the final note
    /// links to itself. Each note's first `#zettelkasten ... span>` region
    /// is replaced wholesale; notes without one are written back unchanged.
    #[instrument(skip(self, settings), fields(folder = %folder.display()))]
    pub async fn reconcile(&self, settings: &Settings, folder: &Path) -> Result<usize> {
        if !self.reconcile_enabled {
            return Err(SequencerError::ReconcileDisabled);
        }

        let date_format = settings.date_format()?;
        let header_format = settings.header_format();
        let notes = ordered_notes(self.vault.as_ref(), folder, &date_format).await?;
        let Some(first) = notes.first() else {
            return Ok(0);
        };

        let last = notes.len() - 1;
        let mut prev = first;
        let mut next_idx = 1.min(last);

        for child in &notes {
            let next = &notes[next_idx];
            let header = header_format.render(&prev.bare_name(), &next.bare_name());
            let block = format!("{}{}", settings.template, header);

            let text = self.vault.read(&child.path).await?;
            let updated = replace_header_block(&text, &block);
            let stat = self.vault.stat(&child.path).await?;
            self.vault.write(&child.path, &updated, stat).await?;
            debug!(note = %child.name, prev = %prev.name, next = %next.name, "Conformed note");

            prev = child;
            next_idx = (next_idx + 1).min(last);
        }

        info!(count = notes.len(), "Conformed folder");
        Ok(notes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::vault::MemoryVault;
    use crate::workspace::RecordingWorkspace;
    use chrono::NaiveDate;

    const FOLDER: &str = "/vault/journal";

    struct Harness {
        vault: Arc<MemoryVault>,
        workspace: Arc<RecordingWorkspace>,
        sequencer: Sequencer,
        settings: Settings,
    }

    fn harness(hour: u32, minute: u32) -> Harness {
        let vault = Arc::new(MemoryVault::new());
        vault.add_folder(FOLDER).unwrap();
        let workspace = Arc::new(RecordingWorkspace::new());
        let now = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        let sequencer = Sequencer::new(vault.clone(), workspace.clone())
            .with_clock(Arc::new(FixedClock(now)));
        let settings = Settings {
            header_format: "<span>{prev}</span> <span>{next}</span>\n\n".to_string(),
            ..Settings::default()
        };

        Harness {
            vault,
            workspace,
            sequencer,
            settings,
        }
    }

    fn note_path(name: &str) -> PathBuf {
        Path::new(FOLDER).join(name)
    }

    #[tokio::test]
    async fn test_create_in_empty_folder_links_to_itself() {
        let h = harness(9, 15);
        let outcome = h
            .sequencer
            .create_next(&h.settings, Path::new(FOLDER))
            .await
            .unwrap();

        assert_eq!(outcome.name, "2024-05-06 at 09ː15");
        assert_eq!(outcome.path, note_path("2024-05-06 at 09ː15.md"));
        assert!(outcome.previous.is_none());
        assert!(!outcome.overwrote);

        let contents = h.vault.contents(&outcome.path).unwrap();
        assert_eq!(
            contents,
            "#zettelkasten \n\n<span>[[2024-05-06 at 09ː15]]</span> <span>[[2024-05-06 at 09ː15]]</span>\n\n"
        );
        assert_eq!(h.workspace.opened(), vec![outcome.path.clone()]);
        assert!(h.workspace.notices().is_empty());
    }

    #[tokio::test]
    async fn test_create_links_previous_note_both_ways() {
        let h = harness(9, 15);
        let prev = note_path("2024-05-05 at 20ː00.md");
        h.vault
            .add_file(
                &prev,
                "#zettelkasten \n\n<span>[[2024-05-04 at 07ː00]]</span> <span>[[2024-05-05 at 20ː00]]</span>\n\nbody mentions 2024-05-05 at 20ː00",
            )
            .unwrap();
        let before = h.vault.stat(&prev).await.unwrap();

        let outcome = h
            .sequencer
            .create_next(&h.settings, Path::new(FOLDER))
            .await
            .unwrap();

        assert_eq!(outcome.previous.as_ref().unwrap().path, prev);
        let created = h.vault.contents(&outcome.path).unwrap();
        assert!(created.contains("<span>[[2024-05-05 at 20ː00]]</span> <span>[[2024-05-06 at 09ː15]]</span>"));

        // only the first occurrence of the bare name changes
        assert_eq!(
            h.vault.contents(&prev).unwrap(),
            "#zettelkasten \n\n<span>[[2024-05-04 at 07ː00]]</span> <span>[[2024-05-06 at 09ː15]]</span>\n\nbody mentions 2024-05-05 at 20ː00"
        );
        assert_eq!(h.vault.stat(&prev).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_create_picks_latest_conforming_note() {
        let h = harness(9, 15);
        h.vault.add_file(note_path("2024-05-01 at 10ː00.md"), "").unwrap();
        h.vault.add_file(note_path("2024-05-03 at 10ː00.md"), "").unwrap();
        h.vault.add_file(note_path("2024-05-02 at 10ː00.md"), "").unwrap();
        h.vault.add_file(note_path("zzz ideas.md"), "").unwrap();

        let outcome = h
            .sequencer
            .create_next(&h.settings, Path::new(FOLDER))
            .await
            .unwrap();
        assert_eq!(outcome.previous.unwrap().name, "2024-05-03 at 10ː00.md");
    }

    #[tokio::test]
    async fn test_create_over_existing_file_warns_and_overwrites() {
        let h = harness(9, 15);
        let target = note_path("2024-05-06 at 09ː15.md");
        h.vault.add_file(&target, "precious").unwrap();

        let outcome = h
            .sequencer
            .create_next(&h.settings, Path::new(FOLDER))
            .await
            .unwrap();

        assert!(outcome.overwrote);
        assert_eq!(
            h.workspace.notices(),
            vec![format!("File {} already exists", target.display())]
        );
        let contents = h.vault.contents(&target).unwrap();
        assert!(contents.starts_with("#zettelkasten"));
        assert!(!contents.contains("precious"));
    }

    #[tokio::test]
    async fn test_relink_failure_leaves_new_note_in_place() {
        let h = harness(9, 15);
        let prev = note_path("2024-05-05 at 20ː00.md");
        h.vault.add_file(&prev, "[[2024-05-05 at 20ː00]]").unwrap();
        h.vault.fail_writes_to(&prev).unwrap();

        let result = h
            .sequencer
            .create_next(&h.settings, Path::new(FOLDER))
            .await;

        assert!(matches!(result, Err(SequencerError::Io(_))));
        assert!(h.vault.contents(&note_path("2024-05-06 at 09ː15.md")).is_some());
        assert_eq!(h.vault.contents(&prev).unwrap(), "[[2024-05-05 at 20ː00]]");
    }

    #[tokio::test]
    async fn test_create_in_missing_folder_propagates() {
        let h = harness(9, 15);
        let result = h
            .sequencer
            .create_next(&h.settings, Path::new("/vault/elsewhere"))
            .await;
        assert!(matches!(result, Err(SequencerError::Io(_))));
        assert!(h.workspace.opened().is_empty());
    }

    #[tokio::test]
    async fn test_locate_latest_opens_newest() {
        let h = harness(9, 15);
        h.vault.add_file(note_path("2024-05-01 at 10ː00.md"), "").unwrap();
        h.vault.add_file(note_path("2024-05-02 at 09ː00.md"), "").unwrap();

        let latest = h
            .sequencer
            .locate_latest(&h.settings, Path::new(FOLDER))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(latest.name, "2024-05-02 at 09ː00.md");
        assert_eq!(h.workspace.opened(), vec![latest.path]);
    }

    #[tokio::test]
    async fn test_locate_latest_in_folder_without_notes_is_noop() {
        let h = harness(9, 15);
        h.vault.add_file(note_path("todo.md"), "").unwrap();

        let latest = h
            .sequencer
            .locate_latest(&h.settings, Path::new(FOLDER))
            .await
            .unwrap();
        assert!(latest.is_none());
        assert!(h.workspace.opened().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_is_disabled_by_default() {
        let h = harness(9, 15);
        h.vault.add_file(note_path("2024-05-01 at 10ː00.md"), "x").unwrap();

        let result = h.sequencer.reconcile(&h.settings, Path::new(FOLDER)).await;
        assert!(matches!(result, Err(SequencerError::ReconcileDisabled)));
        assert_eq!(
            h.vault.contents(&note_path("2024-05-01 at 10ː00.md")).unwrap(),
            "x"
        );
    }

    #[tokio::test]
    async fn test_reconcile_clamps_next_to_last_note() {
        let mut h = harness(9, 15);
        h.sequencer = h.sequencer.with_reconcile(true);
        let names = ["2024-05-01 at 10ː00", "2024-05-02 at 10ː00", "2024-05-03 at 10ː00"];
        for name in names {
            h.vault
                .add_file(
                    note_path(&format!("{}.md", name)),
                    "#zettelkasten \n\n<span>stale</span> <span>stale</span>\n\nbody",
                )
                .unwrap();
        }
        let before = h.vault.stat(&note_path("2024-05-02 at 10ː00.md")).await.unwrap();

        let count = h
            .sequencer
            .reconcile(&h.settings, Path::new(FOLDER))
            .await
            .unwrap();
        assert_eq!(count, 3);

        let format = h.settings.header_format();
        let links = |name: &str| {
            let text = h.vault.contents(&note_path(&format!("{}.md", name))).unwrap();
            assert!(text.ends_with("\n\n\n\nbody"));
            format.parse_links(&text).unwrap()
        };
        let pair = |a: &str, b: &str| (a.to_string(), b.to_string());

        assert_eq!(links(names[0]), pair(names[0], names[1]));
        assert_eq!(links(names[1]), pair(names[0], names[2]));
        assert_eq!(links(names[2]), pair(names[1], names[2]));
        assert_eq!(
            h.vault.stat(&note_path("2024-05-02 at 10ː00.md")).await.unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn test_reconcile_single_note_links_to_itself() {
        let mut h = harness(9, 15);
        h.sequencer = h.sequencer.with_reconcile(true);
        let path = note_path("2024-05-01 at 10ː00.md");
        h.vault.add_file(&path, "#zettelkasten <span>old</span>").unwrap();

        assert_eq!(
            h.sequencer
                .reconcile(&h.settings, Path::new(FOLDER))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            h.vault.contents(&path).unwrap(),
            "#zettelkasten \n\n<span>[[2024-05-01 at 10ː00]]</span> <span>[[2024-05-01 at 10ː00]]</span>\n\n"
        );
    }

    #[tokio::test]
    async fn test_reconcile_empty_folder() {
        let mut h = harness(9, 15);
        h.sequencer = h.sequencer.with_reconcile(true);
        assert_eq!(
            h.sequencer
                .reconcile(&h.settings, Path::new(FOLDER))
                .await
                .unwrap(),
            0
        );
    }
}
