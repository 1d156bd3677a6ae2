//! Chronological ordering of the notes in a folder.

use crate::date_format::DateFormat;
use crate::header::bare_name;
use crate::vault::{Entry, Vault};
use crate::Result;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A file whose name parses as a timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub name: String,
    pub path: PathBuf,
    pub timestamp: NaiveDateTime,
}

impl Note {
    /// File name without its `.md` extension, as used in links
    pub fn bare_name(&self) -> String {
        bare_name(&self.name)
    }
}

/// Keep the file entries whose names parse against `format`, oldest first.
///
/// Names that do not parse are dropped silently. Notes sharing a timestamp
/// keep their listing order.
pub fn order_entries<I>(entries: I, format: &DateFormat) -> Vec<Note>
where
    I: IntoIterator<Item = Entry>,
{
    let mut notes: Vec<Note> = entries
        .into_iter()
        .filter(Entry::is_file)
        .filter_map(|entry| match format.parse(&entry.name) {
            Some(timestamp) => Some(Note {
                name: entry.name,
                path: entry.path,
                timestamp,
            }),
            None => {
                trace!(name = %entry.name, "Name does not match date format, skipping");
                None
            }
        })
        .collect();

    notes.sort_by_key(|note| note.timestamp);
    notes
}

/// List `folder` and order its notes
pub async fn ordered_notes(
    vault: &dyn Vault,
    folder: &Path,
    format: &DateFormat,
) -> Result<Vec<Note>> {
    let entries = vault.list(folder).await?;
    let total = entries.len();
    let notes = order_entries(entries, format);
    debug!(
        folder = %folder.display(),
        entries = total,
        notes = notes.len(),
        "Ordered folder"
    );
    Ok(notes)
}

/// The most recent note in `folder`, if any name parses
pub async fn latest_note(
    vault: &dyn Vault,
    folder: &Path,
    format: &DateFormat,
) -> Result<Option<Note>> {
    Ok(ordered_notes(vault, folder, format).await?.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_DATE_FORMAT;
    use crate::vault::{EntryKind, MemoryVault};

    fn file(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            path: PathBuf::from("/notes").join(name),
            kind: EntryKind::File,
        }
    }

    fn names(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_orders_parseable_names_ascending() {
        let format = DateFormat::new(DEFAULT_DATE_FORMAT).unwrap();
        let entries = vec![
            file("2024-02-01 at 08ː00.md"),
            file("README.md"),
            file("2023-12-31 at 23ː59.md"),
            file("2024-01-15 at 12ː30.md"),
            file("scratch.txt"),
        ];

        let notes = order_entries(entries, &format);
        assert_eq!(
            names(&notes),
            vec![
                "2023-12-31 at 23ː59.md",
                "2024-01-15 at 12ː30.md",
                "2024-02-01 at 08ː00.md",
            ]
        );
    }

    #[test]
    fn test_folders_are_ignored() {
        let format = DateFormat::new("YYYY-MM-DD").unwrap();
        let mut folder = file("2024-01-01");
        folder.kind = EntryKind::Folder;

        let notes = order_entries(vec![folder, file("2024-01-02.md")], &format);
        assert_eq!(names(&notes), vec!["2024-01-02.md"]);
    }

    #[test]
    fn test_ties_keep_listing_order() {
        let format = DateFormat::new("YYYY-MM-DD").unwrap();
        let entries = vec![
            file("2024-01-02 second.md"),
            file("2024-01-01.md"),
            file("2024-01-02 first.md"),
        ];

        let notes = order_entries(entries, &format);
        assert_eq!(
            names(&notes),
            vec!["2024-01-01.md", "2024-01-02 second.md", "2024-01-02 first.md"]
        );
    }

    #[test]
    fn test_twelve_hour_names_keep_time_of_day() {
        let format = DateFormat::new("YYYY-MM-DD h:mm").unwrap();
        let entries = vec![file("2024-01-01 10:00.md"), file("2024-01-01 9:00.md")];

        let notes = order_entries(entries, &format);
        assert_eq!(notes.last().unwrap().name, "2024-01-01 10:00.md");
    }

    #[test]
    fn test_no_conforming_names() {
        let format = DateFormat::new(DEFAULT_DATE_FORMAT).unwrap();
        let notes = order_entries(vec![file("a.md"), file("b.md")], &format);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_note_bare_name() {
        let format = DateFormat::new("YYYY-MM-DD").unwrap();
        let notes = order_entries(vec![file("2024-01-01.md")], &format);
        assert_eq!(notes[0].bare_name(), "2024-01-01");
    }

    #[tokio::test]
    async fn test_latest_note_from_vault() {
        let vault = MemoryVault::new();
        vault.add_file("/notes/2024-01-01.md", "").unwrap();
        vault.add_file("/notes/2024-03-01.md", "").unwrap();
        vault.add_file("/notes/2024-02-01.md", "").unwrap();
        vault.add_folder("/notes/2025-01-01").unwrap();

        let format = DateFormat::new("YYYY-MM-DD").unwrap();
        let latest = latest_note(&vault, Path::new("/notes"), &format)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.name, "2024-03-01.md");
    }
}
