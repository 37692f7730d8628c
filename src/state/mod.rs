//! Persisted read-state: the JSON state document and its store.
//!
//! The document is a single JSON object with one `comics` key, mapping comic
//! key to progress/bookmark/favorite/metadata state. Loading merges the
//! document into a live [`Library`](crate::library::Library) without ever
//! failing startup: a malformed document degrades to "no prior state", and
//! entries whose directories vanished since the last run are skipped (they
//! drop out of the file on the next save). Saving overwrites the whole file;
//! a crash mid-write may corrupt it, which load tolerates by design.

/// Debounced background saving
pub mod debounce;

use crate::library::Library;
use crate::records::ComicRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Root of the persisted document: comic key -> state blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StateDocument {
    /// Per-comic persisted state.
    #[serde(default)]
    pub comics: BTreeMap<String, ComicEntry>,
}

/// Persisted state for one comic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ComicEntry {
    /// Weak reference to the last-read chapter key.
    pub last_read_chapter_key: Option<String>,
    /// Page offset within the last-read chapter.
    pub last_read_page: u32,
    /// Favorite flag.
    pub favorite: bool,
    /// Free-form user metadata.
    pub metadata: BTreeMap<String, String>,
    /// Per-chapter state, keyed like the live chapter map.
    pub chapters: BTreeMap<String, ChapterEntry>,
}

/// Persisted state for one chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterEntry {
    /// Read flag.
    pub read: bool,
    /// Bookmark flag.
    pub bookmarked: bool,
    /// Last open time, if ever opened.
    pub last_opened_at: Option<DateTime<Utc>>,
}

/// Serializes and restores library state at a host-provided file path.
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Location of the state document.
    path: PathBuf,
}

impl StateStore {
    /// Creates a store over an explicit file path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates a store at the platform default location
    /// (`<data-dir>/state.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory is unavailable.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(crate::utils::paths::state_file_path()?))
    }

    /// The file path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document and merges it into `library`.
    ///
    /// Never fails the caller: a missing file means no prior state, and a
    /// malformed file is logged and treated the same way.
    pub fn load(&self, library: &mut Library) {
        if !self.path.exists() {
            return;
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "cannot read state file, starting fresh");
                return;
            }
        };

        let document: StateDocument = match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "malformed state file, starting fresh");
                return;
            }
        };

        merge_document(document, library);
    }

    /// Writes the full current in-memory state. Whole-file overwrite, no
    /// incremental diffing.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails; loss of read
    /// progress is user-visible, so failures are reported, not swallowed.
    pub fn save(&self, library: &Library) -> Result<()> {
        write_document(&self.path, &snapshot(library))
    }
}

/// Captures the library's persistable state as a document.
#[must_use]
pub fn snapshot(library: &Library) -> StateDocument {
    let mut document = StateDocument::default();
    for (key, comic) in library.all_comics() {
        document.comics.insert(key.to_string(), comic_entry(comic));
    }
    document
}

/// Converts one live record into its persisted form.
fn comic_entry(comic: &ComicRecord) -> ComicEntry {
    ComicEntry {
        last_read_chapter_key: comic.last_read_chapter.clone(),
        last_read_page: comic.last_read_page,
        favorite: comic.favorite,
        metadata: comic
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        chapters: comic
            .chapters
            .iter()
            .map(|(key, chapter)| {
                (
                    key.clone(),
                    ChapterEntry {
                        read: chapter.read,
                        bookmarked: chapter.bookmarked,
                        last_opened_at: chapter.last_opened,
                    },
                )
            })
            .collect(),
    }
}

/// Merge rule: every documented comic is resolved/registered through the
/// library (which may hit disk and legitimately find nothing — those entries
/// are skipped). Documented fields overwrite scan defaults; chapters no
/// longer present on disk are ignored; chapters absent from the document
/// keep their scan-derived zero state.
fn merge_document(document: StateDocument, library: &mut Library) {
    for (key, entry) in document.comics {
        if library.get_comic(&key).is_none() {
            continue;
        }
        let Some(comic) = library.comic_mut(&key) else {
            continue;
        };

        comic.last_read_chapter = entry.last_read_chapter_key;
        comic.last_read_page = entry.last_read_page;
        comic.favorite = entry.favorite;
        comic.metadata = entry.metadata.into_iter().collect();

        for (chapter_key, chapter_entry) in entry.chapters {
            if let Some(chapter) = comic.chapters.get_mut(&chapter_key) {
                chapter.read = chapter_entry.read;
                chapter.bookmarked = chapter_entry.bookmarked;
                chapter.last_opened = chapter_entry.last_opened_at;
            }
        }
    }
}

/// Writes a document as pretty-printed JSON, creating parent directories.
pub(crate) fn write_document(path: &Path, document: &StateDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document).context("Failed to serialize state")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write state file: {}", path.display()))?;
    info!(path = %path.display(), "application state saved");
    Ok(())
}
