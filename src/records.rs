//! In-memory records for comics and their chapters.
//!
//! Records are owned by the [`Library`](crate::library::Library) and carry
//! both what the scanner found on disk and the user-visible state (read
//! marks, bookmarks, favorites, metadata) that the state store persists.

use crate::config::ChapterSort;
use crate::utils::natsort::natural_key;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// One readable unit: an image folder or a single archive/document file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    /// Absolute location of the unit (file or directory).
    pub path: PathBuf,
    /// Whether the chapter has been read.
    pub read: bool,
    /// Whether the chapter is bookmarked.
    pub bookmarked: bool,
    /// When the chapter was last opened, if ever.
    pub last_opened: Option<DateTime<Utc>>,
}

impl ChapterRecord {
    /// Creates a fresh zero-state record for a unit at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            read: false,
            bookmarked: false,
            last_opened: None,
        }
    }

    /// Directory name, or file name without extension for file units.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = if self.path.is_dir() {
            self.path.file_name()
        } else {
            self.path.file_stem()
        };
        name.map_or_else(
            || self.path.to_string_lossy().into_owned(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    /// Marks the chapter read and stamps the open time.
    pub fn mark_read(&mut self) {
        self.read = true;
        self.last_opened = Some(Utc::now());
    }

    /// Flips the bookmark flag.
    pub fn toggle_bookmark(&mut self) {
        self.bookmarked = !self.bookmarked;
    }
}

/// One classified work: a directory (or lone readable file) with at least
/// one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicRecord {
    /// Absolute path of the comic directory, or of the readable file itself
    /// for a single-file comic.
    pub path: PathBuf,
    /// Chapters keyed by the child's file name. Keys are unique per comic.
    pub chapters: HashMap<String, ChapterRecord>,
    /// Weak reference into `chapters`; revalidate against the current key
    /// set before use.
    pub last_read_chapter: Option<String>,
    /// Page offset within the last-read chapter.
    pub last_read_page: u32,
    /// Whether the comic is a favorite.
    pub favorite: bool,
    /// Free-form user-edited metadata, opaque to the classifier.
    pub metadata: HashMap<String, String>,
}

impl ComicRecord {
    /// Creates an empty record for the comic at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            chapters: HashMap::new(),
            last_read_chapter: None,
            last_read_page: 0,
            favorite: false,
            metadata: HashMap::new(),
        }
    }

    /// Builds a record from freshly-scanned chapter paths, keyed by file name.
    #[must_use]
    pub(crate) fn from_chapters(path: PathBuf, chapter_paths: Vec<PathBuf>) -> Self {
        let mut record = Self::new(path);
        record.replace_chapters(chapter_paths);
        record
    }

    /// Swaps in a new chapter set, discarding all per-chapter state.
    pub(crate) fn replace_chapters(&mut self, chapter_paths: Vec<PathBuf>) {
        self.chapters.clear();
        for chapter_path in chapter_paths {
            if let Some(name) = chapter_path.file_name() {
                let key = name.to_string_lossy().into_owned();
                self.chapters.insert(key, ChapterRecord::new(chapter_path));
            }
        }
    }

    /// The comic's directory (or file) name.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.to_string_lossy().into_owned(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    /// The last-read chapter, if the weak key still names a live chapter.
    #[must_use]
    pub fn last_read_chapter(&self) -> Option<&ChapterRecord> {
        self.last_read_chapter
            .as_deref()
            .and_then(|key| self.chapters.get(key))
    }

    /// Chapters ordered by the requested criterion.
    ///
    /// `Name` uses natural ordering over display names, so "Ch 9" sorts
    /// before "Ch 10". `Date` uses filesystem modification time; entries
    /// whose metadata cannot be read sort first. The sort is stable; ties
    /// keep their original relative order. `reverse` mirrors the final
    /// ordering.
    #[must_use]
    pub fn sorted_chapters(&self, by: ChapterSort, reverse: bool) -> Vec<&ChapterRecord> {
        let mut chapters: Vec<&ChapterRecord> = self.chapters.values().collect();
        // HashMap iteration order is arbitrary; pin a base order first so
        // the stable sort's tie-break is deterministic.
        chapters.sort_by_key(|ch| ch.path.clone());

        match by {
            ChapterSort::Name => {
                chapters.sort_by_cached_key(|ch| natural_key(&ch.display_name()));
            }
            ChapterSort::Date => {
                chapters.sort_by_cached_key(|ch| {
                    std::fs::metadata(&ch.path)
                        .and_then(|m| m.modified())
                        .unwrap_or(UNIX_EPOCH)
                });
            }
        }

        if reverse {
            chapters.reverse();
        }
        chapters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn chapter_display_name_strips_file_extension() {
        let file = ChapterRecord::new(PathBuf::from("/lib/comic/Ch 1.cbz"));
        assert_eq!(file.display_name(), "Ch 1");
    }

    #[test]
    fn chapter_display_name_keeps_directory_name() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Ch 1");
        fs::create_dir(&dir).unwrap();
        let chapter = ChapterRecord::new(dir);
        assert_eq!(chapter.display_name(), "Ch 1");
    }

    #[test]
    fn mark_read_stamps_open_time() {
        let mut chapter = ChapterRecord::new(PathBuf::from("/x/ch1"));
        assert!(chapter.last_opened.is_none());
        chapter.mark_read();
        assert!(chapter.read);
        assert!(chapter.last_opened.is_some());
    }

    #[test]
    fn toggle_bookmark_flips() {
        let mut chapter = ChapterRecord::new(PathBuf::from("/x/ch1"));
        chapter.toggle_bookmark();
        assert!(chapter.bookmarked);
        chapter.toggle_bookmark();
        assert!(!chapter.bookmarked);
    }

    #[test]
    fn last_read_chapter_is_revalidated() {
        let mut comic = ComicRecord::from_chapters(
            PathBuf::from("/lib/comic"),
            vec![PathBuf::from("/lib/comic/ch1")],
        );
        comic.last_read_chapter = Some("ch1".to_string());
        assert!(comic.last_read_chapter().is_some());

        comic.last_read_chapter = Some("gone".to_string());
        assert!(comic.last_read_chapter().is_none());
    }

    #[test]
    fn sorted_by_name_is_natural() {
        let comic = ComicRecord::from_chapters(
            PathBuf::from("/lib/comic"),
            vec![
                PathBuf::from("/lib/comic/Ch10.cbz"),
                PathBuf::from("/lib/comic/Ch1.cbz"),
                PathBuf::from("/lib/comic/Ch2.cbz"),
            ],
        );

        let names: Vec<String> = comic
            .sorted_chapters(ChapterSort::Name, false)
            .iter()
            .map(|ch| ch.display_name())
            .collect();
        assert_eq!(names, vec!["Ch1", "Ch2", "Ch10"]);

        let reversed: Vec<String> = comic
            .sorted_chapters(ChapterSort::Name, true)
            .iter()
            .map(|ch| ch.display_name())
            .collect();
        assert_eq!(reversed, vec!["Ch10", "Ch2", "Ch1"]);
    }

    #[test]
    fn sorted_by_date_uses_mtime() {
        let temp = TempDir::new().unwrap();
        let older = temp.path().join("b_old.cbz");
        let newer = temp.path().join("a_new.cbz");
        fs::write(&older, b"x").unwrap();
        fs::write(&newer, b"x").unwrap();

        filetime::set_file_mtime(&older, filetime::FileTime::from_unix_time(1_000, 0)).unwrap();
        filetime::set_file_mtime(&newer, filetime::FileTime::from_unix_time(2_000, 0)).unwrap();

        let comic =
            ComicRecord::from_chapters(temp.path().to_path_buf(), vec![older.clone(), newer]);
        let ordered: Vec<PathBuf> = comic
            .sorted_chapters(ChapterSort::Date, false)
            .iter()
            .map(|ch| ch.path.clone())
            .collect();
        assert_eq!(ordered[0], older);
    }
}
