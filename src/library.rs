//! The in-memory library index.
//!
//! [`Library`] owns the comic map for one session. Construction pre-scans
//! every root so whole-library listings are instant; individual comics are
//! still revalidated against disk on every access ([`Library::get_comic`]),
//! which trades scan cost for never serving a stale chapter list.
//!
//! All mutators are no-ops when a key no longer resolves; the UI may race a
//! rescan, and a vanished key is a recoverable condition, not an error.

use crate::classifier::{analyze_directory, is_readable_unit};
use crate::config::Settings;
use crate::keys::KeySpace;
use crate::records::{ChapterRecord, ComicRecord};
use crate::scanner;
use crate::utils::natsort::natural_cmp;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Process-wide comic index over an ordered set of library roots.
#[derive(Debug)]
pub struct Library {
    /// Key derivation/resolution over the configured roots.
    key_space: KeySpace,
    /// Live comic records keyed by root-relative key.
    comics: HashMap<String, ComicRecord>,
    /// Host-owned settings (sensitivity, sort preferences).
    settings: Settings,
}

impl Library {
    /// Builds the index for `roots`, pre-scanning the full tree.
    ///
    /// Changing roots means constructing a new `Library`; the index is never
    /// partially rebuilt.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, settings: Settings) -> Self {
        let key_space = KeySpace::new(roots);

        info!("building comic library index from filesystem");
        let started = Instant::now();
        let comics = scanner::build_full_index(&key_space, settings.sensitivity);
        info!(
            comics = comics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "library index built"
        );

        Self {
            key_space,
            comics,
            settings,
        }
    }

    /// The configured roots, in tie-break order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        self.key_space.roots()
    }

    /// The key space over this library's roots.
    #[must_use]
    pub fn key_space(&self) -> &KeySpace {
        &self.key_space
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sets the classifier sensitivity, clamped to `[0.1, 1.0]`.
    ///
    /// Already-cached comics are not re-scanned until their next access.
    pub fn set_sensitivity(&mut self, value: f64) {
        self.settings.set_sensitivity(value);
    }

    /// Whether `path` is a readable unit under the current sensitivity.
    #[must_use]
    pub fn is_unit(&self, path: &Path) -> bool {
        is_readable_unit(path, self.settings.sensitivity)
    }

    /// All indexed comics with their keys, in unspecified order.
    pub fn all_comics(&self) -> impl Iterator<Item = (&str, &ComicRecord)> {
        self.comics.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of indexed comics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.comics.len()
    }

    /// Whether the index holds no comics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comics.is_empty()
    }

    /// Non-revalidating peek at a cached record. Prefer [`Library::get_comic`]
    /// for anything user-facing.
    #[must_use]
    pub fn peek_comic(&self, key: &str) -> Option<&ComicRecord> {
        self.comics.get(key)
    }

    /// Lists folders and comics at `rel_key`.
    ///
    /// The empty key lists the union across all roots of each root's
    /// top-level scan, deduplicated and natural-name-ordered. A non-empty
    /// key resolves through the key space and shallow-scans the directory;
    /// an unresolvable key lists nothing.
    #[must_use]
    pub fn list_directory(&self, rel_key: &str) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let sensitivity = self.settings.sensitivity;

        if rel_key.is_empty() {
            let mut folder_set: HashSet<PathBuf> = HashSet::new();
            let mut comic_set: HashSet<PathBuf> = HashSet::new();
            for root in self.key_space.roots() {
                let (folders, comics) = scanner::scan_children(root, sensitivity);
                folder_set.extend(folders);
                comic_set.extend(comics);
            }
            let mut folders: Vec<PathBuf> = folder_set.into_iter().collect();
            let mut comics: Vec<PathBuf> = comic_set.into_iter().collect();
            sort_paths(&mut folders);
            sort_paths(&mut comics);
            return (folders, comics);
        }

        match self.key_space.path_for(rel_key) {
            Some(path) if path.is_dir() => scanner::scan_children(&path, sensitivity),
            _ => (Vec::new(), Vec::new()),
        }
    }

    /// Resolves a comic by key, revalidating cached records against disk.
    ///
    /// Cached records are re-analyzed on every call; if the chapter name set
    /// changed, the chapter map is replaced wholesale (removed entries lose
    /// their read/bookmark state, new entries start fresh — renames on disk
    /// lose state by design). A record left with zero chapters is evicted
    /// and `None` is returned. Uncached keys are resolved through the key
    /// space and registered lazily; a key pointing straight at a readable
    /// file becomes a one-chapter single-file comic.
    pub fn get_comic(&mut self, key: &str) -> Option<&ComicRecord> {
        if self.comics.contains_key(key) {
            self.revalidate(key);
            return self.comics.get(key);
        }

        let path = self.key_space.path_for(key)?;
        let record = self.scan_comic(path)?;
        self.comics.insert(key.to_string(), record);
        self.comics.get(key)
    }

    /// Marks a chapter read: sets `read`, stamps the open time, and points
    /// the comic's last-read reference at it with page offset 0.
    ///
    /// No-op if either key is absent.
    pub fn mark_read(&mut self, comic_key: &str, chapter_key: &str) {
        if let Some(comic) = self.comics.get_mut(comic_key)
            && let Some(chapter) = comic.chapters.get_mut(chapter_key)
        {
            chapter.mark_read();
            comic.last_read_chapter = Some(chapter_key.to_string());
            comic.last_read_page = 0;
        }
    }

    /// Flips a chapter's bookmark flag. No-op if either key is absent.
    pub fn toggle_bookmark(&mut self, comic_key: &str, chapter_key: &str) {
        if let Some(comic) = self.comics.get_mut(comic_key)
            && let Some(chapter) = comic.chapters.get_mut(chapter_key)
        {
            chapter.toggle_bookmark();
        }
    }

    /// Flips a comic's favorite flag. No-op if the key is absent.
    pub fn toggle_favorite(&mut self, comic_key: &str) {
        if let Some(comic) = self.comics.get_mut(comic_key) {
            comic.favorite = !comic.favorite;
        }
    }

    /// Clears read marks, open times, and the last-read reference for every
    /// chapter of a comic. Bookmarks survive. No-op if the key is absent.
    pub fn reset_progress(&mut self, comic_key: &str) {
        if let Some(comic) = self.comics.get_mut(comic_key) {
            for chapter in comic.chapters.values_mut() {
                chapter.read = false;
                chapter.last_opened = None;
            }
            comic.last_read_chapter = None;
            comic.last_read_page = 0;
        }
    }

    /// Replaces a comic's free-form metadata. No-op if the key is absent.
    pub fn update_metadata(&mut self, comic_key: &str, metadata: HashMap<String, String>) {
        if let Some(comic) = self.comics.get_mut(comic_key) {
            comic.metadata = metadata;
        }
    }

    /// Records the reading position within the last-read chapter.
    /// No-op if the key is absent.
    pub fn set_last_read_page(&mut self, comic_key: &str, page: u32) {
        if let Some(comic) = self.comics.get_mut(comic_key) {
            comic.last_read_page = page;
        }
    }

    /// Mutable access for the state store's load merge.
    pub(crate) fn comic_mut(&mut self, key: &str) -> Option<&mut ComicRecord> {
        self.comics.get_mut(key)
    }

    /// Re-runs classification for a cached record and evicts it if it no
    /// longer has chapters.
    fn revalidate(&mut self, key: &str) {
        let sensitivity = self.settings.sensitivity;
        let Some(comic) = self.comics.get_mut(key) else {
            return;
        };

        // A file-backed (single-file) record revalidates against the file
        // itself; re-analyzing its parent would swap in sibling chapters.
        let current: Vec<PathBuf> = if comic.path.is_file() {
            if is_readable_unit(&comic.path, sensitivity) {
                vec![comic.path.clone()]
            } else {
                Vec::new()
            }
        } else {
            analyze_directory(&comic.path, sensitivity).chapters
        };

        let current_names: HashSet<String> = current
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        let cached_names: HashSet<String> = comic.chapters.keys().cloned().collect();

        if current_names != cached_names {
            comic.replace_chapters(current);
        }

        if comic.chapters.is_empty() {
            self.comics.remove(key);
        }
    }

    /// Classifies a freshly-resolved path into a comic record, or `None`
    /// when it yields no chapters (zero-chapter registration must fail).
    fn scan_comic(&self, path: PathBuf) -> Option<ComicRecord> {
        let sensitivity = self.settings.sensitivity;
        let mut chapters = if path.is_dir() {
            analyze_directory(&path, sensitivity).chapters
        } else {
            Vec::new()
        };

        // A lone readable file (e.g. a key pointing straight at a .cbz)
        // becomes a synthetic one-chapter comic.
        if chapters.is_empty() && is_readable_unit(&path, sensitivity) {
            chapters = vec![path.clone()];
        }

        if chapters.is_empty() {
            return None;
        }
        Some(ComicRecord::from_chapters(path, chapters))
    }
}

/// Sorts paths by natural order of their final component.
fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| {
        natural_cmp(
            &a.file_name().unwrap_or_default().to_string_lossy(),
            &b.file_name().unwrap_or_default().to_string_lossy(),
        )
    });
}

/// Chapters of `comic` ordered per the library's interface contract.
///
/// Thin forwarding wrapper over [`ComicRecord::sorted_chapters`], kept as a
/// free function so controllers can sort without holding the library borrow.
#[must_use]
pub fn sorted_chapters<'a>(
    comic: &'a ComicRecord,
    by: crate::config::ChapterSort,
    reverse: bool,
) -> Vec<&'a ChapterRecord> {
    comic.sorted_chapters(by, reverse)
}
