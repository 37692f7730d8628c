//! Heuristic classification of paths into readable units and navigable folders.
//!
//! A "readable unit" (chapter) is either a single document/archive file
//! (`.pdf`, `.cbz`, `.epub`) or a directory that is a pure-enough folder of
//! images. Purity is threshold-driven: at sensitivity 0.8 at least 80% of a
//! directory's visible files must be images, which absorbs stray junk files
//! (`thumbs.db`, `.nfo` droppings) without disqualifying a valid chapter.
//!
//! Classification reads directory entries but has no other side effects, and
//! never recurses: [`analyze_directory`] inspects exactly one level.

use crate::HIDDEN_PREFIX;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Image extensions counted toward a folder's purity ratio.
pub const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "avif"];

/// Extensions that make a single file a readable unit on its own.
pub const UNIT_EXTS: &[&str] = &["pdf", "cbz", "epub"];

/// A chapter folder must hold at least this many images.
pub const MIN_UNIT_IMAGES: usize = 1;

/// File name of preview-image sidecars, excluded from classification.
pub const PREVIEW_SIDECAR_NAME: &str = "preview.jpg";

/// Result of one shallow pass over a directory's children.
///
/// A child lands in `chapters` when it is a readable unit, in `sub_folders`
/// when it is a non-empty directory that is not a unit. Anything else (empty
/// directories, stray files) is dropped. Both can be non-empty at once: a
/// "mixed" directory holds loose chapters next to further sub-collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryAnalysis {
    /// Children that are readable units.
    pub chapters: Vec<PathBuf>,
    /// Children that are navigable, non-empty, non-unit directories.
    pub sub_folders: Vec<PathBuf>,
}

/// Returns `true` when `path` is a readable unit at the given sensitivity.
///
/// Files qualify purely by extension; directories by the pure-enough
/// image-folder rule of [`is_unit_folder`].
#[must_use]
pub fn is_readable_unit(path: &Path, sensitivity: f64) -> bool {
    if has_extension(path, UNIT_EXTS) && path.is_file() {
        return true;
    }
    is_unit_folder(path, sensitivity)
}

/// The pure-enough image-folder rule.
///
/// A directory is a unit when, over its visible children (hidden entries and
/// preview sidecars excluded):
///
/// - the visible set is non-empty (empty directories are never chapters),
/// - no visible child is a subdirectory or a unit-extension file (a chapter
///   cannot contain nested units or sub-navigation),
/// - it holds at least [`MIN_UNIT_IMAGES`] images, and
/// - `images / (images + other files) >= sensitivity`.
#[must_use]
pub fn is_unit_folder(path: &Path, sensitivity: f64) -> bool {
    if !path.is_dir() {
        return false;
    }

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot list directory, not a unit");
            return false;
        }
    };

    let mut image_count = 0usize;
    let mut other_count = 0usize;

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        if is_hidden_name(&name.to_string_lossy()) || name == PREVIEW_SIDECAR_NAME {
            continue;
        }

        let child = entry.path();
        // Nested units or sub-navigation disqualify the whole folder.
        if child.is_dir() || has_extension(&child, UNIT_EXTS) {
            return false;
        }

        if has_extension(&child, IMAGE_EXTS) {
            image_count += 1;
        } else {
            other_count += 1;
        }
    }

    let total = image_count + other_count;
    if image_count < MIN_UNIT_IMAGES || total == 0 {
        return false;
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = image_count as f64 / total as f64;
    ratio >= sensitivity
}

/// Buckets a directory's immediate children into chapters and navigable
/// sub-folders. One shallow listing pass, no recursion.
///
/// Unreadable directories yield an empty analysis with a recorded warning;
/// classification is best-effort and never aborts a scan.
#[must_use]
pub fn analyze_directory(path: &Path, sensitivity: f64) -> DirectoryAnalysis {
    let mut analysis = DirectoryAnalysis::default();

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot analyze directory, skipping");
            return analysis;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        if is_hidden_name(&name.to_string_lossy()) || name == PREVIEW_SIDECAR_NAME {
            continue;
        }

        let child = entry.path();
        if is_readable_unit(&child, sensitivity) {
            analysis.chapters.push(child);
        } else if child.is_dir() && !is_effectively_empty(&child) {
            analysis.sub_folders.push(child);
        }
        // Empty directories and stray files are dropped silently.
    }

    analysis
}

/// Returns `true` when a directory has no visible children.
///
/// Directories that cannot be listed count as empty (non-navigable).
fn is_effectively_empty(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => !entries.any(|e| {
            e.is_ok_and(|e| {
                let name = e.file_name();
                !is_hidden_name(&name.to_string_lossy()) && name != PREVIEW_SIDECAR_NAME
            })
        }),
        Err(_) => true,
    }
}

/// Hidden-entry check on the file name.
pub(crate) fn is_hidden_name(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX)
}

/// Case-insensitive extension membership test.
pub(crate) fn has_extension(path: &Path, set: &[&str]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| set.contains(&ext.as_str()))
}
