//! Directory scanning: one-level child bucketing and whole-tree indexing.
//!
//! [`scan_children`] powers interactive navigation (one directory at a
//! time); [`build_full_index`] pre-scans every root so whole-library search
//! never has to touch the filesystem lazily. Roots are disjoint namespaces,
//! so the full scan parallelizes per root; registration goes through a
//! concurrent insert-if-absent map where the first writer for a key wins.

use crate::classifier::{analyze_directory, is_hidden_name};
use crate::keys::KeySpace;
use crate::records::ComicRecord;
use crate::utils::natsort::natural_cmp;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Shallow scan of one directory level.
///
/// Each visible child directory is analyzed with the classifier: a child
/// that yields chapters is listed as a comic, a child that yields navigable
/// sub-folders is listed as a folder. A mixed child legitimately appears in
/// both lists. Results come back in natural name order.
#[must_use]
pub fn scan_children(path: &Path, sensitivity: f64) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut folders = Vec::new();
    let mut comics = Vec::new();

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot scan directory");
            return (folders, comics);
        }
    };

    for entry in entries.filter_map(Result::ok) {
        if is_hidden_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let child = entry.path();
        if !child.is_dir() {
            continue;
        }

        let analysis = analyze_directory(&child, sensitivity);
        if !analysis.chapters.is_empty() {
            comics.push(child.clone());
        }
        if !analysis.sub_folders.is_empty() {
            folders.push(child);
        }
    }

    sort_by_name(&mut folders);
    sort_by_name(&mut comics);
    (folders, comics)
}

/// Recursively indexes every directory under every root and returns the
/// complete comic map, keyed through `key_space`.
///
/// Unreadable subtrees are skipped with a warning; the scan never aborts on
/// a single failure. Traversal order is unspecified and roots are visited
/// in parallel.
#[must_use]
pub fn build_full_index(key_space: &KeySpace, sensitivity: f64) -> HashMap<String, ComicRecord> {
    let registry: DashMap<String, ComicRecord> = DashMap::new();

    key_space.roots().par_iter().for_each(|root| {
        index_root(root, key_space, sensitivity, &registry);
    });

    registry.into_iter().collect()
}

/// Walks one root and registers every unit-holding directory.
fn index_root(
    root: &Path,
    key_space: &KeySpace,
    sensitivity: f64,
    registry: &DashMap<String, ComicRecord>,
) {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        // The root itself may carry a dotted name; only prune below it.
        .filter_entry(|e| e.depth() == 0 || !is_hidden_name(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable subtree");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let analysis = analyze_directory(entry.path(), sensitivity);
        if analysis.chapters.is_empty() {
            continue;
        }

        let Some(key) = key_space.key_for(entry.path()) else {
            continue;
        };
        // First registration wins; a concurrent duplicate discards its result.
        registry
            .entry(key)
            .or_insert_with(|| {
                debug!(path = %entry.path().display(), "indexed comic");
                ComicRecord::from_chapters(entry.path().to_path_buf(), analysis.chapters)
            });
    }
}

/// Natural name order for listing output.
fn sort_by_name(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| {
        natural_cmp(
            &a.file_name().unwrap_or_default().to_string_lossy(),
            &b.file_name().unwrap_or_default().to_string_lossy(),
        )
    });
}
