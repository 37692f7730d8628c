#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)] // Simple counters and ratio math cannot overflow
#![allow(clippy::float_arithmetic)] // Required for the classifier's purity ratio

//! # Tankobon - Comic Library Indexer
//!
//! Tankobon indexes an arbitrary directory tree of mixed documents, images,
//! and archives, classifying each subdirectory as a navigable folder, a
//! comic (a work with one or more readable chapters), or both at once. It
//! tracks per-comic and per-chapter read/bookmark/favorite/metadata state
//! that survives re-scans and reconciles with what is actually on disk.
//!
//! ## Features
//!
//! - **Threshold-Driven Classification**: A directory is a chapter when its
//!   visible files are "pure enough" images; the sensitivity is tunable at
//!   runtime
//! - **Whole-Library Indexing**: Full-tree pre-scan, parallel per root with
//!   Rayon, so library-wide search never waits on lazy navigation
//! - **Stable Keys**: Root-relative, slash-normalized identities survive OS
//!   path-separator differences and multi-root setups
//! - **Revalidated Access**: Every comic lookup re-checks disk, so stale
//!   chapter lists are never served
//! - **Tolerant Persistence**: JSON state merges against the live index and
//!   a corrupt document degrades to a fresh start, never a crash
//!
//! ## Architecture
//!
//! - [`classifier`]: readable-unit and directory-content classification
//! - [`scanner`]: shallow child bucketing and parallel full-tree indexing
//! - [`keys`]: root-relative key derivation and resolution
//! - [`library`]: the live index and all user-facing mutations
//! - [`records`]: comic and chapter data model
//! - [`state`]: persisted JSON document, tolerant load/save, debounced saver
//! - [`pages`]: page-source capability seam for external decoders
//! - [`config`]: host-owned settings
//! - [`utils`]: natural ordering and data-directory paths
//!
//! ## Example Usage
//!
//! ```no_run
//! use tankobon::LibraryContext;
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = LibraryContext::new(vec![PathBuf::from("/data/comics")])?;
//! let mut library = ctx.open();
//!
//! let (folders, comics) = library.list_directory("");
//! if let Some(comic) = library.get_comic("One Piece") {
//!     println!("{} chapters", comic.chapters.len());
//! }
//! library.mark_read("One Piece", "Chapter 1");
//! ctx.state_store().save(&library)?;
//! # Ok(())
//! # }
//! ```

/// Heuristic readable-unit and directory classification.
pub mod classifier;

/// Host-owned library settings.
pub mod config;

/// Root-relative key derivation and resolution.
pub mod keys;

/// The in-memory library index and its mutations.
pub mod library;

/// Page-source capability seam for external decoders.
pub mod pages;

/// Comic and chapter records.
pub mod records;

/// Directory scanning and full-tree indexing.
pub mod scanner;

/// Persisted state document, store, and debounced saver.
pub mod state;

/// Utility functions and helpers.
pub mod utils;

use anyhow::Result;
use std::path::PathBuf;

pub use config::Settings;
pub use library::Library;
pub use records::{ChapterRecord, ComicRecord};
pub use state::StateStore;

/// Current version of the tankobon crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix marking directory entries as hidden.
pub const HIDDEN_PREFIX: char = '.';

/// Application subdirectory under the platform data directory.
pub const APP_DIR_NAME: &str = "tankobon";

/// File name of the persisted state document.
pub const STATE_FILE_NAME: &str = "state.json";

/// Directory name for cached preview images.
pub const PREVIEW_CACHE_DIR: &str = "previews";

/// Host-facing handle bundling roots, settings, and the state location.
///
/// A context is built once per chosen root set; changing roots means
/// building a new context and opening a new [`Library`].
#[derive(Debug, Clone)]
pub struct LibraryContext {
    /// Ordered library roots.
    pub roots: Vec<PathBuf>,

    /// Host-owned settings handed to the library on open.
    pub settings: Settings,

    /// Location of the persisted state document.
    pub state_path: PathBuf,
}

impl LibraryContext {
    /// Creates a context with default settings and the platform-default
    /// state location.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined
    /// or created.
    pub fn new(roots: Vec<PathBuf>) -> Result<Self> {
        Ok(Self {
            roots,
            settings: Settings::default(),
            state_path: utils::paths::state_file_path()?,
        })
    }

    /// Creates a context with explicit settings and state path, mainly for
    /// testing and embedded hosts.
    #[must_use]
    pub fn new_explicit(roots: Vec<PathBuf>, settings: Settings, state_path: PathBuf) -> Self {
        Self {
            roots,
            settings,
            state_path,
        }
    }

    /// Builds the library index and merges persisted state into it.
    #[must_use]
    pub fn open(&self) -> Library {
        let mut library = Library::new(self.roots.clone(), self.settings.clone());
        self.state_store().load(&mut library);
        library
    }

    /// A state store over this context's state path.
    #[must_use]
    pub fn state_store(&self) -> StateStore {
        StateStore::new(self.state_path.clone())
    }

    /// A debounced saver over this context's state path.
    #[must_use]
    pub fn debounced_saver(&self) -> state::debounce::DebouncedSaver {
        state::debounce::DebouncedSaver::with_default_window(self.state_path.clone())
    }
}
