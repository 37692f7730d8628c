//! Application data directory and derived file locations.
//!
//! The persisted state document and the preview cache live in the
//! platform-specific application data directory (`XDG_DATA_HOME` on Linux,
//! `AppData/Roaming` on Windows), under an app-named subdirectory.

use crate::{APP_DIR_NAME, PREVIEW_CACHE_DIR, STATE_FILE_NAME};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Returns the application data directory, creating it if necessary.
///
/// # Errors
///
/// Returns an error if the platform data directory cannot be determined or
/// the application subdirectory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine platform data directory")?;
    let app_dir = base.join(APP_DIR_NAME);
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create data directory: {}", app_dir.display()))?;
    Ok(app_dir)
}

/// Returns the absolute path of the persisted state document.
///
/// # Errors
///
/// Returns an error if the data directory is unavailable.
pub fn state_file_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(STATE_FILE_NAME))
}

/// Derives the cache location for a comic's preview image.
///
/// The file name is the xxh3 hash of the canonicalized comic path, which
/// stays stable across runs and avoids long or special-character file names.
/// The cache directory is not created here; thumbnail generation is the
/// caller's concern.
///
/// # Errors
///
/// Returns an error if the data directory is unavailable.
pub fn preview_cache_path(comic_path: &Path) -> Result<PathBuf> {
    let canonical = comic_path
        .canonicalize()
        .unwrap_or_else(|_| comic_path.to_path_buf());
    let hash = xxh3_64(canonical.to_string_lossy().as_bytes());
    Ok(data_dir()?
        .join(PREVIEW_CACHE_DIR)
        .join(format!("{hash:016x}.jpg")))
}
