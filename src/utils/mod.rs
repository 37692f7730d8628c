//! Utility functions and helpers.
//!
//! - [`natsort`]: natural ("human") ordering for chapter and folder names
//! - [`paths`]: platform data directory, state-file and preview-cache paths

/// Natural ordering keys for file and directory names
pub mod natsort;
/// Application data directory and derived file locations
pub mod paths;

pub use natsort::{NaturalKey, natural_cmp, natural_key};
