//! Library settings.
//!
//! Settings are an explicit struct owned by the host and handed to the
//! [`Library`](crate::library::Library) constructor; there is no ambient
//! global. The struct is serde-ready so a host may persist it alongside its
//! own configuration, but nothing in this crate reads or writes it to disk.

use serde::{Deserialize, Serialize};

/// Default classifier sensitivity: at least 80% of a chapter folder's
/// visible files must be images.
pub const DEFAULT_SENSITIVITY: f64 = 0.8;

/// Lower clamp for sensitivity.
pub const MIN_SENSITIVITY: f64 = 0.1;

/// Upper clamp for sensitivity.
pub const MAX_SENSITIVITY: f64 = 1.0;

/// Host-owned library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Classifier impurity tolerance in `[0.1, 1.0]`.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,

    /// Preferred chapter ordering.
    #[serde(default)]
    pub chapter_sort: ChapterSort,

    /// Whether chapter ordering is reversed.
    #[serde(default)]
    pub sort_reversed: bool,
}

/// Chapter sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChapterSort {
    /// Natural ordering over display names ("Ch 9" before "Ch 10").
    #[default]
    Name,
    /// Filesystem modification time.
    Date,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            chapter_sort: ChapterSort::default(),
            sort_reversed: false,
        }
    }
}

impl Settings {
    /// Clamps a requested sensitivity into the supported range.
    #[must_use]
    pub fn clamp_sensitivity(value: f64) -> f64 {
        value.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
    }

    /// Sets the sensitivity, clamping into `[0.1, 1.0]`.
    pub fn set_sensitivity(&mut self, value: f64) {
        self.sensitivity = Self::clamp_sensitivity(value);
    }
}

/// Serde default for [`Settings::sensitivity`].
fn default_sensitivity() -> f64 {
    DEFAULT_SENSITIVITY
}
