//! Page-source seam between the core and external decoders.
//!
//! Every readable unit serves pages through one capability: list ordered
//! page identifiers, fetch raw bytes for one identifier. Variants are a
//! closed tagged union ([`UnitKind`] plus the path in [`UnitHandle`]), not an
//! inheritance hierarchy; the core never needs to know which variant it
//! holds, only the capability. The crate ships the folder variant
//! ([`FolderPageSource`]) — loose image directories need no codec. Archive
//! and document decoding (zip, PDF, EPUB) is an external collaborator that
//! implements [`PageSource`] for the remaining kinds.

use crate::classifier::{IMAGE_EXTS, has_extension, is_hidden_name, is_unit_folder};
use crate::utils::natsort::natural_cmp;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Fixed set of readable-unit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// A directory of loose image files.
    ImageFolder,
    /// A `.cbz` zip archive.
    Zip,
    /// A `.pdf` document.
    Pdf,
    /// An `.epub` container.
    Epub,
}

impl UnitKind {
    /// Classifies a path into a unit kind, or `None` for non-units.
    #[must_use]
    pub fn classify(path: &Path, sensitivity: f64) -> Option<Self> {
        if path.is_file() {
            let ext = path.extension()?.to_string_lossy().to_lowercase();
            return match ext.as_str() {
                "cbz" => Some(Self::Zip),
                "pdf" => Some(Self::Pdf),
                "epub" => Some(Self::Epub),
                _ => None,
            };
        }
        is_unit_folder(path, sensitivity).then_some(Self::ImageFolder)
    }
}

/// A classified unit: kind tag plus its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHandle {
    /// Which decoder family serves this unit.
    pub kind: UnitKind,
    /// Absolute location of the unit.
    pub path: PathBuf,
}

impl UnitHandle {
    /// Opens a handle for `path`, or `None` if it is not a readable unit.
    #[must_use]
    pub fn open(path: &Path, sensitivity: f64) -> Option<Self> {
        UnitKind::classify(path, sensitivity).map(|kind| Self {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Opaque page identifier within one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(pub String);

/// The capability every unit variant serves.
pub trait PageSource {
    /// Ordered page identifiers for a unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit kind is unsupported by this source or
    /// the unit cannot be read.
    fn list_pages(&self, unit: &UnitHandle) -> Result<Vec<PageId>>;

    /// Raw image bytes for one page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist or cannot be read.
    fn page_bytes(&self, unit: &UnitHandle, page: &PageId) -> Result<Vec<u8>>;

    /// Whether the unit has at least one page. Used when validating
    /// single-file comics; failures count as "no pages".
    fn has_pages(&self, unit: &UnitHandle) -> bool {
        self.list_pages(unit).map(|p| !p.is_empty()).unwrap_or(false)
    }
}

/// Built-in page source for [`UnitKind::ImageFolder`] units.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderPageSource;

impl PageSource for FolderPageSource {
    fn list_pages(&self, unit: &UnitHandle) -> Result<Vec<PageId>> {
        if unit.kind != UnitKind::ImageFolder {
            bail!("folder page source cannot serve {:?} units", unit.kind);
        }

        let entries = std::fs::read_dir(&unit.path)
            .with_context(|| format!("Failed to list pages in {}", unit.path.display()))?;

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                !is_hidden_name(&name) && has_extension(&e.path(), IMAGE_EXTS)
            })
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort_by(|a, b| natural_cmp(a, b));

        Ok(names.into_iter().map(PageId).collect())
    }

    fn page_bytes(&self, unit: &UnitHandle, page: &PageId) -> Result<Vec<u8>> {
        let path = unit.path.join(&page.0);
        std::fs::read(&path).with_context(|| format!("Failed to read page: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SENSITIVITY: f64 = 0.8;

    #[test]
    fn classify_dispatches_on_extension_and_shape() {
        let temp = TempDir::new().unwrap();
        let zip = temp.path().join("a.cbz");
        let pdf = temp.path().join("b.PDF");
        let epub = temp.path().join("c.epub");
        let txt = temp.path().join("d.txt");
        for f in [&zip, &pdf, &epub, &txt] {
            fs::write(f, b"x").unwrap();
        }

        assert_eq!(UnitKind::classify(&zip, SENSITIVITY), Some(UnitKind::Zip));
        assert_eq!(UnitKind::classify(&pdf, SENSITIVITY), Some(UnitKind::Pdf));
        assert_eq!(UnitKind::classify(&epub, SENSITIVITY), Some(UnitKind::Epub));
        assert_eq!(UnitKind::classify(&txt, SENSITIVITY), None);

        let folder = temp.path().join("pages");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("1.jpg"), b"img").unwrap();
        assert_eq!(
            UnitKind::classify(&folder, SENSITIVITY),
            Some(UnitKind::ImageFolder)
        );
    }

    #[test]
    fn folder_pages_are_naturally_ordered_images() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("ch");
        fs::create_dir(&folder).unwrap();
        for name in ["10.jpg", "2.jpg", "1.jpg", "notes.txt", ".hidden.jpg"] {
            fs::write(folder.join(name), b"x").unwrap();
        }

        let unit = UnitHandle::open(&folder, 0.5).unwrap();
        let pages = FolderPageSource.list_pages(&unit).unwrap();
        let names: Vec<&str> = pages.iter().map(|p| p.0.as_str()).collect();
        assert_eq!(names, vec!["1.jpg", "2.jpg", "10.jpg"]);
    }

    #[test]
    fn page_bytes_round_trip() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("ch");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("1.jpg"), b"image-bytes").unwrap();

        let unit = UnitHandle::open(&folder, SENSITIVITY).unwrap();
        let pages = FolderPageSource.list_pages(&unit).unwrap();
        let bytes = FolderPageSource.page_bytes(&unit, &pages[0]).unwrap();
        assert_eq!(bytes, b"image-bytes");
        assert!(FolderPageSource.has_pages(&unit));
    }

    #[test]
    fn folder_source_rejects_archive_units() {
        let temp = TempDir::new().unwrap();
        let zip = temp.path().join("a.cbz");
        fs::write(&zip, b"zip").unwrap();

        let unit = UnitHandle::open(&zip, SENSITIVITY).unwrap();
        assert!(FolderPageSource.list_pages(&unit).is_err());
        assert!(!FolderPageSource.has_pages(&unit));
    }
}
