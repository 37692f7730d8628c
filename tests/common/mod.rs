use anyhow::Result;
use std::path::{Path, PathBuf};
use tankobon::{LibraryContext, Settings};
use tempfile::TempDir;

/// Test library fixture: a temp root plus a context wired to a state file
/// inside the same temp dir.
pub struct TestLibrary {
    pub temp_dir: TempDir,
    pub ctx: LibraryContext,
}

impl TestLibrary {
    /// Create an empty test library with one root.
    pub fn new() -> Result<Self> {
        init_tracing();
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("library");
        std::fs::create_dir(&root)?;
        let state_path = temp_dir.path().join("state.json");

        let ctx = LibraryContext::new_explicit(vec![root], Settings::default(), state_path);
        Ok(Self { temp_dir, ctx })
    }

    /// The library root directory.
    pub fn root(&self) -> PathBuf {
        self.ctx.roots[0].clone()
    }

    /// Create a chapter folder with `pages` image files under `comic`.
    pub fn add_image_chapter(&self, comic: &str, chapter: &str, pages: usize) -> PathBuf {
        let dir = self.root().join(comic).join(chapter);
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..pages {
            std::fs::write(dir.join(format!("{i:03}.jpg")), b"img").unwrap();
        }
        dir
    }

    /// Create a single archive-file chapter under `comic`.
    pub fn add_archive_chapter(&self, comic: &str, file_name: &str) -> PathBuf {
        let dir = self.root().join(comic);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join(file_name);
        std::fs::write(&file, b"archive").unwrap();
        file
    }

    /// Write a junk (non-image) file into an existing chapter folder.
    pub fn add_junk(&self, chapter_dir: &Path, name: &str) {
        std::fs::write(chapter_dir.join(name), b"junk").unwrap();
    }
}

impl Default for TestLibrary {
    fn default() -> Self {
        Self::new().expect("Failed to create test library")
    }
}

/// Install a test subscriber once so scan warnings surface under
/// `RUST_LOG` during test runs.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
