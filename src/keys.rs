//! Stable root-relative identities for library paths.
//!
//! A key is the slash-joined, root-relative component list of a path, which
//! keeps persisted state portable across OS path-separator differences and
//! across machines where the library roots live at different absolute paths.
//!
//! Derivation and resolution are deliberately asymmetric: [`KeySpace::key_for`]
//! prefix-matches against the configured roots in order, while
//! [`KeySpace::path_for`] probes each root for existence. A key can therefore
//! resolve under a different root than the one it was derived from if a
//! root's tree was restructured between calls; callers must treat the result
//! as a best current guess.

use std::path::{Path, PathBuf};

/// Derives keys from paths and resolves keys back to paths over an ordered
/// set of library roots. Root order is the tie-break: the first matching
/// root wins in both directions.
#[derive(Debug, Clone)]
pub struct KeySpace {
    /// Ordered library roots. Disjoint namespaces in practice.
    roots: Vec<PathBuf>,
}

impl KeySpace {
    /// Creates a key space over the given roots, preserving their order.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// The configured roots, in tie-break order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Returns the key for `path`, or `None` if it lies outside every root.
    ///
    /// The root itself maps to the empty key.
    #[must_use]
    pub fn key_for(&self, path: &Path) -> Option<String> {
        for root in &self.roots {
            if let Ok(rel) = path.strip_prefix(root) {
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                return Some(key);
            }
        }
        None
    }

    /// Resolves a key to the first root under which it currently exists.
    #[must_use]
    pub fn path_for(&self, key: &str) -> Option<PathBuf> {
        for root in &self.roots {
            let candidate = if key.is_empty() {
                root.clone()
            } else {
                root.join(key)
            };
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn root_maps_to_empty_key() {
        let temp = TempDir::new().unwrap();
        let keys = KeySpace::new(vec![temp.path().to_path_buf()]);
        assert_eq!(keys.key_for(temp.path()), Some(String::new()));
    }

    #[test]
    fn outside_path_has_no_key() {
        let temp = TempDir::new().unwrap();
        let keys = KeySpace::new(vec![temp.path().to_path_buf()]);
        assert_eq!(keys.key_for(Path::new("/somewhere/else")), None);
    }

    #[test]
    fn keys_are_slash_joined_components() {
        let temp = TempDir::new().unwrap();
        let keys = KeySpace::new(vec![temp.path().to_path_buf()]);
        let nested = temp.path().join("series").join("vol 1");
        assert_eq!(keys.key_for(&nested), Some("series/vol 1".to_string()));
    }

    #[test]
    fn first_matching_root_wins_for_derivation() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().to_path_buf();
        let inner = outer.join("inner");
        fs::create_dir(&inner).unwrap();

        let keys = KeySpace::new(vec![outer, inner.clone()]);
        // "inner" is under the first root too, so that root claims it.
        assert_eq!(keys.key_for(&inner), Some("inner".to_string()));
    }

    #[test]
    fn resolution_probes_roots_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::create_dir(second.path().join("only-here")).unwrap();

        let keys = KeySpace::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(
            keys.path_for("only-here"),
            Some(second.path().join("only-here"))
        );
        assert_eq!(keys.path_for("nowhere"), None);
    }

    #[test]
    fn empty_key_resolves_to_first_root() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let keys = KeySpace::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(keys.path_for(""), Some(first.path().to_path_buf()));
    }

    #[test]
    fn derived_key_round_trips_while_tree_is_stable() {
        let temp = TempDir::new().unwrap();
        let comic = temp.path().join("series").join("comic");
        fs::create_dir_all(&comic).unwrap();

        let keys = KeySpace::new(vec![temp.path().to_path_buf()]);
        let key = keys.key_for(&comic).unwrap();
        assert_eq!(keys.path_for(&key), Some(comic));
    }
}
