//! Classification of persisted photo paths.
//!
//! Records written by older layouts store paths relative to the upload directory
//! (`<id>.jpg`) or as absolute paths; the current layout stores them relative to the
//! upload directory's parent (`uploads/<id>.jpg`). Every stored path falls in exactly
//! one of these forms and each form resolves one way.

use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredPath<'a> {
    /// `<root-name>/<file>`, relative to the root's parent.
    Canonical(&'a Path),
    /// Relative to the root itself (legacy layout).
    LegacyBare(&'a Path),
    Absolute(&'a Path),
}

impl<'a> StoredPath<'a> {
    /// Classifies `stored` against an upload root whose last component is `root_name`.
    pub fn classify(stored: &'a str, root_name: &str) -> Self {
        let path = Path::new(stored);
        if path.is_absolute() {
            return StoredPath::Absolute(path);
        }
        match path.components().next() {
            Some(Component::Normal(first)) if first == root_name => StoredPath::Canonical(path),
            _ => StoredPath::LegacyBare(path),
        }
    }

    /// Maps the stored path to a filesystem location for the given upload root.
    pub fn resolve(self, root: &Path) -> PathBuf {
        match self {
            StoredPath::Absolute(path) => path.to_path_buf(),
            StoredPath::Canonical(path) => root.parent().unwrap_or(root).join(path),
            StoredPath::LegacyBare(path) => root.join(path),
        }
    }
}

/// Joins path components with `/` regardless of platform.
pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
