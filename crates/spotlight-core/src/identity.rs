//! Canonical identity for file system entries.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Folder key used for files that live directly under the workspace root.
pub const ROOT_FOLDER_KEY: &str = ".";

/// Identity of a spotlighted file.
///
/// Wraps an absolute, lexically normalized path. Two identities are equal
/// iff their normalized paths are equal, so `a/./b.rs` and `a/c/../b.rs`
/// collapse onto the same member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileIdentity(PathBuf);

impl FileIdentity {
    /// Create an identity from a path, normalizing `.` and `..` components.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize(path.as_ref()))
    }

    /// Create an identity for `path`, resolving relative paths against `root`.
    pub fn resolve(root: &Path, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.is_absolute() {
            Self::new(path)
        } else {
            Self::new(root.join(path))
        }
    }

    /// Get the underlying path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consume the identity and return the path.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Base name of the entry (the last path component).
    pub fn file_name(&self) -> CompactString {
        self.0
            .file_name()
            .map(|n| CompactString::new(n.to_string_lossy()))
            .unwrap_or_else(|| CompactString::new(self.0.to_string_lossy()))
    }

    /// Direct parent directory, if any.
    pub fn parent(&self) -> Option<&Path> {
        self.0.parent()
    }

    /// Join a child name onto this identity.
    pub fn join(&self, name: impl AsRef<Path>) -> Self {
        Self::new(self.0.join(name))
    }

    /// Key of the folder this file is grouped under.
    ///
    /// The key is the parent directory relative to `root`, `/`-separated.
    /// Files directly under `root` map to [`ROOT_FOLDER_KEY`]; files outside
    /// `root` keep their absolute parent path.
    pub fn folder_key(&self, root: &Path) -> String {
        let Some(parent) = self.0.parent() else {
            return ROOT_FOLDER_KEY.to_string();
        };

        let root = normalize(root);
        match parent.strip_prefix(&root) {
            Ok(rel) if rel.as_os_str().is_empty() => ROOT_FOLDER_KEY.to_string(),
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => parent.to_string_lossy().into_owned(),
        }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for FileIdentity {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for FileIdentity {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for FileIdentity {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// Lexical normalization: drops `.`, folds `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` never climbs above the root or a prefix
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
