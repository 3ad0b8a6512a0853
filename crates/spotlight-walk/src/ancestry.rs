//! Ancestor tracking for symlink cycle detection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Real paths of the directories from the walk root down to one directory.
///
/// A directory whose real path is already on its own chain was reached
/// through a symbolic link pointing back at an ancestor. Reaching the same
/// directory twice through unrelated routes is not a cycle; each route keeps
/// its own chain.
#[derive(Debug, Clone, Default)]
pub struct AncestorChain {
    dirs: Arc<[PathBuf]>,
}

impl AncestorChain {
    /// Create an empty chain for the walk root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `real_path` is one of the ancestors.
    pub fn contains(&self, real_path: &Path) -> bool {
        self.dirs.iter().any(|dir| dir == real_path)
    }

    /// Chain for a child directory entered at `real_path`.
    pub fn descend(&self, real_path: PathBuf) -> Self {
        let dirs: Vec<PathBuf> = self
            .dirs
            .iter()
            .cloned()
            .chain(std::iter::once(real_path))
            .collect();
        Self { dirs: dirs.into() }
    }

    /// Number of directories on the chain.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
