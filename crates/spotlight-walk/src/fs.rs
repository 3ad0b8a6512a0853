//! File system access used during folder expansion.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use compact_str::CompactString;
use spotlight_core::SpotlightError;

/// Type alias for boxed futures returned by async file system methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a `stat` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// A single directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: CompactString,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl DirEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// Create a directory entry.
    pub fn dir(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// File system operations provided by the host.
///
/// Implementations must be shareable across tasks; the walker holds one
/// behind an `Arc` for the lifetime of a session.
pub trait FileSystem: Send + Sync {
    /// Stat a path, following symbolic links.
    fn stat<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<EntryStat, SpotlightError>>;

    /// List the direct entries of a directory.
    fn read_directory<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<DirEntry>, SpotlightError>>;

    /// Resolve a directory to the path it really lives at.
    ///
    /// The walker uses this to recognise a directory reached twice through
    /// symbolic links. Hosts without links can keep the default.
    fn real_path<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<PathBuf, SpotlightError>> {
        Box::pin(async move { Ok(path.to_path_buf()) })
    }
}

/// [`FileSystem`] over the local disk using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new local file system handle.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn stat<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<EntryStat, SpotlightError>> {
        Box::pin(async move {
            let metadata = tokio::fs::metadata(path)
                .await
                .map_err(|e| SpotlightError::io(path, e))?;
            Ok(EntryStat {
                is_dir: metadata.is_dir(),
            })
        })
    }

    fn read_directory<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<DirEntry>, SpotlightError>> {
        Box::pin(async move {
            let mut reader = tokio::fs::read_dir(path)
                .await
                .map_err(|e| SpotlightError::io(path, e))?;

            let mut entries = Vec::new();
            while let Some(entry) = reader
                .next_entry()
                .await
                .map_err(|e| SpotlightError::io(path, e))?
            {
                let name = entry.file_name().to_string_lossy().to_string();
                let file_type = match entry.file_type().await {
                    Ok(t) => t,
                    Err(err) => {
                        tracing::debug!(path = %entry.path().display(), error = %err, "unreadable entry type");
                        continue;
                    }
                };

                if file_type.is_dir() {
                    entries.push(DirEntry::dir(name));
                } else if file_type.is_file() {
                    entries.push(DirEntry::file(name));
                } else if file_type.is_symlink() {
                    // Links are followed; dangling ones contribute nothing
                    match tokio::fs::metadata(entry.path()).await {
                        Ok(target) if target.is_dir() => entries.push(DirEntry::dir(name)),
                        Ok(target) if target.is_file() => entries.push(DirEntry::file(name)),
                        Ok(_) => {}
                        Err(err) => {
                            tracing::debug!(path = %entry.path().display(), error = %err, "broken symlink");
                        }
                    }
                }
            }

            Ok(entries)
        })
    }

    fn real_path<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<PathBuf, SpotlightError>> {
        Box::pin(async move {
            tokio::fs::canonicalize(path)
                .await
                .map_err(|e| SpotlightError::io(path, e))
        })
    }
}
