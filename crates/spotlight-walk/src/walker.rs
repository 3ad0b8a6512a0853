//! Depth-first folder expansion.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use spotlight_core::{FileIdentity, SpotlightConfig, SpotlightError, TraversalWarning};

use crate::ancestry::AncestorChain;
use crate::fs::FileSystem;

/// Default bound on directory nesting.
const DEFAULT_MAX_DEPTH: u32 = 64;

/// Expands folders into the files beneath them.
#[derive(Clone)]
pub struct DirectoryWalker {
    fs: Arc<dyn FileSystem>,
    filters: Arc<EntryFilters>,
}

impl DirectoryWalker {
    /// Create a walker with default limits and no filters.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            filters: Arc::new(EntryFilters {
                max_depth: DEFAULT_MAX_DEPTH,
                include_hidden: true,
                ignore: None,
            }),
        }
    }

    /// Create a walker using the limits and filters of a session config.
    pub fn from_config(
        fs: Arc<dyn FileSystem>,
        config: &SpotlightConfig,
    ) -> Result<Self, SpotlightError> {
        Ok(Self {
            fs,
            filters: Arc::new(EntryFilters {
                max_depth: config.max_depth,
                include_hidden: config.include_hidden,
                ignore: build_ignore_set(&config.ignore_patterns)?,
            }),
        })
    }

    /// File system the walker reads through.
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Lazily list every file beneath `folder`, recursing through subfolders.
    ///
    /// The stream yields files and non-fatal warnings for skipped branches.
    /// It is finite and cannot be restarted.
    pub fn list_files_recursive(&self, folder: &FileIdentity) -> FileStream {
        let state = WalkState {
            fs: Arc::clone(&self.fs),
            filters: Arc::clone(&self.filters),
            stack: vec![PendingDir {
                dir: folder.clone(),
                depth: 0,
                ancestors: AncestorChain::new(),
            }],
            pending: VecDeque::new(),
        };

        let inner = stream::unfold(state, |mut state| async move {
            let item = state.next_item().await?;
            Some((item, state))
        })
        .boxed();

        FileStream { inner }
    }

    /// Drain [`Self::list_files_recursive`] into files and warnings.
    pub async fn collect(&self, folder: &FileIdentity) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let mut files = self.list_files_recursive(folder);

        while let Some(item) = files.next().await {
            match item {
                Ok(file) => outcome.files.push(file),
                Err(warning) => {
                    tracing::warn!(path = %warning.path.display(), kind = %warning.kind, "{}", warning.message);
                    outcome.warnings.push(warning);
                }
            }
        }

        outcome
    }
}

impl std::fmt::Debug for DirectoryWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWalker")
            .field("max_depth", &self.filters.max_depth)
            .field("include_hidden", &self.filters.include_hidden)
            .finish_non_exhaustive()
    }
}

/// Files and warnings gathered from one folder expansion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkOutcome {
    /// Files found beneath the folder.
    pub files: Vec<FileIdentity>,
    /// Branches that were skipped.
    pub warnings: Vec<TraversalWarning>,
}

impl WalkOutcome {
    /// Check if any branch was skipped.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Lazy, finite stream of files beneath a folder.
pub struct FileStream {
    inner: BoxStream<'static, Result<FileIdentity, TraversalWarning>>,
}

impl Stream for FileStream {
    type Item = Result<FileIdentity, TraversalWarning>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Name filters and limits applied to every walk.
struct EntryFilters {
    max_depth: u32,
    include_hidden: bool,
    ignore: Option<GlobSet>,
}

impl EntryFilters {
    fn skips(&self, name: &str) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return true;
        }
        self.ignore.as_ref().is_some_and(|set| set.is_match(name))
    }
}

/// A directory waiting to be read.
struct PendingDir {
    dir: FileIdentity,
    /// Depth below the walk root.
    depth: u32,
    /// Real paths of the directories above `dir` on this route.
    ancestors: AncestorChain,
}

/// Mutable traversal state threaded through the stream.
struct WalkState {
    fs: Arc<dyn FileSystem>,
    filters: Arc<EntryFilters>,
    stack: Vec<PendingDir>,
    /// Items produced by the last directory read and not yet yielded.
    pending: VecDeque<Result<FileIdentity, TraversalWarning>>,
}

impl WalkState {
    async fn next_item(&mut self) -> Option<Result<FileIdentity, TraversalWarning>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            let next = self.stack.pop()?;
            self.expand(next).await;
        }
    }

    /// Read one directory, queueing its files and pushing its subfolders.
    ///
    /// A directory is a cycle only if its real path is one of its own
    /// ancestors; the same directory reached through a sibling link is
    /// walked again under that link's path.
    async fn expand(&mut self, next: PendingDir) {
        let PendingDir {
            dir,
            depth,
            ancestors,
        } = next;

        let real = match self.fs.real_path(dir.as_path()).await {
            Ok(real) => real,
            Err(err) => {
                self.pending.push_back(Err(TraversalWarning::from(err)));
                return;
            }
        };
        if ancestors.contains(&real) {
            self.pending
                .push_back(Err(TraversalWarning::symlink_cycle(dir.as_path(), &real)));
            return;
        }
        let ancestors = ancestors.descend(real);

        let mut entries = match self.fs.read_directory(dir.as_path()).await {
            Ok(entries) => entries,
            Err(err) => {
                self.pending.push_back(Err(TraversalWarning::from(err)));
                return;
            }
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut subdirs = Vec::new();
        for entry in entries {
            if self.filters.skips(&entry.name) {
                continue;
            }
            let child = dir.join(entry.name.as_str());
            if !entry.is_dir {
                self.pending.push_back(Ok(child));
            } else if depth + 1 > self.filters.max_depth {
                self.pending.push_back(Err(TraversalWarning::depth_limit(
                    child.as_path(),
                    self.filters.max_depth,
                )));
            } else {
                subdirs.push(child);
            }
        }

        // Reversed so subfolders are popped in name order
        self.stack
            .extend(subdirs.into_iter().rev().map(|child| PendingDir {
                dir: child,
                depth: depth + 1,
                ancestors: ancestors.clone(),
            }));
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<Option<GlobSet>, SpotlightError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| SpotlightError::InvalidConfig {
            message: format!("invalid ignore pattern {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }

    let set = builder.build().map_err(|e| SpotlightError::InvalidConfig {
        message: format!("failed to build ignore matcher: {e}"),
    })?;
    Ok(Some(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use spotlight_core::WarningKind;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("empty/also_empty")).unwrap();
        fs::write(root.join("src/a.js"), "a").unwrap();
        fs::write(root.join("src/b.js"), "b").unwrap();
        fs::write(root.join("src/nested/c.js"), "c").unwrap();
        fs::write(root.join("src/.hidden"), "h").unwrap();

        temp
    }

    fn names(outcome: &WalkOutcome, root: &std::path::Path) -> BTreeSet<String> {
        outcome
            .files
            .iter()
            .map(|f| {
                f.as_path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[tokio::test]
    async fn test_recurses_through_subfolders() {
        let temp = create_test_tree();
        let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));

        let outcome = walker.collect(&FileIdentity::new(temp.path().join("src"))).await;

        assert!(!outcome.has_warnings());
        assert_eq!(
            names(&outcome, temp.path()),
            ["src/.hidden", "src/a.js", "src/b.js", "src/nested/c.js"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<_>>()
        );
    }

    #[tokio::test]
    async fn test_empty_folders_yield_nothing() {
        let temp = create_test_tree();
        let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));

        let outcome = walker
            .collect(&FileIdentity::new(temp.path().join("empty")))
            .await;

        assert!(outcome.files.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_folder_is_a_warning() {
        let temp = create_test_tree();
        let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));

        let outcome = walker
            .collect(&FileIdentity::new(temp.path().join("vanished")))
            .await;

        assert!(outcome.files.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::NotFound);
    }

    #[tokio::test]
    async fn test_filters_from_config() {
        let temp = create_test_tree();
        let config = SpotlightConfig::builder()
            .root(temp.path())
            .include_hidden(false)
            .ignore_patterns(vec!["nested".to_string()])
            .build()
            .unwrap();
        let walker = DirectoryWalker::from_config(Arc::new(LocalFs::new()), &config).unwrap();

        let outcome = walker.collect(&FileIdentity::new(temp.path().join("src"))).await;

        assert_eq!(
            names(&outcome, temp.path()),
            ["src/a.js", "src/b.js"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<_>>()
        );
    }

    #[tokio::test]
    async fn test_depth_limit_skips_branch() {
        let temp = create_test_tree();
        let config = SpotlightConfig::builder()
            .root(temp.path())
            .max_depth(1u32)
            .build()
            .unwrap();
        let walker = DirectoryWalker::from_config(Arc::new(LocalFs::new()), &config).unwrap();

        // root(0) -> src(1) -> nested(2) is past the bound
        let outcome = walker.collect(&FileIdentity::new(temp.path())).await;

        assert!(outcome.files.iter().any(|f| f.file_name().as_str() == "a.js"));
        assert!(!outcome.files.iter().any(|f| f.file_name().as_str() == "c.js"));
        assert!(
            outcome
                .warnings
                .iter()
                .any(|w| w.kind == WarningKind::DepthLimit)
        );
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let config = SpotlightConfig::builder()
            .root("/ws")
            .ignore_patterns(vec!["[unclosed".to_string()])
            .build()
            .unwrap();
        let err = DirectoryWalker::from_config(Arc::new(LocalFs::new()), &config).unwrap_err();
        assert!(matches!(err, SpotlightError::InvalidConfig { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_cycle_is_skipped() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path().join("src"), temp.path().join("src/nested/loop"))
            .unwrap();
        let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));

        let outcome = walker.collect(&FileIdentity::new(temp.path().join("src"))).await;

        assert_eq!(outcome.files.len(), 4);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::SymlinkCycle);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sibling_link_to_same_folder_is_walked_twice() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a/real")).unwrap();
        fs::write(root.join("a/real/x.txt"), "x").unwrap();
        // Sorts before "a", so the link is reached first
        std::os::unix::fs::symlink(root.join("a/real"), root.join("0link")).unwrap();
        let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));

        let outcome = walker.collect(&FileIdentity::new(root)).await;

        assert!(!outcome.has_warnings(), "{:?}", outcome.warnings);
        assert_eq!(
            names(&outcome, root),
            ["0link/x.txt", "a/real/x.txt"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<_>>()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_link_to_ancestor_through_sibling_is_a_cycle() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/y.txt"), "y").unwrap();
        std::os::unix::fs::symlink(root.join("a"), root.join("a/b/up")).unwrap();
        std::os::unix::fs::symlink(root.join("a/b"), root.join("side")).unwrap();
        let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));

        let outcome = walker.collect(&FileIdentity::new(root)).await;

        assert_eq!(
            names(&outcome, root),
            ["a/b/y.txt", "side/y.txt"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<_>>()
        );
        assert!(
            outcome
                .warnings
                .iter()
                .all(|w| w.kind == WarningKind::SymlinkCycle)
        );
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_stream_is_lazy_and_finite() {
        let temp = create_test_tree();
        let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));

        let mut stream = walker.list_files_recursive(&FileIdentity::new(temp.path().join("src")));
        let first = stream.next().await;
        assert!(matches!(first, Some(Ok(_))));

        let rest: Vec<_> = stream.collect().await;
        assert_eq!(rest.len(), 3);
    }
}
