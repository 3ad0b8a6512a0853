//! Integration tests for spotlight-engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tempfile::TempDir;

use spotlight_core::{FileIdentity, SpotlightConfig, SpotlightError, ToggleItem, WarningKind};
use spotlight_engine::{
    Decoration, DimController, DimState, DimStyle, DirectoryWalker, FolderGrouper, LineRange,
    LocalFs, NoopHost, Selection, SpotlightNode, SpotlightPresenter, SpotlightSession,
    SpotlightSet, TextSurface,
};
use spotlight_walk::{BoxFuture, DirEntry, EntryStat, FileSystem};

/// In-memory tree keyed by absolute path.
#[derive(Default)]
struct MemoryFs {
    dirs: BTreeMap<PathBuf, Vec<DirEntry>>,
    files: BTreeSet<PathBuf>,
}

impl MemoryFs {
    fn with_files(paths: &[&str]) -> Self {
        let mut fs = Self::default();
        for path in paths {
            fs.add_file(Path::new(path));
        }
        fs
    }

    fn add_file(&mut self, path: &Path) {
        self.files.insert(path.to_path_buf());
        let mut child = path.to_path_buf();
        let mut is_dir = false;
        while let Some(parent) = child.parent().map(Path::to_path_buf) {
            let name = child
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let entries = self.dirs.entry(parent.clone()).or_default();
            if !name.is_empty() && !entries.iter().any(|e| e.name == name.as_str()) {
                entries.push(if is_dir {
                    DirEntry::dir(name)
                } else {
                    DirEntry::file(name)
                });
            }
            child = parent;
            is_dir = true;
        }
    }
}

impl FileSystem for MemoryFs {
    fn stat<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<EntryStat, SpotlightError>> {
        Box::pin(async move {
            if self.dirs.contains_key(path) {
                Ok(EntryStat { is_dir: true })
            } else if self.files.contains(path) {
                Ok(EntryStat { is_dir: false })
            } else {
                Err(SpotlightError::NotFound {
                    path: path.to_path_buf(),
                })
            }
        })
    }

    fn read_directory<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<DirEntry>, SpotlightError>> {
        Box::pin(async move {
            self.dirs
                .get(path)
                .cloned()
                .ok_or_else(|| SpotlightError::NotFound {
                    path: path.to_path_buf(),
                })
        })
    }
}

/// [`MemoryFs`] that takes a while to list each directory.
struct SlowFs(MemoryFs);

impl FileSystem for SlowFs {
    fn stat<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<EntryStat, SpotlightError>> {
        self.0.stat(path)
    }

    fn read_directory<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<DirEntry>, SpotlightError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.read_directory(path).await
        })
    }
}

const TREE: &[&str] = &[
    "/ws/README.md",
    "/ws/src/lib.rs",
    "/ws/src/main.rs",
    "/ws/src/engine/set.rs",
    "/ws/src/engine/Dim.rs",
    "/ws/docs/guide.md",
];

fn memory_set() -> SpotlightSet {
    SpotlightSet::new(DirectoryWalker::new(Arc::new(MemoryFs::with_files(TREE))))
}

fn id(path: &str) -> FileIdentity {
    FileIdentity::new(path)
}

fn selections() -> Vec<Vec<ToggleItem>> {
    vec![
        vec![ToggleItem::file(id("/ws/README.md"))],
        vec![ToggleItem::folder(id("/ws/src"))],
        vec![
            ToggleItem::folder(id("/ws/src")),
            ToggleItem::file(id("/ws/src/lib.rs")),
        ],
        vec![
            ToggleItem::folder(id("/ws")),
            ToggleItem::folder(id("/ws/src/engine")),
            ToggleItem::file(id("/ws/docs/guide.md")),
        ],
        vec![],
    ]
}

#[tokio::test]
async fn double_toggle_restores_empty_set() {
    for selection in selections() {
        let set = memory_set();
        set.toggle_batch(selection.clone()).await;
        set.toggle_batch(selection.clone()).await;
        assert!(set.is_empty(), "selection {selection:?} left members behind");
    }
}

#[tokio::test]
async fn double_toggle_restores_non_empty_set() {
    let set = memory_set();
    set.toggle_batch([ToggleItem::file(id("/ws/src/lib.rs"))]).await;
    let before = set.current_members();

    for selection in selections() {
        set.toggle_batch(selection.clone()).await;
        set.toggle_batch(selection).await;
        assert_eq!(set.current_members(), before);
    }
}

#[tokio::test]
async fn folder_expansion_matches_listed_files() {
    for folder in ["/ws", "/ws/src", "/ws/src/engine", "/ws/docs"] {
        let by_folder = memory_set();
        by_folder.toggle_batch([ToggleItem::folder(id(folder))]).await;

        let by_files = memory_set();
        let listed: Vec<FileIdentity> = by_files
            .walker()
            .list_files_recursive(&id(folder))
            .filter_map(|item| async move { item.ok() })
            .collect()
            .await;
        by_files
            .toggle_batch(listed.into_iter().map(ToggleItem::file))
            .await;

        assert_eq!(by_folder.current_members(), by_files.current_members());
    }
}

#[tokio::test]
async fn grouping_is_complete() {
    let set = memory_set();
    set.toggle_batch([ToggleItem::folder(id("/ws"))]).await;
    let members = set.current_members();

    let groups = FolderGrouper::new("/ws").regroup(&members);

    for member in &members {
        let containing: Vec<_> = groups
            .iter()
            .filter(|g| g.files.contains(member))
            .collect();
        assert_eq!(containing.len(), 1, "{member} grouped {} times", containing.len());
        assert_eq!(containing[0].path.as_path(), member.parent().unwrap());
        assert_eq!(containing[0].key, member.folder_key(Path::new("/ws")));
    }
    assert_eq!(groups.file_count(), members.len());
}

#[tokio::test]
async fn presentation_is_ordered_and_deterministic() {
    let set = Arc::new(memory_set());
    let presenter = SpotlightPresenter::new(Arc::clone(&set), Path::new("/ws"), Arc::new(NoopHost));
    set.toggle_batch([ToggleItem::folder(id("/ws"))]).await;

    let roots = presenter.root_nodes();
    let keys: Vec<_> = roots.iter().map(|n| n.label().to_string()).collect();
    assert_eq!(keys, vec![".", "docs", "src", "src/engine"]);

    let engine: Vec<_> = presenter
        .children(&roots[3])
        .iter()
        .map(|n| n.label().to_string())
        .collect();
    assert_eq!(engine, vec!["Dim.rs", "set.rs"]);

    let first = presenter.hierarchy();
    set.toggle_batch([ToggleItem::file(id("/ws/README.md"))]).await;
    set.toggle_batch([ToggleItem::file(id("/ws/README.md"))]).await;
    assert_eq!(*presenter.hierarchy(), *first);
}

#[tokio::test]
async fn scenario_two_files() {
    let set = memory_set();
    let grouper = FolderGrouper::new("/ws");
    let a = id("/ws/src/lib.rs");
    let b = id("/ws/src/main.rs");

    set.toggle_batch([ToggleItem::file(a.clone()), ToggleItem::file(b.clone())])
        .await;
    assert_eq!(set.current_members(), vec![a.clone(), b.clone()]);
    assert_eq!(grouper.regroup(&set.current_members()).len(), 1);

    set.toggle_batch([ToggleItem::file(a)]).await;
    assert_eq!(set.current_members(), vec![b.clone()]);

    let other = id("/ws/docs/guide.md");
    set.toggle_batch([ToggleItem::file(other)]).await;
    assert_eq!(grouper.regroup(&set.current_members()).len(), 2);
}

#[tokio::test]
async fn scenario_src_folder_on_disk() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/a.js"), "a").unwrap();
    fs::write(temp.path().join("src/b.js"), "b").unwrap();

    let session = SpotlightSession::new(
        SpotlightConfig::new(temp.path()),
        Arc::new(LocalFs::new()),
        Arc::new(NoopHost),
    )
    .unwrap();

    session.toggle_file_spotlight(&[PathBuf::from("src")]).await;
    let files: Vec<_> = session
        .set()
        .current_members()
        .iter()
        .map(|f| f.file_name().to_string())
        .collect();
    assert_eq!(files, vec!["a.js", "b.js"]);

    session.toggle_file_spotlight(&[PathBuf::from("src")]).await;
    assert!(session.set().is_empty());
}

#[tokio::test]
async fn unreadable_items_do_not_block_batch() {
    let set = memory_set();

    let report = set
        .toggle_batch([
            ToggleItem::folder(id("/ws/missing")),
            ToggleItem::folder(id("/ws/docs")),
        ])
        .await;

    assert_eq!(report.added, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::NotFound);
}

#[tokio::test]
async fn overlapping_batches_apply_one_after_another() {
    let set = SpotlightSet::new(DirectoryWalker::new(Arc::new(SlowFs(MemoryFs::with_files(
        TREE,
    )))));
    let src = || [ToggleItem::folder(id("/ws/src"))];

    let (first, second) = tokio::join!(set.toggle_batch(src()), set.toggle_batch(src()));

    assert_eq!((first.added, first.removed), (4, 0));
    assert_eq!((second.added, second.removed), (0, 4));
    assert!(set.is_empty());
}

#[tokio::test]
async fn clear_waits_for_a_pending_batch() {
    let set = SpotlightSet::new(DirectoryWalker::new(Arc::new(SlowFs(MemoryFs::with_files(
        TREE,
    )))));

    let (report, cleared) = tokio::join!(
        set.toggle_batch([ToggleItem::folder(id("/ws/src"))]),
        set.clear()
    );

    assert_eq!(report.added, 4);
    assert_eq!(cleared, 4);
    assert!(set.is_empty());
    assert!(!set.has_spotlighted_files());
}

struct TenLines {
    decorations: usize,
}

struct Quiet;

impl Decoration for Quiet {
    fn apply(&mut self, _ranges: &[LineRange]) {}
    fn dispose(self: Box<Self>) {}
}

impl TextSurface for TenLines {
    fn line_count(&self) -> u32 {
        10
    }

    fn line_len(&self, _line: u32) -> u32 {
        20
    }

    fn selection(&self) -> Selection {
        Selection::new(3, 5)
    }

    fn create_decoration(&mut self, _style: &DimStyle) -> Box<dyn Decoration> {
        self.decorations += 1;
        Box::new(Quiet)
    }
}

#[test]
fn scenario_ten_line_document() {
    let mut doc = TenLines { decorations: 0 };
    let mut dim = DimController::default();

    assert_eq!(dim.toggle(Some(&mut doc)).unwrap(), DimState::On);
    let lines: Vec<_> = dim
        .active_regions()
        .iter()
        .map(|r| (r.start_line, r.end_line))
        .collect();
    assert_eq!(lines, vec![(0, 2), (6, 9)]);

    assert_eq!(dim.toggle(Some(&mut doc)).unwrap(), DimState::Off);
    assert!(dim.active_regions().is_empty());
    assert_eq!(doc.decorations, 1);
}

#[test]
fn file_nodes_label_with_base_name() {
    let node = SpotlightNode::file(id("/ws/src/engine/set.rs"));
    assert_eq!(node.label(), "set.rs");
    assert!(node.is_file());
}
