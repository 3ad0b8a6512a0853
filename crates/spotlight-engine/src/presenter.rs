//! Two-level folder/file view over the spotlighted set.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use spotlight_core::{FileIdentity, SpotlightNode};

use crate::group::{FolderGroups, FolderGrouper};
use crate::host::SpotlightHost;
use crate::observer::SubscriptionId;
use crate::set::SpotlightSet;

/// A rendered snapshot of the spotlight view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    groups: FolderGroups,
}

impl Hierarchy {
    fn new(groups: FolderGroups) -> Self {
        Self { groups }
    }

    /// Folder nodes in display order.
    pub fn root_nodes(&self) -> Vec<SpotlightNode> {
        self.groups
            .iter()
            .map(|group| SpotlightNode::Folder {
                key: group.key.clone(),
                path: group.path.clone(),
            })
            .collect()
    }

    /// File nodes under `node`. Empty for file nodes and unknown folders.
    pub fn children(&self, node: &SpotlightNode) -> Vec<SpotlightNode> {
        let SpotlightNode::Folder { key, .. } = node else {
            return Vec::new();
        };

        self.groups
            .get(key)
            .map(|group| group.files.iter().cloned().map(SpotlightNode::file).collect())
            .unwrap_or_default()
    }

    /// Underlying folder groups.
    pub fn groups(&self) -> &FolderGroups {
        &self.groups
    }

    /// Number of files in the view.
    pub fn file_count(&self) -> usize {
        self.groups.file_count()
    }

    /// Check if the view has no entries.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Read-only presentation of a [`SpotlightSet`].
///
/// The hierarchy is cached and rebuilt in full on the first read after the
/// set changes.
pub struct SpotlightPresenter {
    set: Arc<SpotlightSet>,
    grouper: FolderGrouper,
    host: Arc<dyn SpotlightHost>,
    cache: Mutex<Arc<Hierarchy>>,
    dirty: Arc<AtomicBool>,
    subscription: SubscriptionId,
}

impl SpotlightPresenter {
    /// Create a presenter over `set`, keying folders relative to `root`.
    pub fn new(set: Arc<SpotlightSet>, root: &Path, host: Arc<dyn SpotlightHost>) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        let subscription = {
            let dirty = Arc::clone(&dirty);
            set.subscribe(move |_| dirty.store(true, Ordering::Release))
        };

        Self {
            set,
            grouper: FolderGrouper::new(root),
            host,
            cache: Mutex::new(Arc::new(Hierarchy::default())),
            dirty,
            subscription,
        }
    }

    /// Current hierarchy, rebuilt if the set changed since the last read.
    pub fn hierarchy(&self) -> Arc<Hierarchy> {
        let mut cache = self.cache.lock();
        if self.dirty.swap(false, Ordering::AcqRel) {
            let members = self.set.current_members();
            *cache = Arc::new(Hierarchy::new(self.grouper.regroup(&members)));
            tracing::debug!(files = members.len(), folders = cache.groups.len(), "rebuilt spotlight view");
        }
        Arc::clone(&*cache)
    }

    /// Folder nodes in display order.
    pub fn root_nodes(&self) -> Vec<SpotlightNode> {
        self.hierarchy().root_nodes()
    }

    /// Children of a node.
    pub fn children(&self, node: &SpotlightNode) -> Vec<SpotlightNode> {
        self.hierarchy().children(node)
    }

    /// Ask the host to show a file.
    pub fn open(&self, file: &FileIdentity) {
        self.host.open_file(file);
    }

    /// Remove one file from the set.
    pub async fn remove(&self, file: &FileIdentity) -> bool {
        self.set.remove(file).await
    }

    /// Check if the next read will rebuild the hierarchy.
    pub fn is_stale(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

impl Drop for SpotlightPresenter {
    fn drop(&mut self) {
        self.set.unsubscribe(self.subscription);
    }
}

impl std::fmt::Debug for SpotlightPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotlightPresenter")
            .field("root", &self.grouper.root())
            .field("stale", &self.is_stale())
            .finish()
    }
}
