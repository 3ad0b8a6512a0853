//! The spotlighted file set.

use std::collections::HashSet;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use spotlight_core::{FileIdentity, ToggleItem, TraversalWarning};
use spotlight_walk::DirectoryWalker;

use crate::observer::{ObserverList, SubscriptionId};

/// What kind of mutation produced a [`SpotlightEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A toggle batch was applied.
    Toggled,
    /// A single file was removed.
    Removed,
    /// The set was emptied.
    Cleared,
}

/// Notification fired after the membership changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotlightEvent {
    /// What kind of mutation happened.
    pub kind: ChangeKind,
    /// Files added by the mutation.
    pub added: usize,
    /// Files removed by the mutation.
    pub removed: usize,
    /// Members after the mutation.
    pub member_count: usize,
    /// Whether any file is spotlighted after the mutation.
    pub has_spotlighted_files: bool,
}

/// Result of one toggle batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Distinct files the batch flipped.
    pub targets: usize,
    /// Files that became members.
    pub added: usize,
    /// Files that stopped being members.
    pub removed: usize,
    /// Branches or paths skipped while resolving the batch.
    pub warnings: Vec<TraversalWarning>,
}

impl BatchReport {
    /// Check if the batch changed the membership.
    pub fn changed(&self) -> bool {
        self.added + self.removed > 0
    }

    /// Check if anything was skipped.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Default)]
struct Members {
    files: HashSet<FileIdentity>,
    has_spotlighted_files: bool,
}

impl Members {
    fn event(&mut self, kind: ChangeKind, added: usize, removed: usize) -> SpotlightEvent {
        self.has_spotlighted_files = !self.files.is_empty();
        SpotlightEvent {
            kind,
            added,
            removed,
            member_count: self.files.len(),
            has_spotlighted_files: self.has_spotlighted_files,
        }
    }
}

/// The single source of truth for spotlighted files.
///
/// Mutations are serialized: a toggle batch resolves every folder it names
/// before touching the membership, and no other mutation can start until it
/// has been applied. Observers therefore never see a partially applied batch.
#[derive(Debug)]
pub struct SpotlightSet {
    walker: DirectoryWalker,
    members: Mutex<Members>,
    mutation: tokio::sync::Mutex<()>,
    observers: ObserverList<SpotlightEvent>,
}

impl SpotlightSet {
    /// Create an empty set expanding folders with `walker`.
    pub fn new(walker: DirectoryWalker) -> Self {
        Self {
            walker,
            members: Mutex::new(Members::default()),
            mutation: tokio::sync::Mutex::new(()),
            observers: ObserverList::new(),
        }
    }

    /// Flip the membership of every file named by `items`.
    ///
    /// Folders expand to all files beneath them. Each distinct target is
    /// flipped once against the membership as it stood before the batch: a
    /// member is removed, anything else is added. A file reached twice in one
    /// batch (say, selected alongside its folder) still flips only once, so
    /// applying the same batch twice restores the prior membership.
    ///
    /// Unreadable branches are skipped and reported in the returned
    /// [`BatchReport`]; the rest of the batch still applies.
    pub async fn toggle_batch(&self, items: impl IntoIterator<Item = ToggleItem>) -> BatchReport {
        let _serial = self.mutation.lock().await;

        let mut targets: HashSet<FileIdentity> = HashSet::new();
        let mut warnings = Vec::new();
        for item in items {
            if item.is_folder {
                let outcome = self.walker.collect(&item.identity).await;
                tracing::debug!(
                    folder = %item.identity,
                    files = outcome.files.len(),
                    skipped = outcome.warnings.len(),
                    "expanded folder"
                );
                targets.extend(outcome.files);
                warnings.extend(outcome.warnings);
            } else {
                targets.insert(item.identity);
            }
        }

        let mut report = BatchReport {
            targets: targets.len(),
            warnings,
            ..Default::default()
        };

        let event = {
            let mut members = self.members.lock();
            for target in targets {
                if members.files.remove(&target) {
                    report.removed += 1;
                } else {
                    members.files.insert(target);
                    report.added += 1;
                }
            }
            report
                .changed()
                .then(|| members.event(ChangeKind::Toggled, report.added, report.removed))
        };

        if let Some(event) = event {
            tracing::debug!(added = event.added, removed = event.removed, members = event.member_count, "applied toggle batch");
            self.observers.fire(&event);
        }

        report
    }

    /// Remove every member. Returns how many files were removed.
    ///
    /// Waits for any batch still resolving, so the count covers its result.
    pub async fn clear(&self) -> usize {
        let _serial = self.mutation.lock().await;

        let (removed, event) = {
            let mut members = self.members.lock();
            let removed = members.files.len();
            members.files.clear();
            let event = (removed > 0).then(|| members.event(ChangeKind::Cleared, 0, removed));
            (removed, event)
        };

        if let Some(event) = event {
            tracing::debug!(removed = event.removed, "cleared spotlight");
            self.observers.fire(&event);
        }
        removed
    }

    /// Remove a single file. Returns `false` if it was not a member.
    pub async fn remove(&self, file: &FileIdentity) -> bool {
        let _serial = self.mutation.lock().await;

        let event = {
            let mut members = self.members.lock();
            members
                .files
                .remove(file)
                .then(|| members.event(ChangeKind::Removed, 0, 1))
        };

        match event {
            Some(event) => {
                self.observers.fire(&event);
                true
            }
            None => {
                tracing::debug!(file = %file, "remove of a file that is not spotlighted");
                false
            }
        }
    }

    /// Snapshot of the current members, sorted by path.
    pub fn current_members(&self) -> Vec<FileIdentity> {
        let mut files: Vec<_> = self.members.lock().files.iter().cloned().collect();
        files.sort();
        files
    }

    /// Check if a file is spotlighted.
    pub fn contains(&self, file: &FileIdentity) -> bool {
        self.members.lock().files.contains(file)
    }

    /// Number of spotlighted files.
    pub fn len(&self) -> usize {
        self.members.lock().files.len()
    }

    /// Check if nothing is spotlighted.
    pub fn is_empty(&self) -> bool {
        self.members.lock().files.is_empty()
    }

    /// Flag consumed by the host to enable spotlight-only commands.
    pub fn has_spotlighted_files(&self) -> bool {
        self.members.lock().has_spotlighted_files
    }

    /// Register a callback fired after every membership change.
    pub fn subscribe(
        &self,
        callback: impl Fn(&SpotlightEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    /// Remove a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of registered callbacks.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Walker used to expand folders.
    pub fn walker(&self) -> &DirectoryWalker {
        &self.walker
    }
}
