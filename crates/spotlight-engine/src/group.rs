//! Grouping of spotlighted files by parent folder.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use spotlight_core::FileIdentity;

/// Ordering used for every label in the spotlight view.
///
/// Case-insensitive first. Labels differing only in case put the lowercase
/// spelling first, so `readme` sorts before `Readme`.
pub fn label_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Spotlighted files sharing one parent folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderGroup {
    /// Folder key relative to the workspace root.
    pub key: String,
    /// Absolute folder path.
    pub path: PathBuf,
    /// Files in the folder, ordered by base name.
    pub files: Vec<FileIdentity>,
}

/// All folder groups of one membership snapshot, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderGroups {
    groups: Vec<FolderGroup>,
}

impl FolderGroups {
    /// Look up the group for a folder key.
    pub fn get(&self, key: &str) -> Option<&FolderGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Iterate groups in display order.
    pub fn iter(&self) -> impl Iterator<Item = &FolderGroup> {
        self.groups.iter()
    }

    /// Folder keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of grouped files.
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }
}

impl IntoIterator for FolderGroups {
    type Item = FolderGroup;
    type IntoIter = std::vec::IntoIter<FolderGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Derives folder groups from a membership snapshot.
#[derive(Debug, Clone)]
pub struct FolderGrouper {
    root: PathBuf,
}

impl FolderGrouper {
    /// Create a grouper keying folders relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace root folder keys are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Group `members` by their direct parent folder.
    ///
    /// The key of a file depends only on its own path. The result is the
    /// same for any ordering of `members`.
    pub fn regroup<'a>(&self, members: impl IntoIterator<Item = &'a FileIdentity>) -> FolderGroups {
        let mut by_key: HashMap<String, (PathBuf, Vec<FileIdentity>)> = HashMap::new();

        for member in members {
            let key = member.folder_key(&self.root);
            let (_, files) = by_key.entry(key).or_insert_with(|| {
                let path = member
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                (path, Vec::new())
            });
            files.push(member.clone());
        }

        let groups = by_key
            .into_iter()
            .map(|(key, (path, mut files))| {
                files.sort_by(|a, b| {
                    label_order(&a.file_name(), &b.file_name()).then_with(|| a.cmp(b))
                });
                files.dedup();
                FolderGroup { key, path, files }
            })
            .sorted_by(|a, b| label_order(&a.key, &b.key).then_with(|| a.path.cmp(&b.path)))
            .collect();

        FolderGroups { groups }
    }
}
