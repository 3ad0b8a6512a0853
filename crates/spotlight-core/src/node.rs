//! Toggle inputs and presentation nodes.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::identity::FileIdentity;

/// One entry of a toggle batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToggleItem {
    /// Path of the selected entry.
    pub identity: FileIdentity,
    /// Whether the entry is a folder to be expanded into its files.
    pub is_folder: bool,
}

impl ToggleItem {
    /// A single file toggle.
    pub fn file(identity: impl Into<FileIdentity>) -> Self {
        Self {
            identity: identity.into(),
            is_folder: false,
        }
    }

    /// A folder toggle, expanded to every file beneath it.
    pub fn folder(identity: impl Into<FileIdentity>) -> Self {
        Self {
            identity: identity.into(),
            is_folder: true,
        }
    }
}

/// A node in the two-level spotlight hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpotlightNode {
    /// A folder grouping spotlighted files.
    Folder {
        /// Folder key relative to the workspace root.
        key: String,
        /// Absolute folder path.
        path: PathBuf,
    },
    /// A spotlighted file.
    File {
        /// Identity of the file.
        identity: FileIdentity,
        /// Base name shown in the view.
        name: CompactString,
    },
}

impl SpotlightNode {
    /// Create a file node labelled with the file's base name.
    pub fn file(identity: FileIdentity) -> Self {
        let name = identity.file_name();
        Self::File { identity, name }
    }

    /// Label shown for this node.
    pub fn label(&self) -> &str {
        match self {
            Self::Folder { key, .. } => key.as_str(),
            Self::File { name, .. } => name.as_str(),
        }
    }

    /// Check if this is a folder node.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Check if this is a file node.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Identity of a file node.
    pub fn identity(&self) -> Option<&FileIdentity> {
        match self {
            Self::File { identity, .. } => Some(identity),
            Self::Folder { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_node_label() {
        let node = SpotlightNode::file(FileIdentity::new("/ws/src/main.rs"));
        assert!(node.is_file());
        assert_eq!(node.label(), "main.rs");
        assert!(node.identity().is_some());
    }

    #[test]
    fn test_folder_node_label() {
        let node = SpotlightNode::Folder {
            key: "src/app".to_string(),
            path: PathBuf::from("/ws/src/app"),
        };
        assert!(node.is_folder());
        assert_eq!(node.label(), "src/app");
        assert!(node.identity().is_none());
    }

    #[test]
    fn test_node_serializes_tagged() {
        let node = SpotlightNode::file(FileIdentity::new("/ws/a.txt"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["name"], "a.txt");
    }
}
