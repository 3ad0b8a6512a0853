//! Error and warning types for spotlight operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by spotlight operations.
///
/// None of these are fatal to a session: callers degrade to a no-op for the
/// affected item and report the error to the user.
#[derive(Debug, Error)]
pub enum SpotlightError {
    /// Dimming was requested with no active text surface.
    #[error("No active text surface")]
    InvalidSelection,

    /// A path referenced by a command is no longer spotlighted.
    #[error("Not spotlighted: {path}")]
    StateDesync { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl SpotlightError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path this error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::StateDesync { path }
            | Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. } => Some(path),
            Self::InvalidSelection | Self::InvalidConfig { .. } => None,
        }
    }
}

/// Kind of traversal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// The entry vanished before it could be read.
    NotFound,
    /// Error reading a file or directory.
    ReadError,
    /// A symbolic link led back to a directory already being walked.
    SymlinkCycle,
    /// The configured maximum depth was reached.
    DepthLimit,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NotFound => write!(f, "not found"),
            Self::ReadError => write!(f, "read error"),
            Self::SymlinkCycle => write!(f, "symlink cycle"),
            Self::DepthLimit => write!(f, "depth limit reached"),
        }
    }
}

/// Non-fatal warning raised while resolving a toggle batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl TraversalWarning {
    /// Create a new traversal warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from an I/O error, classifying it by error kind.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            std::io::ErrorKind::NotFound => WarningKind::NotFound,
            _ => WarningKind::ReadError,
        };
        Self {
            message: format!("{}: {error}", path.display()),
            path,
            kind,
        }
    }

    /// Create a symlink cycle warning.
    pub fn symlink_cycle(path: impl Into<PathBuf>, target: &std::path::Path) -> Self {
        let path = path.into();
        Self {
            message: format!(
                "Symlink cycle: {} leads back to ancestor {}",
                path.display(),
                target.display()
            ),
            path,
            kind: WarningKind::SymlinkCycle,
        }
    }

    /// Create a depth limit warning.
    pub fn depth_limit(path: impl Into<PathBuf>, max_depth: u32) -> Self {
        let path = path.into();
        Self {
            message: format!("Skipped {} (deeper than {max_depth})", path.display()),
            path,
            kind: WarningKind::DepthLimit,
        }
    }
}

impl From<SpotlightError> for TraversalWarning {
    fn from(error: SpotlightError) -> Self {
        let message = error.to_string();
        match error {
            SpotlightError::PermissionDenied { path } => {
                Self::new(path, message, WarningKind::PermissionDenied)
            }
            SpotlightError::NotFound { path } | SpotlightError::StateDesync { path } => {
                Self::new(path, message, WarningKind::NotFound)
            }
            SpotlightError::Io { path, .. } => Self::new(path, message, WarningKind::ReadError),
            SpotlightError::InvalidSelection | SpotlightError::InvalidConfig { .. } => {
                Self::new(PathBuf::new(), message, WarningKind::ReadError)
            }
        }
    }
}
