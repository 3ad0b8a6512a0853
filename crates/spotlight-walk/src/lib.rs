//! Asynchronous folder expansion for spotlight.
//!
//! This crate resolves folders into the files beneath them, through a
//! host-provided [`FileSystem`].
//!
//! # Overview
//!
//! `spotlight-walk` is responsible for turning a selected folder into the
//! set of files it contains. Key features:
//!
//! - **Lazy traversal** via a depth-first [`FileStream`]
//! - **Host abstraction** through the [`FileSystem`] trait, with a tokio
//!   backed [`LocalFs`] for the local disk
//! - **Cycle protection** for symbolic links and a hard depth bound
//! - **Non-fatal warnings** for unreadable or vanished branches
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spotlight_walk::{DirectoryWalker, FileIdentity, LocalFs};
//!
//! # async fn run() {
//! let walker = DirectoryWalker::new(Arc::new(LocalFs::new()));
//! let outcome = walker.collect(&FileIdentity::new("/path/to/folder")).await;
//!
//! println!("{} files", outcome.files.len());
//! for warning in &outcome.warnings {
//!     eprintln!("skipped: {}", warning.message);
//! }
//! # }
//! ```

mod ancestry;
mod fs;
mod walker;

pub use ancestry::AncestorChain;
pub use fs::{BoxFuture, DirEntry, EntryStat, FileSystem, LocalFs};
pub use walker::{DirectoryWalker, FileStream, WalkOutcome};

// Re-export core types for convenience
pub use spotlight_core::{FileIdentity, SpotlightConfig, SpotlightError, TraversalWarning, WarningKind};
