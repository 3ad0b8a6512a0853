//! Core types and traits for spotlight.
//!
//! This crate provides the fundamental data structures shared by the
//! spotlight crates: file identities, toggle items, presentation nodes,
//! the error/warning taxonomy, and configuration.

mod config;
mod error;
mod identity;
mod node;

pub use config::{SpotlightConfig, SpotlightConfigBuilder};
pub use error::{SpotlightError, TraversalWarning, WarningKind};
pub use identity::{FileIdentity, ROOT_FOLDER_KEY};
pub use node::{SpotlightNode, ToggleItem};
