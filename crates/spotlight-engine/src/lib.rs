//! Spotlight membership, grouping and text dimming engine.
//!
//! This crate holds the state behind the spotlight commands:
//!
//! - [`SpotlightSet`] - the spotlighted files, mutated by atomic toggle batches
//! - [`FolderGrouper`] - groups members by parent folder
//! - [`SpotlightPresenter`] - the two-level folder/file view over the set
//! - [`DimController`] - the single-decoration text dimming toggle
//! - [`SpotlightSession`] - one session wiring all of the above to a host
//!
//! Host editors plug in through [`SpotlightHost`], [`TextSurface`] and the
//! [`FileSystem`] trait from `spotlight-walk`.

mod dim;
mod group;
mod host;
mod observer;
mod presenter;
mod session;
mod set;

pub use dim::{DimController, DimState, DimStyle, LineRange, Selection, dim_regions};
pub use group::{FolderGroup, FolderGroups, FolderGrouper, label_order};
pub use host::{Decoration, HAS_SPOTLIGHTED_FILES, NoopHost, SpotlightHost, TextSurface};
pub use observer::{ObserverList, SubscriptionId};
pub use presenter::{Hierarchy, SpotlightPresenter};
pub use session::{Command, CommandOutcome, SpotlightSession};
pub use set::{BatchReport, ChangeKind, SpotlightEvent, SpotlightSet};

// Re-export core types for convenience
pub use spotlight_core::{
    FileIdentity, SpotlightConfig, SpotlightError, SpotlightNode, ToggleItem, TraversalWarning,
    WarningKind,
};
pub use spotlight_walk::{DirectoryWalker, FileSystem, LocalFs};
