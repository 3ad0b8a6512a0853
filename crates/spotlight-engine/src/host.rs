//! Host editor collaborators.

use spotlight_core::{FileIdentity, TraversalWarning};

use crate::dim::{DimStyle, LineRange, Selection};

/// Context key toggled whenever the set goes from empty to non-empty or back.
pub const HAS_SPOTLIGHTED_FILES: &str = "hasSpotlightedFiles";

/// UI services provided by the host editor.
pub trait SpotlightHost: Send + Sync {
    /// Show the contents of a file.
    fn open_file(&self, file: &FileIdentity);

    /// Update a boolean context flag used for menu/command enablement.
    fn set_context(&self, _key: &str, _value: bool) {}

    /// Bring the spotlight view into focus.
    fn reveal_view(&self) {}

    /// Surface a non-fatal problem to the user.
    fn notify(&self, _warning: &TraversalWarning) {}
}

/// Host that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl SpotlightHost for NoopHost {
    fn open_file(&self, _file: &FileIdentity) {}
}

/// The active document view of the host editor.
pub trait TextSurface {
    /// Number of lines in the document.
    fn line_count(&self) -> u32;

    /// Length of a line in characters.
    fn line_len(&self, line: u32) -> u32;

    /// Current selection, as inclusive line numbers.
    fn selection(&self) -> Selection;

    /// Create a decoration that renders ranges with the given style.
    fn create_decoration(&mut self, style: &DimStyle) -> Box<dyn Decoration>;
}

/// A live decoration handle on a text surface.
pub trait Decoration {
    /// Render the decoration over exactly these ranges.
    fn apply(&mut self, ranges: &[LineRange]);

    /// Remove the decoration from the surface.
    fn dispose(self: Box<Self>);
}
