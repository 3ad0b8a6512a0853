//! Text dimming outside the active selection.

use serde::{Deserialize, Serialize};

use spotlight_core::SpotlightError;

use crate::host::{Decoration, TextSurface};

/// Default opacity for de-emphasised text.
pub const DEFAULT_DIM_OPACITY: f32 = 0.10;

/// A selection as inclusive line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub start_line: u32,
    pub end_line: u32,
}

impl Selection {
    /// Create a selection spanning `start_line..=end_line`.
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Selection with start before end.
    pub fn normalized(self) -> Self {
        if self.end_line < self.start_line {
            Self::new(self.end_line, self.start_line)
        } else {
            self
        }
    }
}

/// A character range spanning whole lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl LineRange {
    /// Range from the start of `start_line` to the end of `end_line`.
    pub fn lines(start_line: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col: 0,
            end_line,
            end_col,
        }
    }
}

/// Rendering style of the dim decoration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimStyle {
    pub opacity: f32,
}

impl Default for DimStyle {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_DIM_OPACITY,
        }
    }
}

/// State of a [`DimController`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimState {
    #[default]
    Off,
    On,
}

/// Compute the ranges outside `selection` in a document of `line_count` lines.
///
/// Yields the lines before the selection and the lines after it, each only
/// when non-empty. Lines past the end of the document are clamped.
pub fn dim_regions(
    selection: Selection,
    line_count: u32,
    line_len: impl Fn(u32) -> u32,
) -> Vec<LineRange> {
    if line_count == 0 {
        return Vec::new();
    }

    let last = line_count - 1;
    let Selection {
        start_line,
        end_line,
    } = selection.normalized();
    let start = start_line.min(last);
    let end = end_line.min(last);

    let mut regions = Vec::with_capacity(2);
    if start > 0 {
        regions.push(LineRange::lines(0, start - 1, line_len(start - 1)));
    }
    if end < last {
        regions.push(LineRange::lines(end + 1, last, line_len(last)));
    }
    regions
}

/// Two-state toggle that dims everything outside the selection.
///
/// At most one decoration is alive at a time. Turning the dim on captures the
/// selection of the surface; later selection changes do not move the regions
/// until the dim is toggled off and on again.
pub struct DimController {
    style: DimStyle,
    state: DimState,
    decoration: Option<Box<dyn Decoration>>,
    selection: Option<Selection>,
    regions: Vec<LineRange>,
}

impl DimController {
    /// Create a controller in the `Off` state.
    pub fn new(style: DimStyle) -> Self {
        Self {
            style,
            state: DimState::Off,
            decoration: None,
            selection: None,
            regions: Vec::new(),
        }
    }

    /// Flip the dim state.
    ///
    /// Fails with [`SpotlightError::InvalidSelection`] and leaves the state
    /// untouched when there is no active surface.
    pub fn toggle(
        &mut self,
        surface: Option<&mut dyn TextSurface>,
    ) -> Result<DimState, SpotlightError> {
        let surface = surface.ok_or(SpotlightError::InvalidSelection)?;

        match self.state {
            DimState::Off => {
                let selection = surface.selection().normalized();
                let regions = dim_regions(selection, surface.line_count(), |line| {
                    surface.line_len(line)
                });

                let mut decoration = surface.create_decoration(&self.style);
                decoration.apply(&regions);

                tracing::debug!(
                    start = selection.start_line,
                    end = selection.end_line,
                    regions = regions.len(),
                    "dim on"
                );
                self.decoration = Some(decoration);
                self.selection = Some(selection);
                self.regions = regions;
                self.state = DimState::On;
            }
            DimState::On => {
                self.release();
                tracing::debug!("dim off");
            }
        }

        Ok(self.state)
    }

    /// Dispose any live decoration and return to `Off`.
    pub fn release(&mut self) {
        if let Some(decoration) = self.decoration.take() {
            decoration.dispose();
        }
        self.selection = None;
        self.regions.clear();
        self.state = DimState::Off;
    }

    pub fn state(&self) -> DimState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == DimState::On
    }

    /// Selection captured when the dim was turned on.
    pub fn captured_selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Regions currently rendered dim.
    pub fn active_regions(&self) -> &[LineRange] {
        &self.regions
    }

    pub fn style(&self) -> DimStyle {
        self.style
    }
}

impl Default for DimController {
    fn default() -> Self {
        Self::new(DimStyle::default())
    }
}

impl Drop for DimController {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for DimController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimController")
            .field("style", &self.style)
            .field("state", &self.state)
            .field("selection", &self.selection)
            .field("regions", &self.regions)
            .finish()
    }
}
