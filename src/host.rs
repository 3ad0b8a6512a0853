//! Headless host: terminal output and file-backed text surfaces.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};

use spotlight_engine::{
    Decoration, DimStyle, FileIdentity, LineRange, Selection, SpotlightHost, TextSurface,
    TraversalWarning,
};

/// Host that reports requests on the terminal.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl SpotlightHost for ConsoleHost {
    fn open_file(&self, file: &FileIdentity) {
        println!("open {file}");
    }

    fn set_context(&self, key: &str, value: bool) {
        tracing::debug!(key, value, "context");
    }

    fn reveal_view(&self) {
        tracing::debug!("reveal spotlight view");
    }

    fn notify(&self, warning: &TraversalWarning) {
        eprintln!("warning: {} ({})", warning.message, warning.kind);
    }
}

/// A text file opened read-only as the active document.
#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
    line_lens: Vec<u32>,
    selection: Selection,
}

impl FileSurface {
    /// Read the line structure of `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        Ok(Self::from_text(path, &text))
    }

    /// Build a surface from already loaded text.
    ///
    /// Like an editor buffer, text ending in a newline has a trailing empty
    /// line and empty text has one empty line.
    pub fn from_text(path: &Path, text: &str) -> Self {
        let line_lens = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).chars().count() as u32)
            .collect();

        Self {
            path: path.to_path_buf(),
            line_lens,
            selection: Selection::new(0, 0),
        }
    }

    /// Set the selection reported to the dim toggle.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSurface for FileSurface {
    fn line_count(&self) -> u32 {
        self.line_lens.len() as u32
    }

    fn line_len(&self, line: u32) -> u32 {
        self.line_lens.get(line as usize).copied().unwrap_or(0)
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn create_decoration(&mut self, style: &DimStyle) -> Box<dyn Decoration> {
        Box::new(LoggedDecoration {
            path: self.path.clone(),
            opacity: style.opacity,
        })
    }
}

/// Decoration with nothing to draw on; only traces its lifecycle.
struct LoggedDecoration {
    path: PathBuf,
    opacity: f32,
}

impl Decoration for LoggedDecoration {
    fn apply(&mut self, ranges: &[LineRange]) {
        tracing::debug!(
            path = %self.path.display(),
            opacity = self.opacity,
            ranges = ranges.len(),
            "apply dim"
        );
    }

    fn dispose(self: Box<Self>) {
        tracing::debug!(path = %self.path.display(), "dispose dim");
    }
}
