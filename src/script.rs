//! Scripted command runner.
//!
//! One command per line:
//!
//! ```text
//! # comment
//! toggle src README.md
//! remove src/main.rs
//! select 3 5
//! dim src/lib.rs
//! show
//! clear
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use color_eyre::eyre::{Result, bail, eyre};
use strum::{Display, EnumString};

use spotlight_engine::{Command, CommandOutcome, Selection, SpotlightSession};

use crate::host::FileSurface;
use crate::render::{self, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
enum Keyword {
    Toggle,
    Clear,
    Remove,
    Select,
    Dim,
    Show,
}

/// A parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Toggle(Vec<PathBuf>),
    Clear,
    Remove(PathBuf),
    Select(Selection),
    Dim(PathBuf),
    Show,
}

/// Parse a script into steps. Blank lines and `#` comments are skipped.
///
/// A `#` starts a comment only at the start of a line or after whitespace,
/// so paths like `notes#1.md` are kept whole.
pub fn parse(source: &str) -> Result<Vec<ScriptStep>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = strip_comment(line).trim();
            (!line.is_empty()).then_some((index + 1, line))
        })
        .map(|(number, line)| parse_line(line).map_err(|e| eyre!("line {number}: {e}")))
        .collect()
}

fn strip_comment(line: &str) -> &str {
    let mut prev = None;
    for (at, c) in line.char_indices() {
        if c == '#' && prev.is_none_or(char::is_whitespace) {
            return &line[..at];
        }
        prev = Some(c);
    }
    line
}

fn parse_line(line: &str) -> Result<ScriptStep> {
    let mut words = line.split_whitespace();
    let word = words.next().unwrap_or_default();
    let keyword = Keyword::from_str(word).map_err(|_| eyre!("unknown command `{word}`"))?;
    let args: Vec<&str> = words.collect();

    let step = match (keyword, args.as_slice()) {
        (Keyword::Toggle, paths) => ScriptStep::Toggle(paths.iter().map(PathBuf::from).collect()),
        (Keyword::Clear, []) => ScriptStep::Clear,
        (Keyword::Remove, [path]) => ScriptStep::Remove(PathBuf::from(path)),
        (Keyword::Select, [start, end]) => ScriptStep::Select(Selection::new(
            start.parse().map_err(|_| eyre!("invalid line number `{start}`"))?,
            end.parse().map_err(|_| eyre!("invalid line number `{end}`"))?,
        )),
        (Keyword::Dim, [path]) => ScriptStep::Dim(PathBuf::from(path)),
        (Keyword::Show, []) => ScriptStep::Show,
        (keyword, args) => bail!("wrong number of arguments to `{keyword}`: {}", args.len()),
    };
    Ok(step)
}

/// Runs script steps against one session.
pub struct ScriptRunner<'a> {
    session: &'a mut SpotlightSession,
    format: OutputFormat,
    selection: Selection,
    surface: Option<FileSurface>,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(session: &'a mut SpotlightSession, format: OutputFormat) -> Self {
        Self {
            session,
            format,
            selection: Selection::new(0, 0),
            surface: None,
        }
    }

    /// Run every step in order.
    ///
    /// Command failures are reported and the script continues.
    pub async fn run(&mut self, steps: Vec<ScriptStep>) -> Result<()> {
        for step in steps {
            tracing::debug!(?step, "script step");
            if let Err(e) = self.step(step).await {
                eprintln!("error: {e}");
            }
        }
        Ok(())
    }

    async fn step(&mut self, step: ScriptStep) -> Result<()> {
        let command = match step {
            ScriptStep::Toggle(paths) => Command::ToggleFileSpotlight(paths),
            ScriptStep::Clear => Command::ClearSpotlight,
            ScriptStep::Remove(path) => Command::RemoveFromSpotlight(path),
            ScriptStep::Select(selection) => {
                self.selection = selection;
                if let Some(surface) = self.surface.as_mut() {
                    surface.select(selection);
                }
                return Ok(());
            }
            ScriptStep::Dim(path) => {
                self.focus(path)?;
                Command::ToggleTextDim
            }
            ScriptStep::Show => {
                let hierarchy = self.session.presenter().hierarchy();
                return render::emit(self.format, &*hierarchy, || render::tree_text(&hierarchy));
            }
        };

        let surface = self
            .surface
            .as_mut()
            .map(|surface| surface as &mut dyn spotlight_engine::TextSurface);
        let outcome = self.session.execute(command, surface).await?;

        match &outcome {
            CommandOutcome::Batch { report } => {
                render::emit(self.format, &outcome, || format!("{}\n", render::report_text(report)))
            }
            CommandOutcome::Dim { state } => {
                let regions = self.session.dim().active_regions();
                render::emit(self.format, &regions, || {
                    format!(" dim {state:?}\n{}", render::regions_text(regions))
                })
            }
            CommandOutcome::Cleared { removed } => {
                render::emit(self.format, &outcome, || format!(" cleared {removed}\n"))
            }
            CommandOutcome::Removed { removed } => {
                render::emit(self.format, &outcome, || format!(" removed: {removed}\n"))
            }
        }
    }

    /// Make `path` the active document, dropping the dim of any other one.
    fn focus(&mut self, path: PathBuf) -> Result<()> {
        let path = self.session.resolve(&path).into_path_buf();
        if self.surface.as_ref().is_some_and(|s| s.path() == path) {
            return Ok(());
        }

        self.session.active_surface_changed();
        let mut surface = FileSurface::open(&path)?;
        surface.select(self.selection);
        self.surface = Some(surface);
        Ok(())
    }
}
