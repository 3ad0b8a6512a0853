//! spot - spotlight a chosen subset of workspace files.
//!
//! Usage:
//!   spot toggle PATH...                Toggle files/folders and print the view
//!   spot dim FILE --start S --end E    Dim a file outside lines S..=E
//!   spot script [FILE]                 Run a command script (stdin by default)
//!   spot --help                        Show help

mod host;
mod render;
mod script;
mod settings;

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use spotlight_engine::{LocalFs, Selection, SpotlightSession, TextSurface};

use crate::host::{ConsoleHost, FileSurface};
use crate::render::OutputFormat;
use crate::script::ScriptRunner;
use crate::settings::Settings;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SPOTLIGHT_LOG";

#[derive(Parser)]
#[command(
    name = "spot",
    version,
    about = "Spotlight a chosen subset of workspace files",
    long_about = "spot keeps a set of spotlighted files grouped by folder and can dim \
                  text outside a selected line range.\n\n\
                  Settings are read from <config dir>/spotlight/settings.toml; \
                  command-line flags take precedence."
)]
struct Cli {
    /// Workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Maximum folder depth expanded by a toggle
    #[arg(long, global = true)]
    max_depth: Option<u32>,

    /// Skip hidden entries when expanding folders
    #[arg(long, global = true)]
    no_hidden: bool,

    /// Glob pattern for entries skipped when expanding folders (repeatable)
    #[arg(long = "ignore", value_name = "GLOB", global = true)]
    ignore_patterns: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Toggle files and folders as one batch and print the spotlight view
    Toggle {
        /// Files or folders, relative to the root
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Dim everything outside a line range of a file
    Dim {
        /// File to dim
        file: PathBuf,

        /// First selected line (0-based)
        #[arg(short, long, default_value = "0")]
        start: u32,

        /// Last selected line (0-based, inclusive)
        #[arg(short, long)]
        end: Option<u32>,
    },

    /// Run a command script
    Script {
        /// Script file (defaults to stdin)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let mut session = open_session(&cli)?;

    match cli.command {
        Command::Toggle { paths } => run_toggle(&session, &paths, cli.format).await?,
        Command::Dim { file, start, end } => {
            run_dim(&mut session, &file, start, end, cli.format)?
        }
        Command::Script { file } => run_script(&mut session, file.as_deref(), cli.format).await?,
    }

    session.shutdown();
    Ok(())
}

/// Log to stderr, filtered by `SPOTLIGHT_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_session(cli: &Cli) -> Result<SpotlightSession> {
    let root = cli.root.canonicalize().context("Invalid root")?;

    let flags = Settings {
        max_depth: cli.max_depth,
        include_hidden: cli.no_hidden.then_some(false),
        ignore_patterns: cli.ignore_patterns.clone(),
        dim_opacity: None,
    };
    let config = Settings::load()
        .to_config(root, &flags)
        .context("Invalid configuration")?;

    SpotlightSession::new(config, Arc::new(LocalFs::new()), Arc::new(ConsoleHost))
        .context("Cannot start session")
}

/// Toggle one batch and print the resulting view.
async fn run_toggle(session: &SpotlightSession, paths: &[PathBuf], format: OutputFormat) -> Result<()> {
    let report = session.toggle_file_spotlight(paths).await;
    let hierarchy = session.presenter().hierarchy();

    #[derive(serde::Serialize)]
    struct ToggleOutput<'a> {
        report: &'a spotlight_engine::BatchReport,
        tree: &'a spotlight_engine::Hierarchy,
    }

    let output = ToggleOutput {
        report: &report,
        tree: &hierarchy,
    };
    render::emit(format, &output, || {
        format!(
            "{}\n\n{}",
            render::report_text(&report),
            render::tree_text(&hierarchy)
        )
    })
}

/// Dim a file outside the given lines and print the dimmed regions.
fn run_dim(
    session: &mut SpotlightSession,
    file: &Path,
    start: u32,
    end: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let path = session.resolve(file).into_path_buf();
    let mut surface = FileSurface::open(&path)?;
    surface.select(Selection::new(start, end.unwrap_or(start)));

    session.toggle_text_dim(Some(&mut surface as &mut dyn TextSurface))?;

    let regions = session.dim().active_regions();
    render::emit(format, &regions, || render::regions_text(regions))
}

/// Run a script from a file or stdin.
async fn run_script(
    session: &mut SpotlightSession,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let source = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read script {}", path.display()))?,
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Cannot read script from stdin")?;
            source
        }
    };

    let steps = script::parse(&source)?;
    ScriptRunner::new(session, format).run(steps).await
}
