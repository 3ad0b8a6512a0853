//! One spotlight session wired to a host editor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use spotlight_core::{
    FileIdentity, SpotlightConfig, SpotlightError, ToggleItem, TraversalWarning,
};
use spotlight_walk::{DirectoryWalker, FileSystem};

use crate::dim::{DimController, DimState, DimStyle};
use crate::host::{HAS_SPOTLIGHTED_FILES, SpotlightHost, TextSurface};
use crate::observer::SubscriptionId;
use crate::presenter::SpotlightPresenter;
use crate::set::{BatchReport, SpotlightSet};

/// User-invocable spotlight commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dim everything outside the selection of the active surface, or undo it.
    ToggleTextDim,
    /// Toggle the selected files and folders. An empty selection clears.
    ToggleFileSpotlight(Vec<PathBuf>),
    /// Remove every spotlighted file.
    ClearSpotlight,
    /// Remove one file from the spotlight.
    RemoveFromSpotlight(PathBuf),
}

/// What a [`Command`] did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Dim { state: DimState },
    Batch { report: BatchReport },
    Cleared { removed: usize },
    Removed { removed: bool },
}

/// Spotlight state of one editor window.
pub struct SpotlightSession {
    config: SpotlightConfig,
    fs: Arc<dyn FileSystem>,
    host: Arc<dyn SpotlightHost>,
    set: Arc<SpotlightSet>,
    presenter: SpotlightPresenter,
    dim: DimController,
    context_subscription: Option<SubscriptionId>,
}

impl SpotlightSession {
    /// Start a session with an empty spotlight.
    pub fn new(
        config: SpotlightConfig,
        fs: Arc<dyn FileSystem>,
        host: Arc<dyn SpotlightHost>,
    ) -> Result<Self, SpotlightError> {
        let walker = DirectoryWalker::from_config(Arc::clone(&fs), &config)?;
        let set = Arc::new(SpotlightSet::new(walker));

        let context_subscription = {
            let host = Arc::clone(&host);
            set.subscribe(move |event| {
                host.set_context(HAS_SPOTLIGHTED_FILES, event.has_spotlighted_files)
            })
        };
        host.set_context(HAS_SPOTLIGHTED_FILES, false);

        let presenter = SpotlightPresenter::new(Arc::clone(&set), &config.root, Arc::clone(&host));
        let dim = DimController::new(DimStyle {
            opacity: config.dim_opacity,
        });

        tracing::debug!(root = %config.root.display(), "spotlight session started");

        Ok(Self {
            config,
            fs,
            host,
            set,
            presenter,
            dim,
            context_subscription: Some(context_subscription),
        })
    }

    /// Run one command.
    ///
    /// `surface` is the active text surface, if any. Only
    /// [`Command::ToggleTextDim`] uses it.
    pub async fn execute(
        &mut self,
        command: Command,
        surface: Option<&mut dyn TextSurface>,
    ) -> Result<CommandOutcome, SpotlightError> {
        match command {
            Command::ToggleTextDim => self
                .toggle_text_dim(surface)
                .map(|state| CommandOutcome::Dim { state }),
            Command::ToggleFileSpotlight(paths) => {
                let report = self.toggle_file_spotlight(&paths).await;
                Ok(CommandOutcome::Batch { report })
            }
            Command::ClearSpotlight => {
                let removed = self.clear_spotlight().await;
                Ok(CommandOutcome::Cleared { removed })
            }
            Command::RemoveFromSpotlight(path) => {
                let removed = self.remove_from_spotlight(&path).await;
                Ok(CommandOutcome::Removed { removed })
            }
        }
    }

    /// Toggle dimming on the active surface.
    pub fn toggle_text_dim(
        &mut self,
        surface: Option<&mut dyn TextSurface>,
    ) -> Result<DimState, SpotlightError> {
        self.dim.toggle(surface).inspect_err(|e| {
            tracing::debug!(error = %e, "dim toggle ignored");
        })
    }

    /// Toggle the selected entries as one batch.
    ///
    /// Each path is classified as a file or folder by a stat. Paths that
    /// cannot be stat-ed are reported and skipped. An empty selection clears
    /// the spotlight. After a batch the host is asked to reveal the view.
    pub async fn toggle_file_spotlight(&self, paths: &[PathBuf]) -> BatchReport {
        if paths.is_empty() {
            let removed = self.clear_spotlight().await;
            return BatchReport {
                removed,
                ..Default::default()
            };
        }

        let mut items = Vec::with_capacity(paths.len());
        let mut stat_warnings = Vec::new();
        for path in paths {
            let identity = self.resolve(path);
            match self.fs.stat(identity.as_path()).await {
                Ok(stat) => items.push(ToggleItem {
                    identity,
                    is_folder: stat.is_dir,
                }),
                Err(e) => stat_warnings.push(TraversalWarning::from(e)),
            }
        }

        let mut report = self.set.toggle_batch(items).await;
        stat_warnings.append(&mut report.warnings);
        report.warnings = stat_warnings;

        for warning in &report.warnings {
            tracing::warn!(path = %warning.path.display(), kind = %warning.kind, "{}", warning.message);
            self.host.notify(warning);
        }
        self.host.reveal_view();

        report
    }

    /// Remove every spotlighted file. Returns how many were removed.
    pub async fn clear_spotlight(&self) -> usize {
        self.set.clear().await
    }

    /// Remove one file from the spotlight.
    ///
    /// A file that is not spotlighted is left alone and reported to the host.
    pub async fn remove_from_spotlight(&self, path: &Path) -> bool {
        let identity = self.resolve(path);
        let removed = self.presenter.remove(&identity).await;
        if !removed {
            let desync = SpotlightError::StateDesync {
                path: identity.into_path_buf(),
            };
            tracing::debug!(error = %desync, "remove ignored");
            self.host.notify(&TraversalWarning::from(desync));
        }
        removed
    }

    /// The host switched to another document; drop the dim of the old one.
    pub fn active_surface_changed(&mut self) {
        if self.dim.is_on() {
            tracing::debug!("active surface changed, releasing dim");
        }
        self.dim.release();
    }

    /// Release host resources held by the session.
    pub fn shutdown(&mut self) {
        self.dim.release();
        if let Some(id) = self.context_subscription.take() {
            self.set.unsubscribe(id);
        }
        tracing::debug!("spotlight session shut down");
    }

    /// Resolve a user-supplied path against the workspace root.
    pub fn resolve(&self, path: &Path) -> FileIdentity {
        FileIdentity::resolve(&self.config.root, path)
    }

    pub fn config(&self) -> &SpotlightConfig {
        &self.config
    }

    pub fn set(&self) -> &Arc<SpotlightSet> {
        &self.set
    }

    pub fn presenter(&self) -> &SpotlightPresenter {
        &self.presenter
    }

    pub fn dim(&self) -> &DimController {
        &self.dim
    }

    pub fn host(&self) -> &Arc<dyn SpotlightHost> {
        &self.host
    }
}

impl Drop for SpotlightSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SpotlightSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotlightSession")
            .field("root", &self.config.root)
            .field("members", &self.set.len())
            .field("dim", &self.dim.state())
            .finish()
    }
}
