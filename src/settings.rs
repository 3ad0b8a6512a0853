//! User settings file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use spotlight_core::{SpotlightConfig, SpotlightError};

/// Optional overrides loaded from `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deepest folder nesting expanded by a toggle.
    pub max_depth: Option<u32>,
    /// Whether dot-files are picked up when expanding folders.
    pub include_hidden: Option<bool>,
    /// Glob patterns for entries skipped when expanding folders.
    pub ignore_patterns: Vec<String>,
    /// Opacity of dimmed text.
    pub dim_opacity: Option<f32>,
}

impl Settings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("spotlight").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific file, or return defaults.
    ///
    /// A missing file is silent; a malformed one is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };

        toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
            Self::default()
        })
    }

    /// Build a session config for `root`, applying these settings first and
    /// `overrides` on top.
    pub fn to_config(
        &self,
        root: PathBuf,
        overrides: &Settings,
    ) -> Result<SpotlightConfig, SpotlightError> {
        let mut builder = SpotlightConfig::builder();
        builder.root(root);

        for layer in [self, overrides] {
            if let Some(depth) = layer.max_depth {
                builder.max_depth(depth);
            }
            if let Some(hidden) = layer.include_hidden {
                builder.include_hidden(hidden);
            }
            if let Some(opacity) = layer.dim_opacity {
                builder.dim_opacity(opacity);
            }
        }

        let patterns: Vec<String> = self
            .ignore_patterns
            .iter()
            .chain(&overrides.ignore_patterns)
            .cloned()
            .collect();
        builder.ignore_patterns(patterns);

        builder.build().map_err(|e| SpotlightError::InvalidConfig {
            message: e.to_string(),
        })
    }
}
