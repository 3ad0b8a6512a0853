//! Session configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a spotlight session.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SpotlightConfig {
    /// Workspace root; folder keys are relative to it.
    pub root: PathBuf,

    /// Maximum directory depth followed when expanding a folder.
    #[builder(default = "64")]
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Include hidden entries (starting with .) when expanding folders.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Glob patterns matched against entry names; matches are skipped.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Opacity of de-emphasised text (0.0 - 1.0).
    #[builder(default = "0.10")]
    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f32,
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u32 {
    64
}

fn default_dim_opacity() -> f32 {
    0.10
}

impl SpotlightConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            _ => {}
        }
        if self.max_depth == Some(0) {
            return Err("max_depth must be at least 1".to_string());
        }
        if let Some(opacity) = self.dim_opacity
            && !(0.0..=1.0).contains(&opacity)
        {
            return Err(format!("dim_opacity must be within 0.0..=1.0, got {opacity}"));
        }
        Ok(())
    }
}

impl SpotlightConfig {
    /// Create a new config builder.
    pub fn builder() -> SpotlightConfigBuilder {
        SpotlightConfigBuilder::default()
    }

    /// Create a default config rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: default_max_depth(),
            include_hidden: true,
            ignore_patterns: Vec::new(),
            dim_opacity: default_dim_opacity(),
        }
    }

    /// Check if hidden entries should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SpotlightConfig::builder()
            .root("/home/user/project")
            .max_depth(8u32)
            .include_hidden(false)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user/project"));
        assert_eq!(config.max_depth, 8);
        assert!(!config.include_hidden);
        assert!((config.dim_opacity - 0.10).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert!(SpotlightConfig::builder().build().is_err());
        assert!(SpotlightConfig::builder().root("").build().is_err());
        assert!(
            SpotlightConfig::builder()
                .root("/ws")
                .max_depth(0u32)
                .build()
                .is_err()
        );
        assert!(
            SpotlightConfig::builder()
                .root("/ws")
                .dim_opacity(1.5f32)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_should_skip_hidden() {
        let mut config = SpotlightConfig::new("/test");

        // By default, hidden entries are walked
        assert!(!config.should_skip_hidden(".github"));

        config.include_hidden = false;
        assert!(config.should_skip_hidden(".github"));
        assert!(!config.should_skip_hidden("src"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: SpotlightConfig = serde_json::from_str(r#"{"root": "/ws"}"#).unwrap();
        assert_eq!(config, SpotlightConfig::new("/ws"));
    }
}
