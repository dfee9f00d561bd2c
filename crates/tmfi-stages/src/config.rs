//! Pipeline configuration file.
//!
//! One YAML document with a section per component. Every section falls
//! back to its default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tmfi_core::TmfiError;
use tmfi_in::{CorrectorConfig, ReconcilerConfig};
use tmfi_quality::{PlausibilityBounds, SemanticCheck};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(String),
}

impl From<ConfigError> for TmfiError {
    fn from(e: ConfigError) -> Self {
        TmfiError::ConfigError(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Catalog file; relative paths are resolved against the config file's directory
    pub catalog: PathBuf,
    pub reconciler: ReconcilerConfig,
    pub corrector: CorrectorConfig,
    /// Plausibility bounds
    pub profile: PlausibilityBounds,
    /// Scenario scoring for inputs that carry one
    pub semantic: SemanticCheck,
    /// Replay every stage and fail on a hash mismatch
    pub verify_determinism: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("catalogs/gst-core.json"),
            reconciler: ReconcilerConfig::default(),
            corrector: CorrectorConfig::default(),
            profile: PlausibilityBounds::default(),
            semantic: SemanticCheck::default(),
            verify_determinism: false,
        }
    }
}

impl PipelineConfig {
    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml(&content)?;
        if config.catalog.is_relative() {
            if let Some(dir) = path.parent() {
                config.catalog = dir.join(&config.catalog);
            }
        }

        tracing::info!(path = %path.display(), catalog = %config.catalog.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse YAML content; relative catalog paths are left as written
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmfi_in::ContainmentMode;

    #[test]
    fn test_empty_document_is_default() {
        let config = PipelineConfig::from_yaml("").unwrap();
        assert_eq!(config.catalog, PathBuf::from("catalogs/gst-core.json"));
        assert_eq!(config.reconciler.threshold, 0.6);
        assert!(!config.verify_determinism);
    }

    #[test]
    fn test_sections_override_independently() {
        let config = PipelineConfig::from_yaml(
            r#"
catalog: /srv/catalog.yaml
reconciler:
  containment: substring
profile:
  latency_max_ms: 250
semantic:
  pass_threshold: 0.9
"#,
        )
        .unwrap();

        assert_eq!(config.catalog, PathBuf::from("/srv/catalog.yaml"));
        assert_eq!(config.reconciler.containment, ContainmentMode::Substring);
        assert_eq!(config.reconciler.threshold, 0.6);
        assert_eq!(config.profile.latency_max_ms, 250.0);
        assert_eq!(config.profile.percent_max, 100.0);
        assert_eq!(config.corrector.affirmative.len(), 6);
        assert_eq!(config.semantic.pass_threshold, 0.9);
        assert_eq!(config.semantic.tolerance, 0.01);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = PipelineConfig::from_yaml("reconciler: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(TmfiError::from(err).to_string().starts_with("CONFIG/"));
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::load("nope/pipeline.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
