//! Configuration file model.
//!
//! Stored as `.opkit/config.yaml`:
//!
//! ```yaml
//! catalog-dir: catalog
//! export:
//!   output-dir: dist
//!   compression: deflated
//! validation:
//!   strict: false
//! ```
//!
//! Every field has a default, so a partial file is accepted.

use crate::error::{ConfigError, Result};
use crate::export::Compression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default catalog directory, relative to the project root.
pub const DEFAULT_CATALOG_DIR: &str = "catalog";

/// Default export directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Configuration file structure for opkit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct OpkitConfig {
    /// Root of the operator index, relative to the project root
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,

    /// Bundle export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Export configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Where bundles are written when no output path is given
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Archive entry compression
    #[serde(default)]
    pub compression: Compression,
}

/// Validation configuration section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ValidationConfig {
    /// Treat warnings as errors
    #[serde(default)]
    pub strict: bool,
}

fn default_catalog_dir() -> String {
    DEFAULT_CATALOG_DIR.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            compression: Compression::default(),
        }
    }
}

impl Default for OpkitConfig {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            export: ExportConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl OpkitConfig {
    /// Create a configuration with a custom catalog directory.
    pub fn with_catalog_dir(catalog_dir: &str) -> Self {
        Self {
            catalog_dir: catalog_dir.to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::Invalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Absolute catalog directory for a project root.
    #[must_use]
    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        root.join(&self.catalog_dir)
    }

    /// Absolute export directory for a project root.
    #[must_use]
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.export.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = OpkitConfig::default();
        assert_eq!(config.catalog_dir, DEFAULT_CATALOG_DIR);
        assert_eq!(config.export.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(config.export.compression, Compression::Deflated);
        assert!(!config.validation.strict);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: OpkitConfig = serde_yaml::from_str("export:\n  compression: stored\n").unwrap();

        assert_eq!(config.catalog_dir, DEFAULT_CATALOG_DIR);
        assert_eq!(config.export.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(config.export.compression, Compression::Stored);
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut original = OpkitConfig::with_catalog_dir("operators");
        original.validation.strict = true;
        original.save(&config_path).await.unwrap();

        let loaded = OpkitConfig::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_yaml_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        OpkitConfig::default().save(&config_path).await.unwrap();
        let content = tokio::fs::read_to_string(&config_path).await.unwrap();

        assert!(content.contains("catalog-dir: catalog"));
        assert!(content.contains("output-dir: dist"));
        assert!(content.contains("compression: deflated"));
        assert!(content.contains("strict: false"));
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "export:\n  compression: brotli\n").unwrap();

        let result = OpkitConfig::load(&config_path).await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::Invalid { .. }))
        ));
    }
}
