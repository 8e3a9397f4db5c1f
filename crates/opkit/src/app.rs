//! Application context for CLI command execution.
//!
//! Unlike most commands, `resolve`, `validate`, `graph` and `preview` work on
//! any package directory, so an `.opkit/` directory is optional: when none
//! is found the defaults apply, relative to the working directory.
//!
//! # Example
//!
//! ```no_run
//! use opkit::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let imported = app.load_package(Path::new("etcd")).await?;
//!     println!("{}", imported.package.name());
//!     Ok(())
//! }
//! ```

use crate::catalog::{open_catalog, CatalogWarning, OperatorIndex};
use crate::commands::init::{find_opkit_root, CONFIG_FILE_NAME, OPKIT_DIR_NAME};
use crate::config::OpkitConfig;
use crate::domain::Package;
use crate::error::Result;
use crate::export::{bundle_file_name, ExportOptions};
use crate::import::{self, ImportedPackage};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
#[derive(Debug, Clone)]
pub struct App {
    /// Project root: the directory holding `.opkit/`, or the working
    /// directory when there is none
    root: PathBuf,

    /// Whether `.opkit/config.yaml` was found
    initialized: bool,

    /// Loaded or default configuration
    config: OpkitConfig,
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for `.opkit/` and loads its
    /// configuration when found.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be loaded.
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let Some(root) = find_opkit_root(working_dir) else {
            tracing::debug!(dir = %working_dir.display(), "No opkit directory found, using defaults");
            return Ok(Self {
                root: working_dir.to_path_buf(),
                initialized: false,
                config: OpkitConfig::default(),
            });
        };

        let config_path = root.join(OPKIT_DIR_NAME).join(CONFIG_FILE_NAME);
        let config = if config_path.exists() {
            OpkitConfig::load(&config_path).await?
        } else {
            OpkitConfig::default()
        };

        tracing::debug!(root = %root.display(), "Loaded opkit configuration");
        Ok(Self {
            root,
            initialized: true,
            config,
        })
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether an `.opkit/` directory was found.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The active configuration.
    pub fn config(&self) -> &OpkitConfig {
        &self.config
    }

    /// Import a package directory.
    pub async fn load_package(&self, dir: &Path) -> Result<ImportedPackage> {
        import::load_package_dir(dir).await
    }

    /// Open the configured operator catalog.
    pub async fn open_catalog(&self) -> Result<(Box<dyn OperatorIndex>, Vec<CatalogWarning>)> {
        open_catalog(&self.config.catalog_path(&self.root)).await
    }

    /// Where a package's bundle goes when no output path is given.
    pub fn default_bundle_path(&self, package: &Package) -> PathBuf {
        self.config
            .output_path(&self.root)
            .join(bundle_file_name(package))
    }

    /// Export options from configuration.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            compression: self.config.export.compression,
            ..ExportOptions::default()
        }
    }

    /// Whether validation warnings fail the `validate` command.
    pub fn strict_validation(&self) -> bool {
        self.config.validation.strict
    }
}
