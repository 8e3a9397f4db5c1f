//! Implementation of the `init` command.
//!
//! Creates the `.opkit/` directory with a default configuration file.

use crate::config::OpkitConfig;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the opkit directory
pub const OPKIT_DIR_NAME: &str = ".opkit";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Maximum directory depth to traverse when searching for the opkit root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created opkit directory
    pub opkit_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Catalog directory written to the configuration
    pub catalog_dir: String,
}

/// Validate a directory setting from the command line.
///
/// Directories are stored relative to the project root, so absolute paths
/// and parent traversal are rejected.
pub fn validate_relative_dir(dir: &str) -> std::result::Result<(), String> {
    if dir.is_empty() {
        return Err("Directory cannot be empty".to_string());
    }
    let path = Path::new(dir);
    if path.is_absolute() {
        return Err(format!("'{dir}' must be relative to the project root"));
    }
    if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(format!("'{dir}' cannot leave the project root"));
    }
    Ok(())
}

/// Initialize opkit in the given directory.
///
/// # Errors
///
/// Returns an error if:
/// - The `.opkit/` directory already exists
/// - File system operations fail
pub async fn init(base_dir: &Path, catalog_dir: Option<&str>) -> Result<InitResult> {
    let opkit_dir = base_dir.join(OPKIT_DIR_NAME);

    if opkit_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(opkit_dir).into());
    }

    fs::create_dir_all(&opkit_dir).await?;

    let config = match catalog_dir.map(str::trim) {
        Some(dir) => OpkitConfig::with_catalog_dir(dir),
        None => OpkitConfig::default(),
    };
    let config_file = opkit_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    tracing::info!(dir = %opkit_dir.display(), "Initialized opkit");

    Ok(InitResult {
        opkit_dir,
        config_file,
        catalog_dir: config.catalog_dir,
    })
}

/// Find the opkit root directory by searching up the directory tree.
///
/// Returns the directory containing `.opkit/`, or `None` if none is found
/// within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_opkit_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(OPKIT_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
