//! Static operator index.
//!
//! A catalog directory holds one subdirectory per package, each in the
//! layout accepted by [`crate::import::load_package_dir`]. The index is
//! loaded once and answers `list`, `get` and `search` queries.
//!
//! # Example
//!
//! ```no_run
//! use opkit::catalog::open_catalog;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let (index, _warnings) = open_catalog(Path::new("catalog")).await?;
//!     for entry in index.search("etcd").await? {
//!         println!("{} {}", entry.name, entry.head_version.unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

use crate::domain::Package;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod in_memory;

pub use in_memory::InMemoryIndex;

/// Read-only access to a set of operator packages.
///
/// Implementations must be `Send + Sync` so a single index can serve
/// concurrent lookups.
#[async_trait]
pub trait OperatorIndex: Send + Sync {
    /// All entries, sorted by package name.
    async fn list(&self) -> Result<Vec<CatalogEntry>>;

    /// One entry by exact package name.
    async fn get(&self, name: &str) -> Result<Option<CatalogEntry>>;

    /// Entries whose name, display name, keywords or provider contain
    /// `query`, ignoring case. An empty query matches everything.
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>>;
}

/// Summary of one channel in a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogChannel {
    /// Channel name
    pub name: String,
    /// Head CSV name
    pub head: String,
    /// Resolved versions, head first
    pub versions: Vec<String>,
    /// Whether this is the package default
    pub is_default: bool,
}

/// Summary of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Package name
    pub name: String,
    /// Display name of the head CSV, falling back to the package name
    pub display_name: String,
    /// Default channel, if any
    pub default_channel: Option<String>,
    /// Version at the head of the default channel
    pub head_version: Option<String>,
    /// Provider of the head CSV
    pub provider: Option<String>,
    /// Description of the head CSV
    pub description: Option<String>,
    /// Keywords of the head CSV
    pub keywords: Vec<String>,
    /// All channels
    pub channels: Vec<CatalogChannel>,
}

impl CatalogEntry {
    /// Summarize a package.
    ///
    /// Package-level details come from the head of the default channel, or
    /// of the first channel when no default is set.
    #[must_use]
    pub fn from_package(package: &Package) -> Self {
        let channel = package
            .default_channel()
            .or_else(|| package.channels().first());
        let head = channel.and_then(|c| package.record(c.head()));
        let spec = head.map(|r| &r.csv().spec);

        Self {
            name: package.name().to_string(),
            display_name: spec
                .and_then(|s| s.display_name.clone())
                .unwrap_or_else(|| package.name().to_string()),
            default_channel: package.default_channel().map(|c| c.name().to_string()),
            head_version: head.map(|r| r.version().to_string()),
            provider: head.and_then(|r| r.csv().provider_name()).map(str::to_string),
            description: spec.and_then(|s| s.description.clone()),
            keywords: spec.map(|s| s.keywords.clone()).unwrap_or_default(),
            channels: package
                .channels()
                .iter()
                .map(|c| CatalogChannel {
                    name: c.name().to_string(),
                    head: c.head().to_string(),
                    versions: c.versions().to_vec(),
                    is_default: c.is_default(),
                })
                .collect(),
        }
    }

    /// Case-insensitive match against name, display name, keywords and
    /// provider.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let contains = |field: &str| field.to_lowercase().contains(&query);

        contains(self.name.as_str())
            || contains(self.display_name.as_str())
            || self.keywords.iter().any(|k| contains(k.as_str()))
            || self.provider.as_deref().is_some_and(contains)
    }
}

/// A catalog package that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogWarning {
    /// Package directory
    pub path: PathBuf,
    /// Why it was skipped
    pub message: String,
}

/// Load the catalog rooted at `dir`.
///
/// Packages that fail to import are skipped and reported as warnings.
///
/// # Errors
///
/// Returns an error if `dir` cannot be read.
pub async fn open_catalog(dir: &Path) -> Result<(Box<dyn OperatorIndex>, Vec<CatalogWarning>)> {
    let (index, warnings) = InMemoryIndex::load(dir).await?;
    Ok((Box::new(index), warnings))
}
