//! In-memory operator index.

use super::{CatalogEntry, CatalogWarning, OperatorIndex};
use crate::domain::Package;
use crate::error::{ImportError, Result};
use crate::import;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// Operator index held entirely in memory, keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    entries: BTreeMap<String, CatalogEntry>,
}

impl InMemoryIndex {
    /// Build an index from packages. A later package replaces an earlier
    /// one with the same name.
    pub fn from_packages<'a>(packages: impl IntoIterator<Item = &'a Package>) -> Self {
        let entries = packages
            .into_iter()
            .map(|p| (p.name().to_string(), CatalogEntry::from_package(p)))
            .collect();
        Self { entries }
    }

    /// Load every package directory directly below `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be read.
    pub async fn load(dir: &Path) -> Result<(Self, Vec<CatalogWarning>)> {
        let mut read_dir = fs::read_dir(dir)
            .await
            .map_err(|source| ImportError::Unreadable {
                path: dir.to_path_buf(),
                source,
            })?;

        let mut package_dirs = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                package_dirs.push(entry.path());
            }
        }
        package_dirs.sort();

        let mut index = Self::default();
        let mut warnings = Vec::new();
        for path in package_dirs {
            match import::load_package_dir(&path).await {
                Ok(imported) => {
                    let entry = CatalogEntry::from_package(&imported.package);
                    index.entries.insert(entry.name.clone(), entry);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping catalog package");
                    warnings.push(CatalogWarning {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            packages = index.len(),
            skipped = warnings.len(),
            "Loaded operator catalog"
        );
        Ok((index, warnings))
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl OperatorIndex for InMemoryIndex {
    async fn list(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.values().cloned().collect())
    }

    async fn get(&self, name: &str) -> Result<Option<CatalogEntry>> {
        Ok(self.entries.get(name).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .entries
            .values()
            .filter(|entry| entry.matches(query))
            .cloned()
            .collect())
    }
}
