//! Turning uploaded YAML files into a [`Package`].
//!
//! An upload is a set of YAML files, typically an operator bundle directory:
//!
//! ```text
//! etcd/
//!   etcd.package.yaml
//!   0.9.2/etcdoperator.v0.9.2.clusterserviceversion.yaml
//!   0.9.2/etcdclusters.etcd.database.coreos.com.crd.yaml
//!   0.9.4/...
//! ```
//!
//! File names carry no meaning: every document is classified by content.
//! Documents that are not packaging metadata are skipped with an
//! [`ImportWarning`] rather than failing the upload.

use crate::domain::{Package, VersionRecord};
use crate::error::{ImportError, Result};
use opkit_manifest::{
    parse_documents_lenient, ClusterServiceVersion, CustomResourceDefinition, Document,
    PackageManifest,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File extensions the importer reads.
pub const MANIFEST_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// A non-fatal problem found while importing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    /// A document in a file was skipped.
    Document {
        /// File the document came from
        path: PathBuf,
        /// Why it was skipped
        warning: opkit_manifest::Warning,
    },

    /// Two files define a CSV with the same name.
    ///
    /// **Effect**: the later file replaces the earlier definition.
    DuplicateCsv {
        /// The CSV name
        name: String,
        /// File whose definition was kept
        path: PathBuf,
    },

    /// A CRD could not be matched to any CSV.
    ///
    /// **Effect**: the CRD is dropped and will not be exported.
    OrphanedCrd {
        /// The CRD name
        name: String,
        /// File the CRD came from
        path: PathBuf,
    },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document { path, warning } => write!(f, "{}: {warning}", path.display()),
            Self::DuplicateCsv { name, path } => write!(
                f,
                "{}: CSV '{name}' was already defined, keeping this definition",
                path.display()
            ),
            Self::OrphanedCrd { name, path } => write!(
                f,
                "{}: CRD '{name}' is not owned by any CSV",
                path.display()
            ),
        }
    }
}

/// A package loaded from disk, with everything that was skipped on the way.
#[derive(Debug, Clone)]
pub struct ImportedPackage {
    /// The assembled, resolved and validated package
    pub package: Package,
    /// Problems that did not stop the import
    pub warnings: Vec<ImportWarning>,
}

/// Load every `*.yaml` / `*.yml` file below `dir`.
///
/// Files are read in sorted path order so that "later file wins" is
/// deterministic.
///
/// # Errors
///
/// Returns an error if the directory cannot be read, or under the same
/// conditions as [`load_files`].
pub async fn load_package_dir(dir: &Path) -> Result<ImportedPackage> {
    let files = collect_manifest_files(dir).await?;
    tracing::debug!(dir = %dir.display(), files = files.len(), "Collected manifest files");
    load_files(&files).await
}

async fn collect_manifest_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|source| ImportError::Unreadable {
                path: dir.clone(),
                source,
            })?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(path);
            } else if is_manifest_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Load an explicit list of files.
///
/// # Errors
///
/// Returns an error if:
/// - A file cannot be read
/// - No file contains a package manifest, or more than one does
pub async fn load_files(paths: &[PathBuf]) -> Result<ImportedPackage> {
    let mut warnings = Vec::new();
    let mut manifest: Option<(PathBuf, PackageManifest)> = None;
    let mut csvs: Vec<(PathBuf, ClusterServiceVersion)> = Vec::new();
    let mut crds: Vec<(PathBuf, CustomResourceDefinition)> = Vec::new();

    for path in paths {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ImportError::Unreadable {
                path: path.clone(),
                source,
            })?;

        let (documents, document_warnings) = parse_documents_lenient(&content);
        for warning in document_warnings {
            tracing::warn!(path = %path.display(), "{}", warning);
            warnings.push(ImportWarning::Document {
                path: path.clone(),
                warning,
            });
        }

        for document in documents {
            match document {
                Document::PackageManifest(found) => {
                    if let Some((first, _)) = &manifest {
                        return Err(ImportError::MultiplePackageManifests {
                            first: first.display().to_string(),
                            second: path.display().to_string(),
                        }
                        .into());
                    }
                    manifest = Some((path.clone(), found));
                }
                Document::ClusterServiceVersion(csv) => {
                    if let Some(index) = csvs.iter().position(|(_, c)| c.name() == csv.name()) {
                        tracing::warn!(csv = %csv.name(), path = %path.display(), "Duplicate CSV, later file wins");
                        warnings.push(ImportWarning::DuplicateCsv {
                            name: csv.name().to_string(),
                            path: path.clone(),
                        });
                        csvs.remove(index);
                    }
                    csvs.push((path.clone(), *csv));
                }
                Document::CustomResourceDefinition(crd) => crds.push((path.clone(), *crd)),
            }
        }
    }

    let (_, manifest) = manifest.ok_or(ImportError::MissingPackageManifest)?;

    let mut records: Vec<VersionRecord> = Vec::with_capacity(csvs.len());
    let mut origins: Vec<PathBuf> = Vec::with_capacity(csvs.len());
    for (path, csv) in csvs {
        origins.push(path);
        records.push(VersionRecord::from_csv(csv));
    }

    for (path, crd) in crds {
        match owner_index(&records, &origins, &crd, &path) {
            Some(index) => records[index].attach_crd(crd),
            None => {
                tracing::warn!(crd = %crd.name(), path = %path.display(), "CRD has no owning CSV");
                warnings.push(ImportWarning::OrphanedCrd {
                    name: crd.name().to_string(),
                    path,
                });
            }
        }
    }

    let package = Package::from_manifest(&manifest, records);
    tracing::info!(
        package = %package.name(),
        versions = package.records().len(),
        channels = package.channels().len(),
        warnings = warnings.len(),
        "Imported package"
    );

    Ok(ImportedPackage { package, warnings })
}

/// The record a CRD belongs to.
///
/// Among the CSVs that list it as owned, the one from the CRD's directory
/// wins, then the first owner. A CRD no CSV owns goes to the first CSV from
/// its directory.
fn owner_index(
    records: &[VersionRecord],
    origins: &[PathBuf],
    crd: &CustomResourceDefinition,
    crd_path: &Path,
) -> Option<usize> {
    let dir = crd_path.parent();
    let same_dir = |index: &usize| dir.is_some() && origins[*index].parent() == dir;

    let owners: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.csv().owned_crd_names().any(|name| name == crd.name()))
        .map(|(index, _)| index)
        .collect();

    owners
        .iter()
        .copied()
        .find(same_dir)
        .or_else(|| owners.first().copied())
        .or_else(|| (0..origins.len()).find(same_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    const PACKAGE: &str = "\
packageName: demo
channels:
  - name: stable
    currentCSV: demo.v1.1.0
defaultChannel: stable
";

    fn csv(name: &str, version: &str, replaces: Option<&str>) -> String {
        let mut yaml = format!(
            "apiVersion: operators.coreos.com/v1alpha1\n\
             kind: ClusterServiceVersion\n\
             metadata:\n  name: {name}\n\
             spec:\n  version: {version}\n  displayName: Demo\n"
        );
        if let Some(replaces) = replaces {
            yaml.push_str(&format!("  replaces: {replaces}\n"));
        }
        yaml
    }

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_is_manifest_file() {
        assert!(is_manifest_file(Path::new("a/b.yaml")));
        assert!(is_manifest_file(Path::new("b.YML")));
        assert!(!is_manifest_file(Path::new("README.md")));
        assert!(!is_manifest_file(Path::new("yaml")));
    }

    #[tokio::test]
    async fn test_load_package_dir_recurses() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "demo.package.yaml", PACKAGE);
        write(temp.path(), "1.0.0/csv.yaml", &csv("demo.v1.0.0", "1.0.0", None));
        write(
            temp.path(),
            "1.1.0/csv.yml",
            &csv("demo.v1.1.0", "1.1.0", Some("demo.v1.0.0")),
        );
        write(temp.path(), "notes.txt", "not yaml");

        let imported = load_package_dir(temp.path()).await.unwrap();

        assert!(imported.warnings.is_empty());
        let stable = imported.package.channel("stable").unwrap();
        assert!(stable.is_default());
        assert_eq!(stable.versions(), ["1.1.0", "1.0.0"]);
    }

    #[tokio::test]
    async fn test_missing_package_manifest() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "csv.yaml", &csv("demo.v1.0.0", "1.0.0", None));

        let result = load_files(&[path]).await;
        assert!(matches!(
            result,
            Err(Error::Import(ImportError::MissingPackageManifest))
        ));
    }

    #[tokio::test]
    async fn test_multiple_package_manifests() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.yaml", PACKAGE);
        let b = write(temp.path(), "b.yaml", PACKAGE);

        let result = load_files(&[a, b]).await;
        assert!(matches!(
            result,
            Err(Error::Import(ImportError::MultiplePackageManifests { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_file() {
        let temp = TempDir::new().unwrap();
        let result = load_files(&[temp.path().join("missing.yaml")]).await;

        assert!(matches!(
            result,
            Err(Error::Import(ImportError::Unreadable { .. }))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_csv_later_file_wins() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "package.yaml", PACKAGE);
        let first = write(temp.path(), "a.yaml", &csv("demo.v1.1.0", "1.1.0", None));
        let second = write(
            temp.path(),
            "b.yaml",
            &csv("demo.v1.1.0", "1.1.1", Some("demo.v1.0.0")),
        );

        let imported = load_files(&[manifest, first, second.clone()]).await.unwrap();

        assert_eq!(imported.package.records().len(), 1);
        assert_eq!(imported.package.records()[0].version(), "1.1.1");
        assert_eq!(
            imported.warnings,
            vec![ImportWarning::DuplicateCsv {
                name: "demo.v1.1.0".to_string(),
                path: second,
            }]
        );
    }

    #[tokio::test]
    async fn test_unsupported_documents_become_warnings() {
        let temp = TempDir::new().unwrap();
        let content = format!(
            "{PACKAGE}---\napiVersion: v1\nkind: ServiceAccount\nmetadata:\n  name: demo\n---\n{}",
            csv("demo.v1.1.0", "1.1.0", None)
        );
        let path = write(temp.path(), "all.yaml", &content);

        let imported = load_files(&[path]).await.unwrap();

        assert_eq!(imported.package.records().len(), 1);
        assert_eq!(imported.warnings.len(), 1);
        assert!(imported.warnings[0].to_string().contains("ServiceAccount"));
    }
}
