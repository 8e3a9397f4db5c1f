//! Bundle export and YAML preview.
//!
//! A bundle is a zip archive laid out the way operator registries expect:
//!
//! ```text
//! <package>/<package>.package.yaml
//! <package>/<version>/<csv-name>.clusterserviceversion.yaml
//! <package>/<version>/<crd-name>.crd.yaml
//! ```
//!
//! Only published records, those reachable from at least one channel, are
//! written.

use crate::domain::{Package, VersionRecord};
use crate::error::{ExportError, Result};
use crate::range::parse_version;
use crate::validation::fields::validate_object_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Annotation stamped with the export time when a CSV does not carry one.
pub const CREATED_AT_ANNOTATION: &str = "createdAt";

/// Compression used for archive entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression
    Stored,
    /// Deflate
    #[default]
    Deflated,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Self::Stored => CompressionMethod::Stored,
            Self::Deflated => CompressionMethod::Deflated,
        }
    }
}

/// Knobs for [`build_bundle`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Entry compression
    pub compression: Compression,
    /// Value written to missing `createdAt` annotations
    pub timestamp: DateTime<Utc>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            timestamp: Utc::now(),
        }
    }
}

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleSummary {
    /// Archive location, when written to disk
    pub path: Option<PathBuf>,
    /// Archive entries in write order
    pub entries: Vec<String>,
    /// Archive size in bytes
    pub size: usize,
    /// Hex SHA-256 of the archive
    pub sha256: String,
}

/// A finished archive held in memory.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Raw zip bytes
    pub bytes: Vec<u8>,
    /// Summary of the contents
    pub summary: BundleSummary,
}

/// Default archive file name for a package.
#[must_use]
pub fn bundle_file_name(package: &Package) -> String {
    format!("{}.zip", package.name())
}

/// The YAML a user downloads for a single CSV.
///
/// # Errors
///
/// Returns an error if the CSV cannot be serialized.
pub fn render_preview(record: &VersionRecord) -> Result<String> {
    Ok(opkit_manifest::to_yaml(record.csv())?)
}

/// Build the bundle archive in memory.
///
/// # Errors
///
/// Returns [`ExportError::NothingToExport`] when no channel resolves to any
/// record, [`ExportError::UnsafeEntryName`] when a published version, CSV or
/// CRD name cannot be used as a path segment, or an archive/serialization
/// error.
pub fn build_bundle(package: &Package, options: &ExportOptions) -> Result<Bundle> {
    let published = package.published_records();
    if published.is_empty() {
        return Err(ExportError::NothingToExport(package.name().to_string()).into());
    }

    let root = package.name();
    check_object_name("package", root)?;
    for record in &published {
        if parse_version(record.version()).is_none() {
            return Err(ExportError::UnsafeEntryName {
                kind: "version",
                name: record.version().to_string(),
            }
            .into());
        }
        check_object_name("CSV", record.name())?;
        for crd in record.crds() {
            check_object_name("CRD", crd.name())?;
        }
    }

    let file_options = SimpleFileOptions::default().compression_method(options.compression.method());
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::new();

    let mut add = |name: String, content: String| -> Result<()> {
        writer
            .start_file(name.as_str(), file_options)
            .map_err(ExportError::from)?;
        writer.write_all(content.as_bytes())?;
        entries.push(name);
        Ok(())
    };

    add(
        format!("{root}/{root}.package.yaml"),
        opkit_manifest::to_yaml(&package.to_manifest())?,
    )?;

    let created_at = options.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    for record in &published {
        let version_dir = format!("{root}/{}", record.version());

        let mut csv = record.csv().clone();
        if csv.metadata.annotation(CREATED_AT_ANNOTATION).is_none() {
            csv.metadata
                .set_annotation(CREATED_AT_ANNOTATION, created_at.clone());
        }
        add(
            format!("{version_dir}/{}.clusterserviceversion.yaml", record.name()),
            opkit_manifest::to_yaml(&csv)?,
        )?;

        for crd in record.crds() {
            add(
                format!("{version_dir}/{}.crd.yaml", crd.name()),
                opkit_manifest::to_yaml(crd)?,
            )?;
        }
    }

    let bytes = writer.finish().map_err(ExportError::from)?.into_inner();
    let sha256 = format!("{:x}", Sha256::digest(&bytes));

    tracing::debug!(
        package = %package.name(),
        entries = entries.len(),
        size = bytes.len(),
        "Built bundle"
    );

    Ok(Bundle {
        summary: BundleSummary {
            path: None,
            entries,
            size: bytes.len(),
            sha256,
        },
        bytes,
    })
}

/// Entry paths are built from names; only DNS-1123 names are allowed in.
fn check_object_name(kind: &'static str, name: &str) -> Result<()> {
    validate_object_name("metadata.name", name).map_err(|_| {
        ExportError::UnsafeEntryName {
            kind,
            name: name.to_string(),
        }
        .into()
    })
}

/// Build the bundle and write it to `output`.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the bundle cannot be built or the file cannot be
/// written.
pub async fn export_bundle(
    package: &Package,
    output: &Path,
    options: &ExportOptions,
) -> Result<BundleSummary> {
    let Bundle { bytes, mut summary } = build_bundle(package, options)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, &bytes).await?;

    tracing::info!(package = %package.name(), path = %output.display(), "Exported bundle");
    summary.path = Some(output.to_path_buf());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;
    use opkit_manifest::CustomResourceDefinition;
    use std::io::Read;

    fn options(compression: Compression) -> ExportOptions {
        ExportOptions {
            compression,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    fn crd(name: &str) -> CustomResourceDefinition {
        serde_yaml::from_str(&format!(
            "apiVersion: apiextensions.k8s.io/v1\nkind: CustomResourceDefinition\nmetadata:\n  name: {name}\n"
        ))
        .unwrap()
    }

    fn package() -> Package {
        let mut package = Package::new("demo");
        package
            .add_version(VersionRecord::new("demo.v1.0.0", "1.0.0").with_crd(crd("widgets.demo.io")))
            .unwrap();
        package
            .add_version(VersionRecord::new("demo.v1.1.0", "1.1.0").with_replaces("demo.v1.0.0"))
            .unwrap();
        package
            .add_version(VersionRecord::new("demo.v9.0.0", "9.0.0"))
            .unwrap();
        package.add_channel("stable", "demo.v1.1.0").unwrap();
        package
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_bundle_layout_skips_unpublished() {
        let bundle = build_bundle(&package(), &options(Compression::Stored)).unwrap();

        assert_eq!(
            bundle.summary.entries,
            vec![
                "demo/demo.package.yaml",
                "demo/1.0.0/demo.v1.0.0.clusterserviceversion.yaml",
                "demo/1.0.0/widgets.demo.io.crd.yaml",
                "demo/1.1.0/demo.v1.1.0.clusterserviceversion.yaml",
            ]
        );
        assert_eq!(bundle.summary.size, bundle.bytes.len());
        assert_eq!(bundle.summary.sha256.len(), 64);
    }

    #[test]
    fn test_bundle_contents() {
        let bundle = build_bundle(&package(), &options(Compression::Stored)).unwrap();

        let manifest = read_entry(&bundle.bytes, "demo/demo.package.yaml");
        assert!(manifest.contains("packageName: demo"));
        assert!(manifest.contains("currentCSV: demo.v1.1.0"));

        let csv = read_entry(
            &bundle.bytes,
            "demo/1.1.0/demo.v1.1.0.clusterserviceversion.yaml",
        );
        assert!(csv.contains("replaces: demo.v1.0.0"));
        assert!(csv.contains(CREATED_AT_ANNOTATION));
        assert!(csv.contains("2024-01-02T03:04:05Z"));
    }

    #[test]
    fn test_existing_created_at_is_kept() {
        let mut package = package();
        let mut record = package.remove_version("demo.v1.1.0").unwrap();
        let mut csv = record.csv().clone();
        csv.metadata.set_annotation(CREATED_AT_ANNOTATION, "2020-05-05");
        record = VersionRecord::from_csv(csv);
        package.add_version(record).unwrap();

        let bundle = build_bundle(&package, &options(Compression::Stored)).unwrap();
        let csv = read_entry(
            &bundle.bytes,
            "demo/1.1.0/demo.v1.1.0.clusterserviceversion.yaml",
        );
        assert!(csv.contains("2020-05-05"));
        assert!(!csv.contains("2024-01-02"));
    }

    #[test]
    fn test_deflated_entries() {
        let bundle = build_bundle(&package(), &options(Compression::Deflated)).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        let file = archive.by_name("demo/demo.package.yaml").unwrap();

        assert_eq!(file.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_nothing_to_export() {
        let mut package = Package::new("empty");
        package
            .add_version(VersionRecord::new("empty.v1.0.0", "1.0.0"))
            .unwrap();

        let result = build_bundle(&package, &ExportOptions::default());
        assert!(matches!(
            result,
            Err(Error::Export(ExportError::NothingToExport(name))) if name == "empty"
        ));
    }

    #[test]
    fn test_version_that_escapes_archive_is_rejected() {
        let package = Package::from_parts(
            "demo",
            vec![VersionRecord::new("demo.evil", "../../escape")],
            vec![crate::domain::Channel::new("stable", "demo.evil")],
        );
        assert_eq!(package.published_records().len(), 1);

        let result = build_bundle(&package, &options(Compression::Stored));
        assert!(matches!(
            result,
            Err(Error::Export(ExportError::UnsafeEntryName { kind: "version", name }))
                if name == "../../escape"
        ));
    }

    #[test]
    fn test_unsafe_csv_and_crd_names_are_rejected() {
        let package = Package::from_parts(
            "demo",
            vec![VersionRecord::new("../demo", "1.0.0")],
            vec![crate::domain::Channel::new("stable", "../demo")],
        );
        assert!(matches!(
            build_bundle(&package, &options(Compression::Stored)),
            Err(Error::Export(ExportError::UnsafeEntryName { kind: "CSV", .. }))
        ));

        let package = Package::from_parts(
            "demo",
            vec![VersionRecord::new("demo.v1.0.0", "1.0.0").with_crd(crd("../../widgets"))],
            vec![crate::domain::Channel::new("stable", "demo.v1.0.0")],
        );
        assert!(matches!(
            build_bundle(&package, &options(Compression::Stored)),
            Err(Error::Export(ExportError::UnsafeEntryName { kind: "CRD", .. }))
        ));
    }

    #[test]
    fn test_render_preview() {
        let record = VersionRecord::new("demo.v2.0.0", "2.0.0")
            .with_replaces("demo.v1.0.0")
            .with_skip_range("<2.0.0");
        let yaml = render_preview(&record).unwrap();

        assert!(yaml.contains("kind: ClusterServiceVersion"));
        assert!(yaml.contains("name: demo.v2.0.0"));
        assert!(yaml.contains("olm.skipRange"));
        assert!(yaml.contains("<2.0.0"));
        assert!(yaml.contains("replaces: demo.v1.0.0"));
    }

    #[tokio::test]
    async fn test_export_bundle_writes_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("out").join("demo.zip");

        let summary = export_bundle(&package(), &output, &options(Compression::Deflated))
            .await
            .unwrap();

        assert_eq!(summary.path.as_deref(), Some(output.as_path()));
        let written = std::fs::read(&output).unwrap();
        assert_eq!(written.len(), summary.size);
    }
}
