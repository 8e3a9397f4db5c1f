//! Multi-document YAML parsing and rendering.
//!
//! Documents are classified by their `kind` field. Package manifests have no
//! `kind`; they are recognised by a top-level `packageName`.

use crate::crd::{CustomResourceDefinition, CRD_KIND};
use crate::csv::{ClusterServiceVersion, CSV_KIND};
use crate::error::{Error, Result};
use crate::package::PackageManifest;
use crate::warning::Warning;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;

/// The document kinds this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// An operator release
    ClusterServiceVersion,
    /// A CRD shipped with a release
    CustomResourceDefinition,
    /// The package/channel manifest
    PackageManifest,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClusterServiceVersion => write!(f, "{CSV_KIND}"),
            Self::CustomResourceDefinition => write!(f, "{CRD_KIND}"),
            Self::PackageManifest => write!(f, "PackageManifest"),
        }
    }
}

/// A parsed packaging document.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// An operator release
    ClusterServiceVersion(Box<ClusterServiceVersion>),
    /// A CRD shipped with a release
    CustomResourceDefinition(Box<CustomResourceDefinition>),
    /// The package/channel manifest
    PackageManifest(PackageManifest),
}

impl Document {
    /// The kind of this document.
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::ClusterServiceVersion(_) => DocumentKind::ClusterServiceVersion,
            Self::CustomResourceDefinition(_) => DocumentKind::CustomResourceDefinition,
            Self::PackageManifest(_) => DocumentKind::PackageManifest,
        }
    }

    /// The identifying name: object name, or package name for manifests.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ClusterServiceVersion(csv) => csv.name(),
            Self::CustomResourceDefinition(crd) => crd.name(),
            Self::PackageManifest(pkg) => &pkg.package_name,
        }
    }

    /// Render the document back to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        match self {
            Self::ClusterServiceVersion(csv) => to_yaml(csv.as_ref()),
            Self::CustomResourceDefinition(crd) => to_yaml(crd.as_ref()),
            Self::PackageManifest(pkg) => to_yaml(pkg),
        }
    }
}

/// Determine the kind of a raw YAML document.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for anything that is not packaging
/// metadata and [`Error::InvalidDocument`] for non-mapping documents.
pub fn classify(value: &Value) -> Result<DocumentKind> {
    let Value::Mapping(map) = value else {
        return Err(Error::InvalidDocument(
            "expected a mapping at the top level".to_string(),
        ));
    };

    match map.get("kind").and_then(Value::as_str) {
        Some(CSV_KIND) => Ok(DocumentKind::ClusterServiceVersion),
        Some(CRD_KIND) => Ok(DocumentKind::CustomResourceDefinition),
        Some(other) => Err(Error::UnsupportedKind(other.to_string())),
        None if map.contains_key("packageName") => Ok(DocumentKind::PackageManifest),
        None => Err(Error::UnsupportedKind("<none>".to_string())),
    }
}

fn decode(value: Value) -> Result<Document> {
    let document = match classify(&value)? {
        DocumentKind::ClusterServiceVersion => {
            Document::ClusterServiceVersion(Box::new(serde_yaml::from_value(value)?))
        }
        DocumentKind::CustomResourceDefinition => {
            Document::CustomResourceDefinition(Box::new(serde_yaml::from_value(value)?))
        }
        DocumentKind::PackageManifest => Document::PackageManifest(serde_yaml::from_value(value)?),
    };
    Ok(document)
}

/// Walk every document of a stream, handing each outcome to `visit`.
///
/// Empty documents (a stray `---`) are skipped. Iteration stops after a YAML
/// syntax error.
fn walk<F>(text: &str, mut visit: F)
where
    F: FnMut(usize, Result<Document>),
{
    for (index, de) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = match Value::deserialize(de) {
            Ok(Value::Null) => continue,
            Ok(value) => value,
            Err(e) => {
                visit(index, Err(Error::Yaml(e)));
                break;
            }
        };
        visit(index, decode(value));
    }
}

/// Parse every document of a YAML stream, failing on the first problem.
///
/// # Errors
///
/// Returns the first YAML, shape, or unsupported-kind error encountered.
pub fn parse_documents(text: &str) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    let mut first_error = None;

    walk(text, |_, outcome| match outcome {
        Ok(doc) => documents.push(doc),
        Err(e) => {
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    });

    match first_error {
        Some(e) => Err(e),
        None => Ok(documents),
    }
}

/// Parse a YAML stream, skipping documents that cannot be used.
///
/// Returns the usable documents together with a warning for each skipped one.
#[must_use]
pub fn parse_documents_lenient(text: &str) -> (Vec<Document>, Vec<Warning>) {
    let mut documents = Vec::new();
    let mut warnings = Vec::new();

    walk(text, |index, outcome| match outcome {
        Ok(doc) => documents.push(doc),
        Err(Error::UnsupportedKind(kind)) => {
            tracing::debug!(index, kind = %kind, "Skipping unsupported document");
            warnings.push(Warning::UnsupportedKind { index, kind });
        }
        Err(e) => {
            tracing::warn!(index, error = %e, "Skipping malformed document");
            warnings.push(Warning::MalformedDocument {
                index,
                error: e.to_string(),
            });
        }
    });

    (documents, warnings)
}

/// Render any serializable document as YAML.
///
/// # Errors
///
/// Returns [`Error::Yaml`] if serialization fails.
pub fn to_yaml<T: Serialize + ?Sized>(document: &T) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_package_manifest_without_kind() {
        let value: Value = serde_yaml::from_str("packageName: demo\nchannels: []\n").unwrap();
        assert_eq!(classify(&value).unwrap(), DocumentKind::PackageManifest);
    }

    #[test]
    fn test_classify_rejects_scalars() {
        let value: Value = serde_yaml::from_str("just text").unwrap();
        assert!(matches!(classify(&value), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_classify_unknown_kind() {
        let value: Value = serde_yaml::from_str("kind: Deployment\n").unwrap();
        match classify(&value) {
            Err(Error::UnsupportedKind(kind)) => assert_eq!(kind, "Deployment"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_empty_documents_are_skipped() {
        let docs = parse_documents("---\n---\npackageName: demo\n---\n").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name(), "demo");
    }
}
