//! The `ClusterServiceVersion` document.
//!
//! A CSV describes a single operator release. For update-graph purposes only
//! four things matter: its name, its version, the release it `replaces`, and
//! the releases it skips (explicitly via `spec.skips` or implicitly via the
//! `olm.skipRange` annotation).

use crate::meta::{scalar_to_string, ObjectMeta};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// API version written on newly created CSVs.
pub const CSV_API_VERSION: &str = "operators.coreos.com/v1alpha1";

/// The `kind` of a CSV document.
pub const CSV_KIND: &str = "ClusterServiceVersion";

/// Annotation carrying the skip range expression.
pub const SKIP_RANGE_ANNOTATION: &str = "olm.skipRange";

/// Install modes OLM understands.
pub const INSTALL_MODE_TYPES: [&str; 4] =
    ["OwnNamespace", "SingleNamespace", "MultiNamespace", "AllNamespaces"];

fn default_api_version() -> String {
    CSV_API_VERSION.to_string()
}

fn default_kind() -> String {
    CSV_KIND.to_string()
}

/// An operator release manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersion {
    /// API version, normally `operators.coreos.com/v1alpha1`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Always `ClusterServiceVersion`
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Release description
    #[serde(default)]
    pub spec: CsvSpec,

    /// Fields not modelled above (for example `status`)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The `spec` block of a CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvSpec {
    /// Human readable operator name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Long-form description (markdown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Semantic version of this release
    #[serde(
        default,
        deserialize_with = "scalar_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Name of the CSV this release directly supersedes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,

    /// Names of CSVs that may be jumped over when upgrading to this release
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skips: Vec<String>,

    /// Skip range placed in the spec instead of the annotation
    #[serde(
        rename = "olm.skipRange",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub skip_range: Option<String>,

    /// Search keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Maturity level (alpha, beta, stable...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity: Option<String>,

    /// Publisher of the operator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,

    /// Maintainer contacts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<Maintainer>,

    /// Supported install modes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install_modes: Vec<InstallMode>,

    /// Owned and required CRDs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customresourcedefinitions: Option<CrdDescriptions>,

    /// Minimum Kubernetes version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_kube_version: Option<String>,

    /// Fields not modelled above (install strategy, icon, links...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Operator publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Publisher name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Publisher website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A maintainer contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    /// Name
    #[serde(default)]
    pub name: String,

    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One entry of `spec.installModes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallMode {
    /// Mode name, one of [`INSTALL_MODE_TYPES`]
    #[serde(rename = "type")]
    pub mode: String,

    /// Whether the operator supports this mode
    #[serde(default)]
    pub supported: bool,
}

/// The `spec.customresourcedefinitions` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrdDescriptions {
    /// CRDs shipped and reconciled by this operator
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owned: Vec<CrdDescription>,

    /// CRDs this operator needs from other operators
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<CrdDescription>,
}

/// Description of a single CRD referenced by a CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdDescription {
    /// Full CRD name (`<plural>.<group>`)
    #[serde(default)]
    pub name: String,

    /// Served API version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Resource kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Human readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields not modelled above (descriptors, resources...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Accept `version: 1.0` (a YAML float) as well as `version: "1.0.0"`.
fn scalar_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

impl ClusterServiceVersion {
    /// Create a minimal CSV with a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::named(name),
            spec: CsvSpec {
                version: Some(version.into()),
                ..CsvSpec::default()
            },
            extra: BTreeMap::new(),
        }
    }

    /// The CSV name (`metadata.name`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The release version, if set.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.spec.version.as_deref()
    }

    /// The directly superseded CSV, ignoring empty strings.
    #[must_use]
    pub fn replaces(&self) -> Option<&str> {
        self.spec
            .replaces
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Explicitly skipped CSV names.
    #[must_use]
    pub fn skips(&self) -> &[String] {
        &self.spec.skips
    }

    /// The skip range expression.
    ///
    /// OLM reads it from the `olm.skipRange` annotation; some hand-written
    /// manifests put it in the spec instead, which is used as a fallback.
    #[must_use]
    pub fn skip_range(&self) -> Option<String> {
        self.metadata
            .annotation(SKIP_RANGE_ANNOTATION)
            .or_else(|| self.spec.skip_range.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Human readable name, falling back to the CSV name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.spec
            .display_name
            .as_deref()
            .unwrap_or(&self.metadata.name)
    }

    /// Provider name, if any.
    #[must_use]
    pub fn provider_name(&self) -> Option<&str> {
        self.spec.provider.as_ref().and_then(|p| p.name.as_deref())
    }

    /// Names of the CRDs this release owns.
    pub fn owned_crd_names(&self) -> impl Iterator<Item = &str> {
        self.spec
            .customresourcedefinitions
            .iter()
            .flat_map(|crds| crds.owned.iter())
            .map(|crd| crd.name.as_str())
    }

    /// Set or clear `spec.replaces`.
    pub fn set_replaces(&mut self, replaces: Option<String>) {
        self.spec.replaces = replaces;
    }

    /// Replace `spec.skips`.
    pub fn set_skips(&mut self, skips: Vec<String>) {
        self.spec.skips = skips;
    }

    /// Set or clear the skip range.
    ///
    /// The value is always written to the annotation and any spec-level
    /// copy is dropped, so there is a single source of truth afterwards.
    pub fn set_skip_range(&mut self, range: Option<String>) {
        self.spec.skip_range = None;
        match range {
            Some(range) => self.metadata.set_annotation(SKIP_RANGE_ANNOTATION, range),
            None => {
                self.metadata.remove_annotation(SKIP_RANGE_ANNOTATION);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETCD_CSV: &str = r#"
apiVersion: operators.coreos.com/v1alpha1
kind: ClusterServiceVersion
metadata:
  name: etcdoperator.v0.9.4
  annotations:
    olm.skipRange: ">=0.9.0 <0.9.4"
    capabilities: Full Lifecycle
spec:
  displayName: etcd
  version: 0.9.4
  replaces: etcdoperator.v0.9.2
  skips:
    - etcdoperator.v0.9.3
  provider:
    name: CNCF
  installModes:
    - type: OwnNamespace
      supported: true
  customresourcedefinitions:
    owned:
      - name: etcdclusters.etcd.database.coreos.com
        version: v1beta2
        kind: EtcdCluster
  install:
    strategy: deployment
"#;

    #[test]
    fn test_parse_graph_fields() {
        let csv: ClusterServiceVersion = serde_yaml::from_str(ETCD_CSV).unwrap();

        assert_eq!(csv.name(), "etcdoperator.v0.9.4");
        assert_eq!(csv.version(), Some("0.9.4"));
        assert_eq!(csv.replaces(), Some("etcdoperator.v0.9.2"));
        assert_eq!(csv.skips(), ["etcdoperator.v0.9.3".to_string()]);
        assert_eq!(csv.skip_range().as_deref(), Some(">=0.9.0 <0.9.4"));
        assert_eq!(csv.provider_name(), Some("CNCF"));
        assert_eq!(
            csv.owned_crd_names().collect::<Vec<_>>(),
            vec!["etcdclusters.etcd.database.coreos.com"]
        );
        assert!(csv.spec.extra.contains_key("install"));
    }

    #[test]
    fn test_skip_range_falls_back_to_spec() {
        let csv: ClusterServiceVersion = serde_yaml::from_str(
            "metadata:\n  name: a.v2.0.0\nspec:\n  version: 2.0.0\n  olm.skipRange: '<2.0.0'\n",
        )
        .unwrap();

        assert_eq!(csv.skip_range().as_deref(), Some("<2.0.0"));
    }

    #[test]
    fn test_numeric_version_is_accepted() {
        let csv: ClusterServiceVersion =
            serde_yaml::from_str("metadata:\n  name: a\nspec:\n  version: 1.5\n").unwrap();

        assert_eq!(csv.version(), Some("1.5"));
    }

    #[test]
    fn test_empty_replaces_is_none() {
        let mut csv = ClusterServiceVersion::new("a.v1.0.0", "1.0.0");
        csv.set_replaces(Some("  ".to_string()));
        assert_eq!(csv.replaces(), None);
    }

    #[test]
    fn test_set_skip_range_moves_value_to_annotation() {
        let mut csv = ClusterServiceVersion::new("a.v2.0.0", "2.0.0");
        csv.spec.skip_range = Some("<1.0.0".to_string());

        csv.set_skip_range(Some("<2.0.0".to_string()));
        assert_eq!(csv.spec.skip_range, None);
        assert_eq!(
            csv.metadata.annotation(SKIP_RANGE_ANNOTATION).as_deref(),
            Some("<2.0.0")
        );

        csv.set_skip_range(None);
        assert_eq!(csv.skip_range(), None);
    }

    #[test]
    fn test_new_defaults_api_version_and_kind() {
        let csv = ClusterServiceVersion::new("a.v1.0.0", "1.0.0");
        assert_eq!(csv.api_version, CSV_API_VERSION);
        assert_eq!(csv.kind, CSV_KIND);
        assert_eq!(csv.display_name(), "a.v1.0.0");
    }
}
