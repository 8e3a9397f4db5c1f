//! The `CustomResourceDefinition` document.

use crate::meta::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// The `kind` of a CRD document.
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// A custom resource definition shipped alongside a CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinition {
    /// API version (`apiextensions.k8s.io/v1` or `v1beta1`)
    #[serde(default)]
    pub api_version: String,

    /// Always `CustomResourceDefinition`
    #[serde(default)]
    pub kind: String,

    /// Object metadata; the name is `<plural>.<group>`
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Definition body
    #[serde(default)]
    pub spec: CrdSpec,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The `spec` block of a CRD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrdSpec {
    /// API group
    #[serde(default)]
    pub group: String,

    /// Resource naming
    #[serde(default)]
    pub names: CrdNames,

    /// `Namespaced` or `Cluster`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Single served version (v1beta1 style)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Served versions (v1 style)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<CrdVersion>,

    /// Fields not modelled above (validation schema, subresources...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The `spec.names` block of a CRD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdNames {
    /// Resource kind
    #[serde(default)]
    pub kind: String,

    /// Plural resource name
    #[serde(default)]
    pub plural: String,

    /// Singular resource name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,

    /// List kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_kind: Option<String>,

    /// Fields not modelled above (short names, categories)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of `spec.versions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrdVersion {
    /// Version name (`v1alpha1`, `v1`...)
    #[serde(default)]
    pub name: String,

    /// Whether the version is served
    #[serde(default)]
    pub served: bool,

    /// Whether this is the storage version
    #[serde(default)]
    pub storage: bool,

    /// Fields not modelled above (schema, printer columns)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CustomResourceDefinition {
    /// The CRD name (`metadata.name`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The name a CRD should have given its group and plural.
    #[must_use]
    pub fn expected_name(&self) -> String {
        format!("{}.{}", self.spec.names.plural, self.spec.group)
    }

    /// All served version names, whichever style the document uses.
    #[must_use]
    pub fn served_versions(&self) -> Vec<&str> {
        if self.spec.versions.is_empty() {
            self.spec.version.as_deref().into_iter().collect()
        } else {
            self.spec
                .versions
                .iter()
                .filter(|v| v.served)
                .map(|v| v.name.as_str())
                .collect()
        }
    }
}
