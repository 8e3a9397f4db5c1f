//! Kubernetes object metadata shared by every document kind.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// The `metadata` block of a Kubernetes object.
///
/// Annotation values are kept as raw YAML values because manifests in the
/// wild regularly carry unquoted booleans and numbers there (for example
/// `certified: false`). Use [`ObjectMeta::annotation`] to read one as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name
    #[serde(default)]
    pub name: String,

    /// Namespace, rarely set on packaging manifests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Free-form annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Value>,

    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, Value>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ObjectMeta {
    /// Create metadata carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Read an annotation as text.
    ///
    /// Scalar values are rendered the way they appear in YAML; sequences and
    /// mappings yield `None`.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<String> {
        self.annotations.get(key).and_then(scalar_to_string)
    }

    /// Set (or replace) an annotation.
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations
            .insert(key.into(), Value::String(value.into()));
    }

    /// Remove an annotation, returning whether it was present.
    pub fn remove_annotation(&mut self, key: &str) -> bool {
        self.annotations.remove(key).is_some()
    }
}

/// Render a scalar YAML value as a string.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
