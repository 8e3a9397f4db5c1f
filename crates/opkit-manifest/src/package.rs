//! The package manifest document.

use serde::{Deserialize, Serialize};

/// A package manifest: the package name and its channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name
    #[serde(default)]
    pub package_name: String,

    /// Upgrade channels
    #[serde(default)]
    pub channels: Vec<PackageChannel>,

    /// Channel used when a subscription names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,
}

/// A channel entry of a package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageChannel {
    /// Channel name
    #[serde(default)]
    pub name: String,

    /// Name of the CSV at the head of the channel
    #[serde(rename = "currentCSV", default)]
    pub current_csv: String,
}

impl PackageManifest {
    /// Look up a channel by name.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&PackageChannel> {
        self.channels.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_csv_field_name() {
        let pkg: PackageManifest = serde_yaml::from_str(
            "packageName: etcd\nchannels:\n  - name: alpha\n    currentCSV: etcdoperator.v0.9.4\n",
        )
        .unwrap();

        assert_eq!(pkg.package_name, "etcd");
        assert_eq!(
            pkg.channel("alpha").map(|c| c.current_csv.as_str()),
            Some("etcdoperator.v0.9.4")
        );
        assert_eq!(pkg.default_channel, None);

        let rendered = serde_yaml::to_string(&pkg).unwrap();
        assert!(rendered.contains("currentCSV: etcdoperator.v0.9.4"));
        assert!(!rendered.contains("defaultChannel"));
    }
}
