//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the opkit binary built for this test run
pub fn opkit_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_opkit"))
}

/// Run the opkit binary in the specified directory
pub fn run_opkit_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(opkit_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute opkit binary")
}

/// Write `content` to `dir/relative`, creating parent directories
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(&path, content).expect("Failed to write fixture file");
    path
}

/// Relations of a fixture CSV.
#[derive(Default)]
pub struct Relations<'a> {
    pub replaces: Option<&'a str>,
    pub skips: &'a [&'a str],
    pub skip_range: Option<&'a str>,
    pub owned_crds: &'a [&'a str],
}

/// A CSV document that passes every field check
pub fn csv_yaml(package: &str, version: &str, relations: &Relations<'_>) -> String {
    let mut yaml = format!(
        "apiVersion: operators.coreos.com/v1alpha1\n\
         kind: ClusterServiceVersion\n\
         metadata:\n  name: {package}.v{version}\n"
    );
    if let Some(range) = relations.skip_range {
        yaml.push_str(&format!("  annotations:\n    olm.skipRange: '{range}'\n"));
    }
    yaml.push_str(&format!(
        "spec:\n  version: {version}\n  displayName: {package} operator\n  \
         description: Manages {package} clusters\n  \
         keywords: [database]\n  \
         provider:\n    name: Example Inc\n  \
         installModes:\n    - type: AllNamespaces\n      supported: true\n"
    ));
    if let Some(replaces) = relations.replaces {
        yaml.push_str(&format!("  replaces: {replaces}\n"));
    }
    if !relations.skips.is_empty() {
        yaml.push_str("  skips:\n");
        for skip in relations.skips {
            yaml.push_str(&format!("    - {skip}\n"));
        }
    }
    if !relations.owned_crds.is_empty() {
        yaml.push_str("  customresourcedefinitions:\n    owned:\n");
        for crd in relations.owned_crds {
            yaml.push_str(&format!("      - name: {crd}\n        version: v1\n"));
        }
    }
    yaml
}

/// A CRD document named `<plural>.<group>`
pub fn crd_yaml(plural: &str, group: &str, kind: &str) -> String {
    format!(
        "apiVersion: apiextensions.k8s.io/v1\n\
         kind: CustomResourceDefinition\n\
         metadata:\n  name: {plural}.{group}\n\
         spec:\n  group: {group}\n  scope: Namespaced\n  \
         names:\n    kind: {kind}\n    plural: {plural}\n  \
         versions:\n    - name: v1\n      served: true\n      storage: true\n"
    )
}

/// A package manifest with `(channel, head)` pairs; the first is the default
pub fn package_yaml(package: &str, channels: &[(&str, &str)]) -> String {
    let mut yaml = format!("packageName: {package}\nchannels:\n");
    for (name, head) in channels {
        yaml.push_str(&format!("  - name: {name}\n    currentCSV: {head}\n"));
    }
    if let Some((default, _)) = channels.first() {
        yaml.push_str(&format!("defaultChannel: {default}\n"));
    }
    yaml
}

/// Write the `demo` package used across integration tests.
///
/// - `stable` (default) heads at 2.0.0, which replaces 1.1.0 and skips the
///   1.x range.
/// - `alpha` heads at 1.1.0, which replaces 1.0.0.
/// - 0.5.0 is in no channel.
/// - 2.0.0 owns the `widgets.demo.example.com` CRD.
pub fn write_demo_package(dir: &Path) {
    write_file(
        dir,
        "demo.package.yaml",
        &package_yaml("demo", &[("stable", "demo.v2.0.0"), ("alpha", "demo.v1.1.0")]),
    );
    write_file(
        dir,
        "0.5.0/demo.clusterserviceversion.yaml",
        &csv_yaml("demo", "0.5.0", &Relations::default()),
    );
    write_file(
        dir,
        "1.0.0/demo.clusterserviceversion.yaml",
        &csv_yaml("demo", "1.0.0", &Relations::default()),
    );
    write_file(
        dir,
        "1.1.0/demo.clusterserviceversion.yaml",
        &csv_yaml(
            "demo",
            "1.1.0",
            &Relations {
                replaces: Some("demo.v1.0.0"),
                ..Relations::default()
            },
        ),
    );
    write_file(
        dir,
        "2.0.0/demo.clusterserviceversion.yaml",
        &csv_yaml(
            "demo",
            "2.0.0",
            &Relations {
                replaces: Some("demo.v1.1.0"),
                skip_range: Some(">=1.0.0 <2.0.0"),
                owned_crds: &["widgets.demo.example.com"],
                ..Relations::default()
            },
        ),
    );
    write_file(
        dir,
        "2.0.0/widgets.crd.yaml",
        &crd_yaml("widgets", "demo.example.com", "Widget"),
    );
}
