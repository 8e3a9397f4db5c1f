//! Per-field validator functions.
//!
//! Each validator checks one field and returns the first problem it finds.
//! They never look at other records; cross-record rules live in the parent
//! module.

use super::Severity;
use crate::domain::{MAX_CHANNEL_NAME_LENGTH, MAX_NAME_LENGTH};
use crate::range::{parse_version, SkipRange};
use opkit_manifest::csv::{InstallMode, Provider, INSTALL_MODE_TYPES};

/// A problem with a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Path of the field, e.g. `spec.version`
    pub field: &'static str,
    /// Human readable description
    pub message: String,
    /// How serious the problem is
    pub severity: Severity,
}

impl FieldIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// Outcome of a single field check.
pub type FieldResult = Result<(), FieldIssue>;

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Validate a Kubernetes object name as a DNS-1123 subdomain.
///
/// Lowercase alphanumerics, `-` and `.`, at most 253 characters, and every
/// dot-separated label must start and end with an alphanumeric.
pub fn validate_object_name(field: &'static str, name: &str) -> FieldResult {
    if name.is_empty() {
        return Err(FieldIssue::error(field, "Name is required"));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(FieldIssue::error(
            field,
            format!("Name cannot exceed {MAX_NAME_LENGTH} characters"),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(FieldIssue::error(
            field,
            format!("'{name}' must contain only lowercase alphanumerics, '-' and '.'"),
        ));
    }

    let labels_ok = name.split('.').all(|label| {
        let bytes = label.as_bytes();
        match (bytes.first(), bytes.last()) {
            (Some(first), Some(last)) => first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric(),
            _ => false,
        }
    });
    if !labels_ok {
        return Err(FieldIssue::error(
            field,
            format!("'{name}' must start and end with an alphanumeric character"),
        ));
    }

    Ok(())
}

/// `spec.version` must be present and valid semver.
pub fn validate_version(version: &str) -> FieldResult {
    if version.trim().is_empty() {
        return Err(FieldIssue::error("spec.version", "Version is required"));
    }
    if parse_version(version).is_none() {
        return Err(FieldIssue::error(
            "spec.version",
            format!("'{version}' is not a valid semantic version"),
        ));
    }
    Ok(())
}

/// `spec.displayName` is required.
pub fn validate_display_name(display_name: Option<&str>) -> FieldResult {
    if is_blank(display_name) {
        return Err(FieldIssue::error("spec.displayName", "Display name is required"));
    }
    Ok(())
}

/// `spec.description` is recommended.
pub fn validate_description(description: Option<&str>) -> FieldResult {
    if is_blank(description) {
        return Err(FieldIssue::warning(
            "spec.description",
            "A description is recommended",
        ));
    }
    Ok(())
}

/// `spec.provider.name` is required.
pub fn validate_provider(provider: Option<&Provider>) -> FieldResult {
    if is_blank(provider.and_then(|p| p.name.as_deref())) {
        return Err(FieldIssue::error("spec.provider.name", "Provider name is required"));
    }
    Ok(())
}

/// At least one known install mode must be supported.
pub fn validate_install_modes(modes: &[InstallMode]) -> FieldResult {
    if modes
        .iter()
        .any(|m| m.supported && INSTALL_MODE_TYPES.contains(&m.mode.as_str()))
    {
        return Ok(());
    }
    Err(FieldIssue::error(
        "spec.installModes",
        "At least one install mode must be supported",
    ))
}

/// `replaces` must not name the record itself.
pub fn validate_replaces(name: &str, replaces: Option<&str>) -> FieldResult {
    if replaces == Some(name) {
        return Err(FieldIssue::error(
            "spec.replaces",
            "A version cannot replace itself",
        ));
    }
    Ok(())
}

/// `skips` must not name the record itself.
pub fn validate_skips(name: &str, skips: &[String]) -> FieldResult {
    if skips.iter().any(|s| s == name) {
        return Err(FieldIssue::error("spec.skips", "A version cannot skip itself"));
    }
    Ok(())
}

/// The skip range, when present, must parse.
pub fn validate_skip_range(range: Option<&str>) -> FieldResult {
    let Some(range) = range else {
        return Ok(());
    };
    SkipRange::parse(range).map(|_| ()).map_err(|e| {
        FieldIssue::error(
            "metadata.annotations.olm.skipRange",
            format!("Invalid skip range '{range}': {e}"),
        )
    })
}

/// `packageName` is required and must be a valid object name.
pub fn validate_package_name(name: &str) -> FieldResult {
    if name.trim().is_empty() {
        return Err(FieldIssue::error("packageName", "Package name is required"));
    }
    validate_object_name("packageName", name)
}

/// Channel names are required and bounded in length.
pub fn validate_channel_name(name: &str) -> FieldResult {
    if name.trim().is_empty() {
        return Err(FieldIssue::error("channels.name", "Channel name is required"));
    }
    if name.len() > MAX_CHANNEL_NAME_LENGTH {
        return Err(FieldIssue::error(
            "channels.name",
            format!("Channel name cannot exceed {MAX_CHANNEL_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}
