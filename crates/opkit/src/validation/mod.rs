//! Package validation.
//!
//! Validation never mutates records directly. [`validate_package`] produces a
//! [`ValidationReport`]; [`apply_record_validity`] then derives each record's
//! `valid` flag from it: a record is valid when no error-severity finding
//! names it.

pub mod fields;

use crate::domain::{Channel, Package, VersionRecord};
use crate::graph::UpdateGraph;
use fields::FieldResult;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks publishing
    Error,
    /// Worth fixing, does not block
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// What a finding is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum Subject {
    /// The package manifest as a whole
    Package,
    /// A channel, by name
    Channel(String),
    /// A version record, by CSV name
    Version(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Channel(name) => write!(f, "channel {name}"),
            Self::Version(name) => write!(f, "version {name}"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// What the finding is about
    pub subject: Subject,
    /// Field path within the subject
    pub field: String,
    /// Human readable description
    pub message: String,
    /// How serious it is
    pub severity: Severity,
}

/// All findings of one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    /// Every finding.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Number of error-severity findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning-severity findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Whether any finding is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Whether the report is clean.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings about one subject.
    pub fn for_subject<'a>(&'a self, subject: &'a Subject) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| &f.subject == subject)
    }

    /// Findings grouped by subject, subjects in sorted order.
    #[must_use]
    pub fn grouped(&self) -> Vec<(&Subject, Vec<&Finding>)> {
        let mut groups: Vec<(&Subject, Vec<&Finding>)> = Vec::new();
        for finding in &self.findings {
            match groups.iter_mut().find(|(s, _)| *s == &finding.subject) {
                Some((_, group)) => group.push(finding),
                None => groups.push((&finding.subject, vec![finding])),
            }
        }
        groups.sort_by(|(a, _), (b, _)| a.cmp(b));
        groups
    }

    fn check(&mut self, subject: &Subject, result: FieldResult) {
        if let Err(issue) = result {
            self.findings.push(Finding {
                subject: subject.clone(),
                field: issue.field.to_string(),
                message: issue.message,
                severity: issue.severity,
            });
        }
    }

    fn error(&mut self, subject: Subject, field: &str, message: impl Into<String>) {
        self.findings.push(Finding {
            subject,
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, subject: Subject, field: &str, message: impl Into<String>) {
        self.findings.push(Finding {
            subject,
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}

/// Validate a single record's own fields.
#[must_use]
pub fn validate_record(record: &VersionRecord) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_record(&mut report, record);
    report
}

fn check_record(report: &mut ValidationReport, record: &VersionRecord) {
    let subject = Subject::Version(record.name().to_string());
    let spec = &record.csv().spec;

    report.check(&subject, fields::validate_object_name("metadata.name", record.name()));
    report.check(&subject, fields::validate_version(record.version()));
    report.check(&subject, fields::validate_display_name(spec.display_name.as_deref()));
    report.check(&subject, fields::validate_description(spec.description.as_deref()));
    report.check(&subject, fields::validate_provider(spec.provider.as_ref()));
    report.check(&subject, fields::validate_install_modes(&spec.install_modes));
    report.check(&subject, fields::validate_replaces(record.name(), record.replaces()));
    report.check(&subject, fields::validate_skips(record.name(), record.skips()));
    report.check(&subject, fields::validate_skip_range(record.skip_range()));
}

/// Validate a whole package: manifest, channels, records and update graph.
#[must_use]
pub fn validate_package(package: &Package) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.check(&Subject::Package, fields::validate_package_name(package.name()));
    check_channels(&mut report, package);

    for record in package.records() {
        check_record(&mut report, record);
    }
    check_duplicate_versions(&mut report, package.records());

    for cycle in UpdateGraph::build(package.records()).replaces_cycles() {
        report.warning(
            Subject::Package,
            "spec.replaces",
            format!("Replaces chain forms a cycle: {}", cycle.join(" -> ")),
        );
    }

    tracing::debug!(
        package = %package.name(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Validated package"
    );
    report
}

fn check_channels(report: &mut ValidationReport, package: &Package) {
    let channels = package.channels();
    if channels.is_empty() {
        report.error(Subject::Package, "channels", "At least one channel is required");
    }

    let mut seen = HashSet::new();
    for channel in channels {
        let subject = Subject::Channel(channel.name().to_string());
        report.check(&subject, fields::validate_channel_name(channel.name()));
        if !seen.insert(channel.name()) {
            report.error(
                subject.clone(),
                "channels.name",
                format!("Channel name '{}' is used more than once", channel.name()),
            );
        }
        if package.record(channel.head()).is_none() {
            report.error(
                subject,
                "channels.currentCSV",
                format!("Current CSV '{}' does not match any version", channel.head()),
            );
        }
    }

    let defaults = channels.iter().filter(|c| c.is_default()).count();
    if defaults > 1 {
        report.error(
            Subject::Package,
            "defaultChannel",
            format!("{defaults} channels are marked as default, at most one is allowed"),
        );
    }
    if let Some(name) = package.dangling_default() {
        report.error(
            Subject::Package,
            "defaultChannel",
            format!("Default channel '{name}' does not exist"),
        );
    }
}

fn check_duplicate_versions(report: &mut ValidationReport, records: &[VersionRecord]) {
    let mut by_version: HashMap<&str, Vec<&str>> = HashMap::new();
    for record in records {
        by_version
            .entry(record.version())
            .or_default()
            .push(record.name());
    }

    for record in records {
        let Some(owners) = by_version.get(record.version()) else {
            continue;
        };
        if owners.len() > 1 {
            let others: Vec<&str> = owners
                .iter()
                .copied()
                .filter(|n| *n != record.name())
                .collect();
            report.error(
                Subject::Version(record.name().to_string()),
                "spec.version",
                format!(
                    "Version {} is also used by {}",
                    record.version(),
                    others.join(", ")
                ),
            );
        }
    }
}

/// Set each record's `valid` flag from a report.
pub fn apply_record_validity(records: &mut [VersionRecord], report: &ValidationReport) {
    let invalid: HashSet<&str> = report
        .findings()
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .filter_map(|f| match &f.subject {
            Subject::Version(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();

    for record in records {
        let valid = !invalid.contains(record.name());
        record.set_valid(valid);
    }
}

/// Channel validity check.
///
/// A channel is valid when every version in its resolved list that belongs
/// to a known record belongs to a valid one. Versions with no record do not
/// make the channel invalid.
#[must_use]
pub fn channel_is_valid(channel: &Channel, records: &[VersionRecord]) -> bool {
    channel.versions().iter().all(|version| {
        records
            .iter()
            .find(|r| r.version() == version)
            .is_none_or(VersionRecord::is_valid)
    })
}
