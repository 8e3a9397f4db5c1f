//! Update-graph resolution.
//!
//! A channel's version list is reconstructed by walking backwards from its
//! head CSV:
//!
//! 1. Append the current record's version.
//! 2. Append every version the current record skips: first those matching
//!    its skip range (collection order), then its explicit `skips`.
//! 3. Continue with the record named by `replaces`. If that does not
//!    resolve, continue with the oldest version matched by the skip range.
//!
//! The walk never revisits a CSV name, so cyclic `replaces` chains and
//! self-references terminate. Broken references and invalid ranges are
//! ignored rather than reported; validation reports them separately.

mod update_graph;

pub use update_graph::UpdateGraph;

use crate::domain::VersionRecord;
use crate::range::{parse_version, SkipRange};
use semver::Version;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How a version entered a channel's resolved list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// The channel head itself
    Head,
    /// Reached through a `replaces` link
    Replaces,
    /// Listed in `skips`
    Skips,
    /// Matched by a skip range
    SkipRange,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "head"),
            Self::Replaces => write!(f, "replaces"),
            Self::Skips => write!(f, "skips"),
            Self::SkipRange => write!(f, "skip-range"),
        }
    }
}

/// One entry of a resolved channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    /// Version string
    pub version: String,
    /// CSV name of the record that contributed the version
    pub name: String,
    /// Relation through which it was discovered
    pub via: EdgeKind,
}

/// Resolve the ordered, deduplicated version list of a channel.
///
/// Returns an empty list when `head_name` names no record.
///
/// # Example
///
/// ```
/// use opkit::domain::VersionRecord;
/// use opkit::graph::resolve_channel_versions;
///
/// let records = vec![
///     VersionRecord::new("a.v1", "1.0.0"),
///     VersionRecord::new("a.v2", "2.0.0").with_replaces("a.v1"),
/// ];
/// assert_eq!(resolve_channel_versions(&records, "a.v2"), ["2.0.0", "1.0.0"]);
/// ```
#[must_use]
pub fn resolve_channel_versions(records: &[VersionRecord], head_name: &str) -> Vec<String> {
    resolve_channel(records, head_name)
        .into_iter()
        .map(|entry| entry.version)
        .collect()
}

/// Resolve a channel, keeping track of how each version was reached.
#[must_use]
pub fn resolve_channel(records: &[VersionRecord], head_name: &str) -> Vec<ResolvedVersion> {
    let by_name = index_by_name(records);

    let mut result: Vec<ResolvedVersion> = Vec::new();
    let mut seen_versions: HashSet<&str> = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();

    let mut current = by_name.get(head_name).copied();
    let mut arrived_via = EdgeKind::Head;

    while let Some(record) = current {
        if !visited.insert(record.name()) {
            tracing::debug!(csv = %record.name(), "Update graph revisits a CSV, stopping walk");
            break;
        }

        push_unique(&mut result, &mut seen_versions, record, arrived_via);

        let (range_matches, oldest_skipped) = skip_range_matches(records, record);
        for skipped in range_matches {
            push_unique(&mut result, &mut seen_versions, skipped, EdgeKind::SkipRange);
        }
        for name in record.skips() {
            if let Some(skipped) = by_name.get(name.as_str()) {
                push_unique(&mut result, &mut seen_versions, *skipped, EdgeKind::Skips);
            }
        }

        current = match record.replaces().and_then(|r| by_name.get(r)) {
            Some(next) => {
                arrived_via = EdgeKind::Replaces;
                Some(*next)
            }
            None => {
                arrived_via = EdgeKind::SkipRange;
                oldest_skipped
            }
        };
    }

    result
}

fn push_unique<'a>(
    result: &mut Vec<ResolvedVersion>,
    seen: &mut HashSet<&'a str>,
    record: &'a VersionRecord,
    via: EdgeKind,
) {
    if seen.insert(record.version()) {
        result.push(ResolvedVersion {
            version: record.version().to_string(),
            name: record.name().to_string(),
            via,
        });
    }
}

/// Records matched by `record`'s skip range, in collection order, together
/// with the one holding the lowest version.
///
/// An absent or unparseable range matches nothing.
pub(crate) fn skip_range_matches<'a>(
    records: &'a [VersionRecord],
    record: &VersionRecord,
) -> (Vec<&'a VersionRecord>, Option<&'a VersionRecord>) {
    let Some(range) = record.skip_range().and_then(|r| SkipRange::parse(r).ok()) else {
        return (Vec::new(), None);
    };

    let mut matches = Vec::new();
    let mut oldest: Option<(Version, &VersionRecord)> = None;

    for candidate in records {
        let Some(version) = parse_version(candidate.version()) else {
            continue;
        };
        if !range.matches(&version) {
            continue;
        }
        matches.push(candidate);
        if oldest.as_ref().is_none_or(|(lowest, _)| version < *lowest) {
            oldest = Some((version, candidate));
        }
    }

    (matches, oldest.map(|(_, r)| r))
}

/// Index records by CSV name. The first record wins on duplicate names.
fn index_by_name(records: &[VersionRecord]) -> HashMap<&str, &VersionRecord> {
    let mut by_name = HashMap::with_capacity(records.len());
    for record in records {
        by_name.entry(record.name()).or_insert(record);
    }
    by_name
}
