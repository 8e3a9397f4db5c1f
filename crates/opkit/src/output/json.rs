//! Serializable views for `--json` output.
//!
//! Views own their data so they can be built once and rendered either as
//! JSON or as text.

use crate::graph::EdgeKind;
use crate::validation::Finding;
use serde::Serialize;
use std::io::{self, Write};

/// One resolved channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelView {
    /// Channel name
    pub name: String,
    /// Head CSV name
    pub head: String,
    /// Whether this is the package default
    pub is_default: bool,
    /// Channel validity check result
    pub valid: bool,
    /// Resolved versions, head first
    pub versions: Vec<VersionView>,
}

/// One version of a resolved channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionView {
    /// Position in the resolved list; the head is 0
    pub distance: usize,
    /// Version string
    pub version: String,
    /// CSV name
    pub name: String,
    /// Relation through which the version was reached
    pub via: EdgeKind,
    /// The record's validity flag
    pub valid: bool,
}

/// Validation result of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    /// Package name
    pub package: String,
    /// Whether the package passes
    pub valid: bool,
    /// Error count
    pub errors: usize,
    /// Warning count
    pub warnings: usize,
    /// All findings
    pub findings: Vec<Finding>,
    /// Problems found while reading files
    pub import_warnings: Vec<String>,
}

/// One node of the update graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    /// CSV name
    pub name: String,
    /// Version string
    pub version: String,
    /// The record's validity flag
    pub valid: bool,
    /// Outgoing relations
    pub edges: Vec<EdgeView>,
}

/// One edge of the update graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeView {
    /// Target CSV name
    pub to: String,
    /// Relation kind
    pub kind: EdgeKind,
}

/// The whole update graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphView {
    /// Package name
    pub package: String,
    /// Records in package order
    pub nodes: Vec<NodeView>,
    /// Groups of CSVs whose `replaces` links form a cycle
    pub cycles: Vec<Vec<String>>,
}

pub(super) fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}
