//! The full update graph of a package as a petgraph `DiGraph`.
//!
//! Channel resolution only needs a linear walk, but rendering and cycle
//! reporting want every relation at once. Edges point from the newer release
//! to the release it supersedes or skips.

use super::{skip_range_matches, EdgeKind};
use crate::domain::VersionRecord;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::fmt::Write;

/// Every `replaces`, `skips` and skip-range relation between records.
#[derive(Debug, Clone, Default)]
pub struct UpdateGraph {
    /// Nodes hold CSV names, edges their relation kind.
    graph: DiGraph<String, EdgeKind>,

    /// CSV name to node index.
    node_map: HashMap<String, NodeIndex>,
}

impl UpdateGraph {
    /// Build the graph for a set of records.
    ///
    /// References to unknown CSV names produce no edge.
    #[must_use]
    pub fn build(records: &[VersionRecord]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for record in records {
            node_map
                .entry(record.name().to_string())
                .or_insert_with(|| graph.add_node(record.name().to_string()));
        }

        let mut update_graph = Self { graph, node_map };
        for record in records {
            if let Some(replaces) = record.replaces() {
                update_graph.connect(record.name(), replaces, EdgeKind::Replaces);
            }
            for skipped in record.skips() {
                update_graph.connect(record.name(), skipped, EdgeKind::Skips);
            }
            let (matches, _) = skip_range_matches(records, record);
            for skipped in matches {
                if skipped.name() != record.name() {
                    update_graph.connect(record.name(), skipped.name(), EdgeKind::SkipRange);
                }
            }
        }

        update_graph
    }

    fn connect(&mut self, from: &str, to: &str, kind: EdgeKind) {
        if let (Some(&from), Some(&to)) = (self.node_map.get(from), self.node_map.get(to)) {
            self.graph.add_edge(from, to, kind);
        }
    }

    /// Number of releases.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of relations.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing relations of a release, in insertion order.
    #[must_use]
    pub fn edges_from(&self, name: &str) -> Vec<(&str, EdgeKind)> {
        let Some(&node) = self.node_map.get(name) else {
            return Vec::new();
        };
        let mut edges: Vec<(&str, EdgeKind)> = self
            .graph
            .edges(node)
            .map(|edge| (self.graph[edge.target()].as_str(), *edge.weight()))
            .collect();
        // petgraph walks adjacency lists newest-first
        edges.reverse();
        edges
    }

    /// Whether any combination of relations leads back to where it started.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        algo::is_cyclic_directed(&self.graph)
    }

    /// Groups of CSVs whose `replaces` links form a cycle.
    ///
    /// Each group is sorted by name and the groups themselves are sorted, so
    /// the output is stable across runs.
    #[must_use]
    pub fn replaces_cycles(&self) -> Vec<Vec<String>> {
        let replaces_only = self.graph.filter_map(
            |_, name| Some(name.clone()),
            |_, kind| (*kind == EdgeKind::Replaces).then_some(*kind),
        );

        let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&replaces_only)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&n| replaces_only.contains_edge(n, n))
            })
            .map(|component| {
                let mut names: Vec<String> = component
                    .into_iter()
                    .map(|n| replaces_only[n].clone())
                    .collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Render the graph in Graphviz DOT format.
    #[must_use]
    pub fn to_dot(&self, title: &str) -> String {
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph \"{}\" {{", escape(title));
        dot.push_str("  rankdir=RL;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        for node in self.graph.node_indices() {
            let name = escape(&self.graph[node]);
            let _ = writeln!(dot, "  \"{name}\";");
        }
        dot.push('\n');

        for edge in self.graph.edge_references() {
            let style = match edge.weight() {
                EdgeKind::Replaces | EdgeKind::Head => "solid",
                EdgeKind::Skips => "dashed",
                EdgeKind::SkipRange => "dotted",
            };
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"{}\", style={}];",
                escape(&self.graph[edge.source()]),
                escape(&self.graph[edge.target()]),
                edge.weight(),
                style
            );
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<VersionRecord> {
        vec![
            VersionRecord::new("op.v1.0.0", "1.0.0"),
            VersionRecord::new("op.v1.1.0", "1.1.0").with_replaces("op.v1.0.0"),
            VersionRecord::new("op.v2.0.0", "2.0.0")
                .with_replaces("op.v1.1.0")
                .with_skips(["op.v1.0.0", "op.missing"])
                .with_skip_range(">=1.0.0 <2.0.0"),
        ]
    }

    #[test]
    fn test_build_edges() {
        let graph = UpdateGraph::build(&sample());

        assert_eq!(graph.node_count(), 3);
        assert_eq!(
            graph.edges_from("op.v2.0.0"),
            vec![
                ("op.v1.1.0", EdgeKind::Replaces),
                ("op.v1.0.0", EdgeKind::Skips),
                ("op.v1.0.0", EdgeKind::SkipRange),
                ("op.v1.1.0", EdgeKind::SkipRange),
            ]
        );
        assert!(graph.edges_from("op.v1.0.0").is_empty());
        assert!(graph.edges_from("unknown").is_empty());
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = UpdateGraph::build(&sample());
        assert!(graph.replaces_cycles().is_empty());
        assert!(!graph.is_cyclic());
    }

    #[test]
    fn test_replaces_cycles() {
        let records = vec![
            VersionRecord::new("b", "2.0.0").with_replaces("a"),
            VersionRecord::new("a", "1.0.0").with_replaces("b"),
            VersionRecord::new("self", "3.0.0").with_replaces("self"),
            VersionRecord::new("free", "4.0.0").with_replaces("a"),
        ];

        let cycles = UpdateGraph::build(&records).replaces_cycles();
        assert_eq!(
            cycles,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["self".to_string()],
            ]
        );
    }

    #[test]
    fn test_skip_edges_do_not_count_as_cycles() {
        let records = vec![
            VersionRecord::new("a", "1.0.0").with_skips(["b"]),
            VersionRecord::new("b", "2.0.0").with_replaces("a"),
        ];
        let graph = UpdateGraph::build(&records);
        assert!(graph.replaces_cycles().is_empty());
        assert!(graph.is_cyclic());
    }

    #[test]
    fn test_to_dot() {
        let dot = UpdateGraph::build(&sample()).to_dot("op");

        assert!(dot.starts_with("digraph \"op\" {"));
        assert!(dot.contains("\"op.v2.0.0\" -> \"op.v1.1.0\" [label=\"replaces\", style=solid];"));
        assert!(dot.contains("[label=\"skips\", style=dashed]"));
        assert!(dot.contains("[label=\"skip-range\", style=dotted]"));
    }
}
