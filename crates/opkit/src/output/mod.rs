//! Output formatting for CLI commands.
//!
//! Every printer comes in two flavours selected by [`OutputMode`]:
//! human-readable text and JSON for programmatic use. Text writers take any
//! `Write` so they can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`json`]: Serializable views shared by both formats

pub mod color;
pub mod json;

use crate::catalog::CatalogEntry;
use crate::domain::Package;
use crate::export::BundleSummary;
use crate::graph::{self, UpdateGraph};
use crate::import::ImportWarning;
use crate::validation::Subject;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};
pub use json::{ChannelView, EdgeView, GraphView, NodeView, ReportView, VersionView};

use color::{bold, colorize_severity, colorize_version, dimmed, relation_icon, validity_icon};
use json::write_json;

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for output formatting.
///
/// Holds settings that control how text output is rendered: wrapping width,
/// ASCII fallback icons, and color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `OPKIT_MAX_WIDTH`: Maximum content width (default: 100)
    /// - `OPKIT_ASCII`: Set to "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `OPKIT_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        let max_width = match env::var("OPKIT_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "OPKIT_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match env::var("OPKIT_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "OPKIT_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("OPKIT_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Effective wrapping width: the terminal width capped at `max_width`.
    fn content_width(&self) -> usize {
        get_terminal_width().min(self.max_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH as usize, |(w, _)| w.0 as usize)
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width.max(20))
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// View Builders
// ============================================================================

/// Resolved channels of a package, optionally restricted to one channel.
#[must_use]
pub fn channel_views(package: &Package, only: Option<&str>) -> Vec<ChannelView> {
    package
        .channels()
        .iter()
        .filter(|c| only.is_none_or(|name| c.name() == name))
        .map(|channel| ChannelView {
            name: channel.name().to_string(),
            head: channel.head().to_string(),
            is_default: channel.is_default(),
            valid: package.is_channel_valid(channel),
            versions: graph::resolve_channel(package.records(), channel.head())
                .into_iter()
                .enumerate()
                .map(|(distance, entry)| VersionView {
                    distance,
                    valid: package.record(&entry.name).is_some_and(|r| r.is_valid()),
                    version: entry.version,
                    name: entry.name,
                    via: entry.via,
                })
                .collect(),
        })
        .collect()
}

/// Validation result of a package.
#[must_use]
pub fn report_view(package: &Package, import_warnings: &[ImportWarning], strict: bool) -> ReportView {
    let report = package.report();
    ReportView {
        package: package.name().to_string(),
        valid: !report.has_errors() && !(strict && report.warning_count() > 0),
        errors: report.error_count(),
        warnings: report.warning_count(),
        findings: report
            .grouped()
            .into_iter()
            .flat_map(|(_, findings)| findings)
            .cloned()
            .collect(),
        import_warnings: import_warnings.iter().map(ToString::to_string).collect(),
    }
}

/// The update graph of a package.
#[must_use]
pub fn graph_view(package: &Package) -> GraphView {
    let update_graph = UpdateGraph::build(package.records());
    GraphView {
        package: package.name().to_string(),
        nodes: package
            .records()
            .iter()
            .map(|record| NodeView {
                name: record.name().to_string(),
                version: record.version().to_string(),
                valid: record.is_valid(),
                edges: update_graph
                    .edges_from(record.name())
                    .into_iter()
                    .map(|(to, kind)| EdgeView {
                        to: to.to_string(),
                        kind,
                    })
                    .collect(),
            })
            .collect(),
        cycles: update_graph.replaces_cycles(),
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

fn dispatch<T: Serialize + ?Sized>(
    value: &T,
    mode: OutputMode,
    text: impl FnOnce(&mut io::StdoutLock<'_>, &OutputConfig) -> io::Result<()>,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => text(&mut handle, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, value),
    }
}

/// Print resolved channels
pub fn print_channels(channels: &[ChannelView], mode: OutputMode) -> io::Result<()> {
    dispatch(channels, mode, |w, config| write_channels_text(w, channels, config))
}

/// Print a validation report
pub fn print_report(report: &ReportView, mode: OutputMode) -> io::Result<()> {
    dispatch(report, mode, |w, config| write_report_text(w, report, config))
}

/// Print the update graph
pub fn print_graph(graph: &GraphView, mode: OutputMode) -> io::Result<()> {
    dispatch(graph, mode, |w, config| write_graph_text(w, graph, config))
}

/// Print catalog entries as a list
pub fn print_catalog(entries: &[CatalogEntry], mode: OutputMode) -> io::Result<()> {
    dispatch(entries, mode, |w, config| write_catalog_text(w, entries, config))
}

/// Print one catalog entry in detail
pub fn print_catalog_entry(entry: &CatalogEntry, mode: OutputMode) -> io::Result<()> {
    dispatch(entry, mode, |w, config| write_catalog_entry_text(w, entry, config))
}

/// Print the result of an export
pub fn print_export(summary: &BundleSummary, mode: OutputMode) -> io::Result<()> {
    dispatch(summary, mode, |w, config| write_export_text(w, summary, config))
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_channels_text<W: Write>(
    w: &mut W,
    channels: &[ChannelView],
    config: &OutputConfig,
) -> io::Result<()> {
    if channels.is_empty() {
        writeln!(w, "No channels found.")?;
        return Ok(());
    }

    for (i, channel) in channels.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        let default_marker = if channel.is_default { " (default)" } else { "" };
        writeln!(
            w,
            "{} {}{}  {} {}",
            validity_icon(channel.valid, config),
            bold(&channel.name, config),
            default_marker,
            dimmed("head:", config),
            info(&channel.head, config)
        )?;

        if channel.versions.is_empty() {
            writeln!(w, "  {}", warning("head does not match any version", config))?;
            continue;
        }

        let version_width = channel
            .versions
            .iter()
            .map(|v| v.version.len())
            .max()
            .unwrap_or(0);
        for version in &channel.versions {
            let padded = format!("{:<version_width$}", version.version);
            let mut line = format!(
                "  {:>3} {} {}  {}",
                version.distance,
                relation_icon(version.via, config),
                colorize_version(&padded, config),
                version.name
            );
            if version.distance > 0 {
                line.push_str(&format!("  {}", dimmed(&version.via.to_string(), config)));
            }
            if !version.valid {
                line.push_str(&format!("  {}", error("invalid", config)));
            }
            writeln!(w, "{line}")?;
        }
    }

    Ok(())
}

fn write_report_text<W: Write>(
    w: &mut W,
    report: &ReportView,
    config: &OutputConfig,
) -> io::Result<()> {
    let width = config.content_width();

    for warning_text in &report.import_warnings {
        writeln!(w, "{} {warning_text}", warning("import:", config))?;
    }
    if !report.import_warnings.is_empty() {
        writeln!(w)?;
    }

    let mut current: Option<&Subject> = None;
    for finding in &report.findings {
        if current != Some(&finding.subject) {
            writeln!(w, "{}", bold(&finding.subject.to_string(), config))?;
            current = Some(&finding.subject);
        }
        let prefix = format!(
            "  {} {}: ",
            colorize_severity(finding.severity, config),
            dimmed(&finding.field, config)
        );
        let mut lines = wrap_text(&finding.message, width.saturating_sub(8)).into_iter();
        if let Some(first) = lines.next() {
            writeln!(w, "{prefix}{first}")?;
        }
        for line in lines {
            writeln!(w, "      {line}")?;
        }
    }

    if !report.findings.is_empty() {
        writeln!(w)?;
    }
    let summary = format!(
        "{}: {} error(s), {} warning(s)",
        report.package, report.errors, report.warnings
    );
    if report.valid {
        writeln!(w, "{} {}", validity_icon(true, config), success(&summary, config))
    } else {
        writeln!(w, "{} {}", validity_icon(false, config), error(&summary, config))
    }
}

fn write_graph_text<W: Write>(w: &mut W, graph: &GraphView, config: &OutputConfig) -> io::Result<()> {
    writeln!(w, "{}", bold(&format!("Update graph of {}", graph.package), config))?;

    for node in &graph.nodes {
        writeln!(
            w,
            "{} {} {}",
            validity_icon(node.valid, config),
            info(&node.name, config),
            colorize_version(&node.version, config)
        )?;
        for edge in &node.edges {
            writeln!(
                w,
                "    {} {} {}",
                relation_icon(edge.kind, config),
                dimmed(&format!("{:<10}", edge.kind.to_string()), config),
                edge.to
            )?;
        }
    }

    for cycle in &graph.cycles {
        writeln!(
            w,
            "{} {}",
            warning("cycle:", config),
            cycle.join(" -> ")
        )?;
    }
    Ok(())
}

fn write_catalog_text<W: Write>(
    w: &mut W,
    entries: &[CatalogEntry],
    config: &OutputConfig,
) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(w, "No operators found.")?;
        return Ok(());
    }

    let name_width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    writeln!(w, "Found {} operator(s):", entries.len())?;
    for entry in entries {
        let padded = format!("{:<name_width$}", entry.name);
        writeln!(
            w,
            "  {}  {}  {}",
            info(&padded, config),
            colorize_version(entry.head_version.as_deref().unwrap_or("-"), config),
            entry.display_name
        )?;
    }
    Ok(())
}

fn write_catalog_entry_text<W: Write>(
    w: &mut W,
    entry: &CatalogEntry,
    config: &OutputConfig,
) -> io::Result<()> {
    let width = config.content_width();

    writeln!(w, "{} {}", bold(&entry.display_name, config), dimmed(&format!("({})", entry.name), config))?;
    if let Some(provider) = &entry.provider {
        writeln!(w, "  {} {provider}", dimmed("Provider:", config))?;
    }
    if let Some(version) = &entry.head_version {
        writeln!(w, "  {} {}", dimmed("Version: ", config), colorize_version(version, config))?;
    }
    if !entry.keywords.is_empty() {
        writeln!(w, "  {} {}", dimmed("Keywords:", config), entry.keywords.join(", "))?;
    }

    if let Some(description) = entry.description.as_deref().filter(|d| !d.trim().is_empty()) {
        writeln!(w)?;
        for line in wrap_text(description, width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
    }

    if !entry.channels.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", bold("Channels", config))?;
        for channel in &entry.channels {
            let default_marker = if channel.is_default { " (default)" } else { "" };
            writeln!(
                w,
                "  {}{}: {}",
                channel.name,
                default_marker,
                channel.versions.join(", ")
            )?;
        }
    }
    Ok(())
}

fn write_export_text<W: Write>(
    w: &mut W,
    summary: &BundleSummary,
    config: &OutputConfig,
) -> io::Result<()> {
    let location = summary
        .path
        .as_ref()
        .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());
    writeln!(
        w,
        "{} {}",
        validity_icon(true, config),
        success(&format!("Exported {location}"), config)
    )?;
    for entry in &summary.entries {
        writeln!(w, "  {entry}")?;
    }
    writeln!(w, "  {} {} bytes", dimmed("Size:  ", config), summary.size)?;
    writeln!(w, "  {} {}", dimmed("SHA256:", config), summary.sha256)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionRecord;
    use crate::graph::EdgeKind;

    fn plain() -> OutputConfig {
        OutputConfig::new(80, true, false)
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn package() -> Package {
        let mut package = Package::new("demo");
        for (name, version) in [("demo.v1.0.0", "1.0.0"), ("demo.v1.1.0", "1.1.0")] {
            package.add_version(VersionRecord::new(name, version)).unwrap();
        }
        package
            .add_version(
                VersionRecord::new("demo.v2.0.0", "2.0.0")
                    .with_replaces("demo.v1.1.0")
                    .with_skips(["demo.v1.0.0"]),
            )
            .unwrap();
        package.add_channel("stable", "demo.v2.0.0").unwrap();
        package.add_channel("candidate", "demo.v9.9.9").unwrap();
        package
    }

    // ========== Output Config Tests ==========

    #[test]
    fn test_output_config_new() {
        let config = OutputConfig::new(60, true, false);
        assert_eq!(config.max_width, 60);
        assert!(config.use_ascii);
        assert!(!config.use_colors);
    }

    #[test]
    fn test_wrap_text_keeps_blank_lines() {
        let lines = wrap_text("first line\n\nsecond", 40);
        assert_eq!(lines, vec!["first line", "", "second"]);
    }

    // ========== View Tests ==========

    #[test]
    fn test_channel_views_distance_and_relation() {
        let views = channel_views(&package(), Some("stable"));
        assert_eq!(views.len(), 1);

        let stable = &views[0];
        assert!(stable.is_default);
        let summary: Vec<(usize, &str, EdgeKind)> = stable
            .versions
            .iter()
            .map(|v| (v.distance, v.version.as_str(), v.via))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, "2.0.0", EdgeKind::Head),
                (1, "1.0.0", EdgeKind::Skips),
                (2, "1.1.0", EdgeKind::Replaces),
            ]
        );
    }

    #[test]
    fn test_report_view_strict_mode() {
        let lenient = report_view(&package(), &[], false);
        assert!(!lenient.valid);
        assert!(lenient.errors > 0);

        let mut csv = opkit_manifest::ClusterServiceVersion::new("clean.v1.0.0", "1.0.0");
        csv.spec.display_name = Some("Clean".to_string());
        csv.spec.provider = Some(opkit_manifest::csv::Provider {
            name: Some("Clean Co".to_string()),
            url: None,
        });
        csv.spec.install_modes = vec![opkit_manifest::csv::InstallMode {
            mode: "AllNamespaces".to_string(),
            supported: true,
        }];
        let mut clean = Package::new("clean");
        clean.add_version(VersionRecord::from_csv(csv)).unwrap();
        clean.add_channel("stable", "clean.v1.0.0").unwrap();

        let view = report_view(&clean, &[], false);
        assert_eq!((view.errors, view.warnings), (0, 1));
        assert!(view.valid);
        assert!(!report_view(&clean, &[], true).valid);
    }

    #[test]
    fn test_graph_view() {
        let view = graph_view(&package());
        let head = view.nodes.iter().find(|n| n.name == "demo.v2.0.0").unwrap();

        assert_eq!(
            head.edges,
            vec![
                EdgeView {
                    to: "demo.v1.1.0".to_string(),
                    kind: EdgeKind::Replaces
                },
                EdgeView {
                    to: "demo.v1.0.0".to_string(),
                    kind: EdgeKind::Skips
                },
            ]
        );
        assert!(view.cycles.is_empty());
    }

    // ========== Text Rendering Tests ==========

    #[test]
    fn test_channels_text() {
        let views = channel_views(&package(), None);
        let text = render(|w| write_channels_text(w, &views, &plain()));

        assert!(text.contains("stable (default)  head: demo.v2.0.0"));
        assert!(text.contains("    0 * 2.0.0  demo.v2.0.0"));
        assert!(text.contains("    1 ~ 1.0.0  demo.v1.0.0  skips"));
        assert!(text.contains("    2 < 1.1.0  demo.v1.1.0  replaces"));
        assert!(text.contains("candidate  head: demo.v9.9.9"));
        assert!(text.contains("head does not match any version"));
    }

    #[test]
    fn test_report_text_groups_by_subject() {
        let view = report_view(&package(), &[], false);
        let text = render(|w| write_report_text(w, &view, &plain()));

        assert!(text.contains("channel candidate\n"));
        assert!(text.contains("version demo.v1.0.0\n"));
        assert!(text.contains("error spec.displayName: Display name is required"));
        assert!(text.contains("x demo:"));
    }

    #[test]
    fn test_graph_text() {
        let view = graph_view(&package());
        let text = render(|w| write_graph_text(w, &view, &plain()));

        assert!(text.starts_with("Update graph of demo\n"));
        assert!(text.contains("    < replaces   demo.v1.1.0"));
        assert!(text.contains("    ~ skips      demo.v1.0.0"));
    }

    #[test]
    fn test_catalog_text_empty() {
        let text = render(|w| write_catalog_text(w, &[], &plain()));
        assert_eq!(text, "No operators found.\n");
    }

    #[test]
    fn test_catalog_entry_text() {
        let entry = CatalogEntry::from_package(&package());
        let text = render(|w| write_catalog_entry_text(w, &entry, &plain()));

        assert!(text.starts_with("demo (demo)\n"));
        assert!(text.contains("Version:  2.0.0"));
        assert!(text.contains("stable (default): 2.0.0, 1.0.0, 1.1.0"));
        assert!(text.contains("  candidate: \n"));
    }

    #[test]
    fn test_export_text() {
        let summary = BundleSummary {
            path: Some("dist/demo.zip".into()),
            entries: vec!["demo/demo.package.yaml".to_string()],
            size: 42,
            sha256: "abc".to_string(),
        };
        let text = render(|w| write_export_text(w, &summary, &plain()));

        assert!(text.contains("+ Exported dist/demo.zip"));
        assert!(text.contains("  demo/demo.package.yaml"));
        assert!(text.contains("42 bytes"));
    }
}
