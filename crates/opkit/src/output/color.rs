//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Valid:   green  (valid channels, exported bundles)
//!   - Warning:         yellow (warning findings)
//!   - Error/Invalid:   red    (error findings, invalid records)
//!   - Info/Reference:  cyan   (CSV names, channel names)
//!   - Accent:          magenta (versions)
//!   - Muted:           dimmed (field labels, relations)
//!   - Emphasis:        bold   (section headers)

use crate::graph::EdgeKind;
use crate::validation::Severity;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Colorize a version string (magenta).
pub(crate) fn colorize_version(version: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return version.to_string();
    }
    version.magenta().to_string()
}

/// Severity label, colored by severity.
pub(crate) fn colorize_severity(severity: Severity, config: &OutputConfig) -> String {
    let text = severity.to_string();
    match severity {
        Severity::Error => error(&text, config),
        Severity::Warning => warning(&text, config),
    }
}

/// Validity marker with ASCII fallback.
pub(crate) fn validity_icon(valid: bool, config: &OutputConfig) -> String {
    let icon = match (valid, config.use_ascii) {
        (true, true) => "+",
        (false, true) => "x",
        (true, false) => "✓",
        (false, false) => "✗",
    };
    if valid {
        success(icon, config)
    } else {
        error(icon, config)
    }
}

/// Marker for how a version entered a channel, with ASCII fallback.
pub(crate) fn relation_icon(kind: EdgeKind, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match kind {
            EdgeKind::Head => "*",
            EdgeKind::Replaces => "<",
            EdgeKind::Skips => "~",
            EdgeKind::SkipRange => "^",
        }
    } else {
        match kind {
            EdgeKind::Head => "●",
            EdgeKind::Replaces => "←",
            EdgeKind::Skips => "↷",
            EdgeKind::SkipRange => "⇢",
        }
    };
    dimmed(icon, config)
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
