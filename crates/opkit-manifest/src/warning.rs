//! Warnings for documents skipped during lenient parsing.
//!
//! A package upload is often a pile of YAML files, some of which are not
//! packaging metadata at all (RBAC, sample CRs, kustomize overlays). Lenient
//! parsing keeps going past those and reports them as [`Warning`]s instead
//! of failing the whole upload.

use std::fmt;

/// A non-fatal problem found while parsing a multi-document stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A document was not valid YAML, or did not fit the shape of its kind.
    ///
    /// Parsing stops at a YAML syntax error because the remainder of the
    /// stream cannot be split reliably.
    MalformedDocument {
        /// 0-based position of the document in the stream
        index: usize,
        /// Parser message
        error: String,
    },

    /// A well-formed document of a kind that is not packaging metadata.
    UnsupportedKind {
        /// 0-based position of the document in the stream
        index: usize,
        /// The declared `kind`, or `<none>`
        kind: String,
    },
}

impl Warning {
    /// Returns the position of the offending document.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::MalformedDocument { index, .. } | Self::UnsupportedKind { index, .. } => *index,
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDocument { .. } => "malformed_document",
            Self::UnsupportedKind { .. } => "unsupported_kind",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDocument { index, error } => {
                write!(f, "document {index}: malformed: {error}")
            }
            Self::UnsupportedKind { index, kind } => {
                write!(f, "document {index}: unsupported kind '{kind}'")
            }
        }
    }
}
