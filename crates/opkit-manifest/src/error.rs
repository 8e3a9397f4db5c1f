//! Error types for opkit-manifest operations.

use std::io;
use thiserror::Error;

/// The error type for manifest parsing and rendering.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing or serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A document parsed as YAML but does not have the expected shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A document declares a `kind` this crate does not model.
    #[error("Unsupported document kind: {0}")]
    UnsupportedKind(String),
}

/// A specialized Result type for opkit-manifest operations.
pub type Result<T> = std::result::Result<T, Error>;
