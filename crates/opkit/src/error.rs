//! Error types for opkit operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for opkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A manifest could not be parsed or rendered.
    #[error(transparent)]
    Manifest(#[from] opkit_manifest::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Package import error.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Bundle export error.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// No package with this name exists.
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// No version record with this CSV name exists.
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    /// No channel with this name exists.
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// An edit would break a package invariant.
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be parsed.
    #[error("Invalid configuration in {path}: {message}")]
    Invalid {
        /// Path of the offending file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// `init` was run where a configuration already exists.
    #[error("Already initialized: {0}")]
    AlreadyInitialized(PathBuf),

    /// Configuration could not be serialized.
    #[error("YAML error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Errors raised while turning uploaded files into a package.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The upload contained no package manifest.
    #[error("No package manifest found in upload")]
    MissingPackageManifest,

    /// The upload contained more than one package manifest.
    #[error("Multiple package manifests found: {first} and {second}")]
    MultiplePackageManifests {
        /// Name of the first manifest seen
        first: String,
        /// Name of the second manifest seen
        second: String,
    },

    /// A path given to the importer does not exist or is not readable.
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        /// The path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}

/// Errors raised while writing a bundle archive.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No channel resolved to any version, so there is nothing to export.
    #[error("Package '{0}' has no exportable versions")]
    NothingToExport(String),

    /// A name that would become part of an entry path is not safe to use.
    #[error("Cannot export {kind} '{name}': not a valid path segment")]
    UnsafeEntryName {
        /// What the name identifies (package, version, CSV or CRD)
        kind: &'static str,
        /// The rejected name
        name: String,
    },

    /// Zip archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// A specialized Result type for opkit operations.
pub type Result<T> = std::result::Result<T, Error>;
