//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::{CompressionArg, GraphFormatArg};
use super::validators::{
    validate_catalog_dir, validate_channel_name, validate_csv_name, validate_query,
};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Operator catalog directory, relative to the project root
    #[arg(short, long, value_parser = validate_catalog_dir)]
    pub catalog_dir: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `resolve` command
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    /// Package directory
    pub dir: PathBuf,

    /// Only resolve this channel
    #[arg(short, long, value_parser = validate_channel_name)]
    pub channel: Option<String>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Package directory
    pub dir: PathBuf,

    /// Treat warnings as errors (overrides `validation.strict`)
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Package directory
    pub dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: GraphFormatArg,
}

/// Arguments for the `export` command
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Package directory
    pub dir: PathBuf,

    /// Output file (default: `<export.output-dir>/<package>.zip`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Entry compression (overrides `export.compression`)
    #[arg(long, value_enum)]
    pub compression: Option<CompressionArg>,
}

/// Arguments for the `preview` command
#[derive(Parser, Debug, Clone)]
pub struct PreviewArgs {
    /// Package directory
    pub dir: PathBuf,

    /// CSV name to render
    #[arg(value_parser = validate_csv_name)]
    pub csv: String,
}

/// Arguments for the `catalog` command
#[derive(Parser, Debug, Clone)]
pub struct CatalogArgs {
    /// Catalog action
    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CatalogAction {
    /// List every operator in the catalog
    List,

    /// Search by name, display name, keyword or provider
    Search {
        /// Case-insensitive search text
        #[arg(value_parser = validate_query)]
        query: String,
    },

    /// Show one operator in detail
    Show {
        /// Package name
        package: String,
    },
}
