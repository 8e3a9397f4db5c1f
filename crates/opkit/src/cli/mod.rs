//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for opkit using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Create `.opkit/config.yaml`
//! - `resolve`: Print each channel's resolved versions
//! - `validate`: Validate a package
//! - `graph`: Render the update graph
//! - `export`: Write a bundle archive
//! - `preview`: Print one CSV as YAML
//! - `catalog`: Browse the operator catalog
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! opkit resolve ./etcd --channel singlenamespace-alpha
//! opkit validate ./etcd --strict
//! opkit graph ./etcd --format dot | dot -Tsvg > etcd.svg
//! opkit export ./etcd --output dist/etcd.zip
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    CatalogAction, CatalogArgs, ExportArgs, GraphArgs, InitArgs, PreviewArgs, ResolveArgs,
    ValidateArgs,
};

// Re-export types
pub use types::{CompressionArg, GraphFormatArg};

// Re-export validators for external use
pub use validators::{
    validate_catalog_dir, validate_channel_name, validate_csv_name, validate_query,
};

/// opkit - Operator package toolkit
///
/// Resolve, validate and export Operator Lifecycle Manager packages: CSVs,
/// CRDs and the channel update graph that connects them.
#[derive(Parser, Debug)]
#[command(name = "opkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize opkit in the current directory
    ///
    /// Creates `.opkit/config.yaml` with the catalog location and export
    /// settings.
    Init(InitArgs),

    /// Resolve channel version lists
    ///
    /// Walks each channel backwards from its head through `replaces`,
    /// `skips` and `olm.skipRange` and prints the versions it reaches.
    Resolve(ResolveArgs),

    /// Validate a package
    ///
    /// Checks CSV fields, channels and the update graph. Exits non-zero
    /// when errors are found.
    Validate(ValidateArgs),

    /// Render the update graph
    Graph(GraphArgs),

    /// Export a bundle archive
    ///
    /// Writes every CSV reachable from a channel, its CRDs and the package
    /// manifest into a zip file.
    Export(ExportArgs),

    /// Print one CSV as YAML
    Preview(PreviewArgs),

    /// Browse the operator catalog
    Catalog(CatalogArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Resolve(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_resolve(&app, args, output_mode).await
            }
            Some(Commands::Validate(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_validate(&app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            Some(Commands::Export(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_export(&app, args, output_mode).await
            }
            Some(Commands::Preview(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_preview(&app, args, output_mode).await
            }
            Some(Commands::Catalog(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_catalog(&app, args, output_mode).await
            }
            None => {
                println!("opkit operator package toolkit");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
