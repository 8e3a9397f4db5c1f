//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::{Context, Result};

use super::args::{
    CatalogAction, CatalogArgs, ExportArgs, GraphArgs, InitArgs, PreviewArgs, ResolveArgs,
    ValidateArgs,
};
use super::types::GraphFormatArg;
use crate::app::App;
use crate::error::Error;
use crate::export;
use crate::graph::UpdateGraph;
use crate::output::{self, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir, args.catalog_dir.as_deref()).await?;

    if !args.quiet {
        println!("Initialized opkit in {}", result.opkit_dir.display());
        println!("  Config:  {}", result.config_file.display());
        println!("  Catalog: {}", result.catalog_dir);
    }

    Ok(())
}

/// Execute the resolve command
pub async fn execute_resolve(app: &App, args: &ResolveArgs, output_mode: OutputMode) -> Result<()> {
    let imported = app.load_package(&args.dir).await?;
    let package = &imported.package;

    if let Some(name) = &args.channel {
        if package.channel(name).is_none() {
            return Err(Error::ChannelNotFound(name.clone()).into());
        }
    }

    let views = output::channel_views(package, args.channel.as_deref());
    output::print_channels(&views, output_mode)?;
    Ok(())
}

/// Execute the validate command
///
/// Fails when the package has errors, or warnings in strict mode, so the
/// exit status can gate CI.
pub async fn execute_validate(
    app: &App,
    args: &ValidateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let imported = app.load_package(&args.dir).await?;
    let strict = args.strict || app.strict_validation();

    let view = output::report_view(&imported.package, &imported.warnings, strict);
    output::print_report(&view, output_mode)?;

    if !view.valid {
        anyhow::bail!(
            "Validation failed for '{}': {} error(s), {} warning(s){}",
            view.package,
            view.errors,
            view.warnings,
            if strict { " (strict)" } else { "" }
        );
    }
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let imported = app.load_package(&args.dir).await?;
    let package = &imported.package;

    match (args.format, output_mode) {
        (GraphFormatArg::Dot, _) => {
            let dot = UpdateGraph::build(package.records()).to_dot(package.name());
            output::print_message(dot.trim_end())?;
        }
        (GraphFormatArg::Text, mode) => {
            output::print_graph(&output::graph_view(package), mode)?;
        }
    }
    Ok(())
}

/// Execute the export command
pub async fn execute_export(app: &App, args: &ExportArgs, output_mode: OutputMode) -> Result<()> {
    let imported = app.load_package(&args.dir).await?;
    let package = &imported.package;

    if package.report().has_errors() {
        tracing::warn!(
            package = %package.name(),
            errors = package.report().error_count(),
            "Exporting a package with validation errors"
        );
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| app.default_bundle_path(package));
    let mut options = app.export_options();
    if let Some(compression) = args.compression {
        options.compression = compression.into();
    }

    let summary = export::export_bundle(package, &output_path, &options)
        .await
        .with_context(|| format!("Failed to export '{}'", package.name()))?;
    output::print_export(&summary, output_mode)?;
    Ok(())
}

/// Execute the preview command
pub async fn execute_preview(app: &App, args: &PreviewArgs, output_mode: OutputMode) -> Result<()> {
    let imported = app.load_package(&args.dir).await?;
    let record = imported
        .package
        .record(&args.csv)
        .ok_or_else(|| Error::VersionNotFound(args.csv.clone()))?;

    match output_mode {
        OutputMode::Json => output::print_json(record.csv())?,
        OutputMode::Text => print!("{}", export::render_preview(record)?),
    }
    Ok(())
}

/// Execute the catalog command
pub async fn execute_catalog(app: &App, args: &CatalogArgs, output_mode: OutputMode) -> Result<()> {
    let (index, warnings) = app.open_catalog().await.with_context(|| {
        format!(
            "Failed to open catalog at {}",
            app.config().catalog_path(app.root()).display()
        )
    })?;
    for warning in &warnings {
        eprintln!("warning: skipped {}: {}", warning.path.display(), warning.message);
    }

    match &args.action {
        CatalogAction::List => {
            let entries = index.list().await?;
            output::print_catalog(&entries, output_mode)?;
        }
        CatalogAction::Search { query } => {
            let entries = index.search(query).await?;
            output::print_catalog(&entries, output_mode)?;
        }
        CatalogAction::Show { package } => {
            let entry = index
                .get(package)
                .await?
                .ok_or_else(|| Error::PackageNotFound(package.clone()))?;
            output::print_catalog_entry(&entry, output_mode)?;
        }
    }
    Ok(())
}
