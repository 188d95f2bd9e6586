mod cli;
mod prompt;

use anyhow::Result;
use cli::{Cli, Commands, SourceArgs};
use folder_rename_core::{MappingLoader, RunConfig, RunResult};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting folder-rename");

    match cli.command {
        Commands::Rename {
            source,
            target,
            dry_run,
            yes,
        } => {
            handle_rename_command(source, target, dry_run, yes, cli.verbose)?;
        }
        Commands::Show { source } => {
            handle_show_command(source)?;
        }
    }

    info!("folder-rename completed successfully");
    Ok(())
}

fn handle_rename_command(
    source: SourceArgs,
    target: Option<PathBuf>,
    dry_run: bool,
    yes: bool,
    verbose: bool,
) -> Result<()> {
    let source_path = prompt::spreadsheet_path(source.source)?;
    let target_path = prompt::target_path(target)?;

    let config = RunConfig {
        source_path,
        target_path,
        column: source.column,
        sheet: source.sheet,
        dry_run,
    };

    info!("Column: {}", config.column);
    info!("Sheet: {}", config.sheet);

    if !dry_run && !yes && !prompt::confirm_rename(&config.source_path, &config.target_path)? {
        warn!("Renaming cancelled");
        return Ok(());
    }

    let result = folder_rename_core::run(&config)?;

    print_summary(&result, dry_run, verbose);

    Ok(())
}

fn handle_show_command(source: SourceArgs) -> Result<()> {
    let source_path = prompt::spreadsheet_path(source.source)?;
    let loader = MappingLoader::new()
        .column(source.column)
        .sheet(source.sheet);

    let mapping = folder_rename_core::load_mapping(&loader, &source_path)?;

    let mut pairs: Vec<_> = mapping.forward().iter().collect();
    pairs.sort();

    for (identifier, name) in pairs {
        println!("{} -> {}", identifier, name);
    }
    println!("{} mapping(s) loaded from {}", mapping.len(), source_path.display());

    Ok(())
}

fn print_summary(result: &RunResult, dry_run: bool, verbose: bool) {
    if dry_run {
        println!("Dry run complete!");
    } else {
        println!("Renaming complete!");
    }
    println!("  Folders examined: {}", result.total);
    println!("  Renamed: {}", result.succeeded);
    println!("  Not renamed: {}", result.not_renamed());
    if verbose {
        println!("  Already named: {}", result.unchanged());
        println!("  Failed: {}", result.failed);
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}
