use clap::{Args, Parser, Subcommand};
use folder_rename_core::SheetSelector;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folder-rename")]
#[command(version)]
#[command(about = "Rename folders using an identifier/name spreadsheet")]
#[command(long_about = "Renames the folders two levels below a target directory. Each folder name is looked up in a spreadsheet of identifier/name row pairs: identifiers become names, and names become identifiers.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    #[arg(short, long, env = "FOLDER_RENAME_SOURCE", help = "Spreadsheet holding identifier/name row pairs")]
    pub source: Option<PathBuf>,

    #[arg(short, long, env = "FOLDER_RENAME_COLUMN", default_value_t = folder_rename_core::DEFAULT_COLUMN, help = "Zero-based column holding identifiers and names")]
    pub column: usize,

    #[arg(long, env = "FOLDER_RENAME_SHEET", default_value = "0", help = "Sheet index, or name (prefix with name: for all-digit names)")]
    pub sheet: SheetSelector,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Rename folders according to the spreadsheet")]
    Rename {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short, long, env = "FOLDER_RENAME_TARGET", help = "Directory whose subfolders hold the folders to rename")]
        target: Option<PathBuf>,

        #[arg(long, help = "Perform a dry run without making changes")]
        dry_run: bool,

        #[arg(short, long, help = "Rename without asking for confirmation")]
        yes: bool,
    },

    #[command(about = "Print the mapping read from the spreadsheet")]
    Show {
        #[command(flatten)]
        source: SourceArgs,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
