use std::path::{Path, PathBuf};
use tracing::info;

pub mod engine;
pub mod mapping;

pub use engine::{Outcome, RenameEngine, RunResult};
pub use mapping::{LoadError, MappingLoader, MappingTable, SheetSelector, DEFAULT_COLUMN};

#[derive(thiserror::Error, Debug)]
pub enum RenameError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("No valid mappings found in {path:?}")]
    EmptyMapping { path: PathBuf },
    #[error("Target must be an existing directory: {path:?}")]
    InvalidTarget { path: PathBuf },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything one rename run needs, fixed before the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub column: usize,
    pub sheet: SheetSelector,
    pub dry_run: bool,
}

impl RunConfig {
    pub fn new(source_path: impl Into<PathBuf>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
            column: DEFAULT_COLUMN,
            sheet: SheetSelector::default(),
            dry_run: false,
        }
    }

    pub fn loader(&self) -> MappingLoader {
        MappingLoader::new()
            .column(self.column)
            .sheet(self.sheet.clone())
    }
}

/// Loads the mapping from `source`, refusing one with no usable pairs.
pub fn load_mapping(loader: &MappingLoader, source: &Path) -> Result<MappingTable, RenameError> {
    ensure_mappings(loader.load(source)?, source)
}

fn ensure_mappings(mapping: MappingTable, source: &Path) -> Result<MappingTable, RenameError> {
    if mapping.is_empty() {
        return Err(RenameError::EmptyMapping {
            path: source.to_path_buf(),
        });
    }
    Ok(mapping)
}

/// Loads the mapping, then renames the folders under the target directory.
///
/// Load failures and an empty mapping abort before anything on disk is
/// touched; per-folder problems only show up in the returned counts.
pub fn run(config: &RunConfig) -> Result<RunResult, RenameError> {
    info!("Source spreadsheet: {:?}", config.source_path);
    info!("Target directory: {:?}", config.target_path);

    if !config.target_path.is_dir() {
        return Err(RenameError::InvalidTarget {
            path: config.target_path.clone(),
        });
    }

    let mapping = load_mapping(&config.loader(), &config.source_path)?;

    RenameEngine::new(&mapping)
        .dry_run(config.dry_run)
        .run(&config.target_path)
}
