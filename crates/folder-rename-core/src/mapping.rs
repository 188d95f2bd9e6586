use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, info, warn};

/// Column read when no other is configured (the second column, `B`).
pub const DEFAULT_COLUMN: usize = 1;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Unable to open spreadsheet {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("Sheet not found: {sheet}")]
    SheetNotFound { sheet: SheetSelector },
    #[error("Unable to read sheet {sheet}: {source}")]
    Sheet {
        sheet: SheetSelector,
        #[source]
        source: calamine::Error,
    },
    #[error("Column {column} is outside the sheet, which is {width} column(s) wide")]
    ColumnOutOfRange { column: usize, width: usize },
}

/// Which worksheet of a workbook holds the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(index) => write!(f, "#{}", index),
            SheetSelector::Name(name) => write!(f, "'{}'", name),
        }
    }
}

impl FromStr for SheetSelector {
    type Err = std::convert::Infallible;

    /// Digits select by position; `name:` forces a name, for sheets like "2024".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("name:") {
            return Ok(SheetSelector::Name(name.to_string()));
        }
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = s.parse() {
                return Ok(SheetSelector::Index(index));
            }
        }
        Ok(SheetSelector::Name(s.to_string()))
    }
}

/// Identifier to name lookups, kept as two separate maps.
///
/// Identifiers and names share a string domain, so a single symmetric map
/// could not tell which side a key came from. Lookups go through
/// [`MappingTable::resolve`], which always consults `forward` before
/// `reverse`.
#[derive(Debug, Default, Clone)]
pub struct MappingTable {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one identifier/name pair. Both sides are trimmed; a pair with
    /// an empty side is ignored and `false` is returned.
    pub fn insert(&mut self, identifier: &str, name: &str) -> bool {
        let identifier = identifier.trim();
        let name = name.trim();
        if identifier.is_empty() || name.is_empty() {
            return false;
        }

        if let Some(previous) = self.forward.insert(identifier.to_string(), name.to_string()) {
            if previous != name {
                warn!("Identifier '{}' remapped: '{}' -> '{}'", identifier, previous, name);
            }
        }
        if let Some(previous) = self.reverse.insert(name.to_string(), identifier.to_string()) {
            if previous != identifier {
                warn!("Name '{}' remapped: '{}' -> '{}'", name, previous, identifier);
            }
        }
        debug!("Mapping added: {} <-> {}", identifier, name);
        true
    }

    pub fn forward(&self) -> &HashMap<String, String> {
        &self.forward
    }

    pub fn reverse(&self) -> &HashMap<String, String> {
        &self.reverse
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Target name for a folder: identifier -> name first, then name -> identifier.
    pub fn resolve(&self, folder_name: &str) -> Option<&str> {
        self.forward
            .get(folder_name)
            .or_else(|| self.reverse.get(folder_name))
            .map(String::as_str)
    }
}

impl<I: AsRef<str>, N: AsRef<str>> FromIterator<(I, N)> for MappingTable {
    fn from_iter<T: IntoIterator<Item = (I, N)>>(iter: T) -> Self {
        let mut table = MappingTable::new();
        for (identifier, name) in iter {
            table.insert(identifier.as_ref(), name.as_ref());
        }
        table
    }
}

/// Reads paired rows out of a worksheet: even rows hold identifiers, the odd
/// row after each holds the matching name.
#[derive(Debug, Clone)]
pub struct MappingLoader {
    column: usize,
    sheet: SheetSelector,
}

impl Default for MappingLoader {
    fn default() -> Self {
        Self {
            column: DEFAULT_COLUMN,
            sheet: SheetSelector::default(),
        }
    }
}

impl MappingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    pub fn sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn load(&self, path: &Path) -> Result<MappingTable, LoadError> {
        info!("Loading mapping from {:?} (sheet {}, column {})", path, self.sheet, self.column);

        let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let range = match &self.sheet {
            SheetSelector::Index(index) => workbook
                .worksheet_range_at(*index)
                .ok_or_else(|| LoadError::SheetNotFound {
                    sheet: self.sheet.clone(),
                })?,
            SheetSelector::Name(name) => {
                if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
                    return Err(LoadError::SheetNotFound {
                        sheet: self.sheet.clone(),
                    });
                }
                workbook.worksheet_range(name)
            }
        }
        .map_err(|source| LoadError::Sheet {
            sheet: self.sheet.clone(),
            source,
        })?;

        self.read_range(&range)
    }

    /// Builds the mapping from an already-read worksheet.
    ///
    /// Positions are absolute: row 0 is the sheet's first row and column 0 is
    /// column `A`, wherever the used range happens to start.
    pub fn read_range(&self, range: &Range<Data>) -> Result<MappingTable, LoadError> {
        let mut table = MappingTable::new();

        let Some((last_row, last_col)) = range.end() else {
            warn!("Sheet is empty");
            return Ok(table);
        };

        let width = last_col as usize + 1;
        if self.column >= width {
            return Err(LoadError::ColumnOutOfRange {
                column: self.column,
                width,
            });
        }

        let rows = last_row as usize + 1;
        let mut row = 0;
        while row + 1 < rows {
            let identifier = cell_text(range, row, self.column);
            let name = cell_text(range, row + 1, self.column);
            if !table.insert(&identifier, &name) {
                warn!(
                    "Skipping rows {} and {}: identifier or name is empty",
                    row,
                    row + 1
                );
            }
            row += 2;
        }

        if rows % 2 == 1 {
            warn!("Skipping row {}: no name row follows it", rows - 1);
        }

        info!("Loaded {} mapping(s)", table.len());
        Ok(table)
    }
}

fn cell_text(range: &Range<Data>, row: usize, column: usize) -> String {
    let (Ok(row), Ok(column)) = (u32::try_from(row), u32::try_from(column)) else {
        return String::new();
    };

    match range.get_value((row, column)) {
        None | Some(Data::Empty) | Some(Data::Error(_)) => String::new(),
        Some(Data::String(text)) => text.trim().to_string(),
        Some(Data::Int(value)) => value.to_string(),
        // f64's Display never prints a trailing ".0", so 101.0 reads as "101"
        Some(Data::Float(value)) => value.to_string(),
        Some(Data::Bool(value)) => value.to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}
