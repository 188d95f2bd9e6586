use anyhow::Result;
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, Text};
use std::path::{Path, PathBuf};

/// Returns `given`, or asks for the spreadsheet path when none was supplied.
pub fn spreadsheet_path(given: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = given {
        return Ok(path);
    }

    let answer = Text::new("Spreadsheet with the folder mapping:")
        .with_help_message("Identifier rows followed by name rows, e.g. mapping.xlsx")
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            Ok(match check_spreadsheet(Path::new(input.trim())) {
                Ok(()) => Validation::Valid,
                Err(message) => Validation::Invalid(message.into()),
            })
        })
        .prompt()?;

    Ok(PathBuf::from(answer.trim()))
}

/// Returns `given`, or asks for the directory whose subfolders hold the folders to rename.
pub fn target_path(given: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = given {
        return Ok(path);
    }

    let answer = Text::new("Directory containing the folders to rename:")
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            Ok(match check_directory(Path::new(input.trim())) {
                Ok(()) => Validation::Valid,
                Err(message) => Validation::Invalid(message.into()),
            })
        })
        .prompt()?;

    Ok(PathBuf::from(answer.trim()))
}

pub fn confirm_rename(source: &Path, target: &Path) -> Result<bool> {
    println!("\n📁 Folders under {} will be renamed", target.display());
    println!("   using mappings from {}", source.display());

    let proceed = Confirm::new("Start renaming?")
        .with_default(true)
        .prompt()?;

    Ok(proceed)
}

fn check_spreadsheet(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("Please enter a path".to_string());
    }
    if !path.is_file() {
        return Err(format!("Not a file: {}", path.display()));
    }
    Ok(())
}

fn check_directory(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("Please enter a path".to_string());
    }
    if !path.is_dir() {
        return Err(format!("Not a directory: {}", path.display()));
    }
    Ok(())
}
