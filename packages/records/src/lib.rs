#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading and filtering.
//!
//! Reads the earthquake CSV, the toxic-release inventory CSV, and the state
//! boundary shapefile from disk, applies the fixed row filters and unit
//! conversions, and returns typed records from
//! [`quake_map_records_models`]. Any missing file or malformed row aborts
//! the load; there is no partial success.

pub mod earthquakes;
pub mod paths;
pub mod releases;
pub mod states;

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use earthquakes::{filter_reviewed, load_earthquakes};
pub use releases::{filter_releases, load_releases};
pub use states::load_states;

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file does not exist.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// CSV parsing failed (bad quoting, unparseable value, missing column).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row parsed but lacks a value the record needs.
    #[error("Malformed row at {}:{line}: {message}", .path.display())]
    MalformedRow {
        /// File the row came from.
        path: PathBuf,
        /// One-based line number of the row.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// The boundary shapefile could not be decoded.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),
}

/// Returns [`LoadError::FileNotFound`] unless `path` exists.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] if the path does not exist.
pub fn require_file(path: &Path) -> Result<(), LoadError> {
    if path.exists() {
        Ok(())
    } else {
        Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Opens a CSV file with trimmed fields and checks that every column in
/// `required` is present in the header row.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] if the file is missing,
/// [`LoadError::Csv`] if the header row cannot be read, or
/// [`LoadError::MalformedRow`] if a required column is absent.
pub(crate) fn open_csv(
    path: &Path,
    required: &[&str],
) -> Result<(csv::Reader<File>, csv::StringRecord), LoadError> {
    require_file(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(LoadError::MalformedRow {
            path: path.to_path_buf(),
            line: 1,
            message: format!("missing column '{missing}'"),
        });
    }

    Ok((reader, headers))
}

/// Treats `NaN` the same as an empty cell.
pub(crate) fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}
