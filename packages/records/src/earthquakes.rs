//! Earthquake CSV loading.
//!
//! Expects the USGS feed layout: at least `mag`, `latitude`, `longitude`,
//! `depth`, and `status` columns. Other columns are ignored.

use std::path::Path;

use quake_map_records_models::EarthquakeRecord;
use serde::Deserialize;

use crate::{LoadError, open_csv, present};

/// Columns the loader binds by name.
pub const EARTHQUAKE_COLUMNS: &[&str] = &["mag", "latitude", "longitude", "depth", "status"];

/// An earthquake row as it appears in the CSV, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EarthquakeRow {
    /// Event magnitude.
    #[serde(rename = "mag")]
    pub magnitude: Option<f64>,
    /// Epicenter latitude.
    pub latitude: Option<f64>,
    /// Epicenter longitude.
    pub longitude: Option<f64>,
    /// Hypocenter depth in kilometers.
    pub depth: Option<f64>,
    /// Review status.
    #[serde(default)]
    pub status: String,
}

impl EarthquakeRow {
    /// Converts into a record, naming the first missing field on failure.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing numeric column.
    pub fn into_record(self) -> Result<EarthquakeRecord, &'static str> {
        Ok(EarthquakeRecord {
            magnitude: present(self.magnitude).ok_or("mag")?,
            latitude: present(self.latitude).ok_or("latitude")?,
            longitude: present(self.longitude).ok_or("longitude")?,
            depth: present(self.depth).ok_or("depth")?,
            status: self.status,
        })
    }
}

/// Keeps only records whose status equals `status` exactly.
///
/// For records already in memory. [`load_earthquakes`] applies the same
/// exact match while reading, before a row is validated, so the two always
/// agree.
#[must_use]
pub fn filter_reviewed(
    records: impl IntoIterator<Item = EarthquakeRecord>,
    status: &str,
) -> Vec<EarthquakeRecord> {
    records
        .into_iter()
        .filter(|r| r.has_status(status))
        .collect()
}

/// Loads the earthquake CSV at `path`, keeping rows whose status equals
/// `status`.
///
/// Rows with any other status are skipped before validation, so a
/// non-matching row with blank numeric cells does not fail the load.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] if the file is missing,
/// [`LoadError::Csv`] on a CSV parse failure, or
/// [`LoadError::MalformedRow`] if a column is absent or a retained row
/// lacks a numeric value.
pub fn load_earthquakes(path: &Path, status: &str) -> Result<Vec<EarthquakeRecord>, LoadError> {
    let (mut reader, headers) = open_csv(path, EARTHQUAKE_COLUMNS)?;

    let mut raw = csv::StringRecord::new();
    let mut total = 0u64;
    let mut records = Vec::new();

    while reader.read_record(&mut raw)? {
        total += 1;
        let row: EarthquakeRow = raw.deserialize(Some(&headers))?;
        if row.status != status {
            continue;
        }

        let line = raw.position().map_or(0, csv::Position::line);
        let record = row
            .into_record()
            .map_err(|column| LoadError::MalformedRow {
                path: path.to_path_buf(),
                line,
                message: format!("missing value for '{column}'"),
            })?;
        records.push(record);
    }

    log::info!(
        "Loaded {} of {total} earthquakes with status '{status}' from {}",
        records.len(),
        path.display()
    );

    Ok(records)
}
