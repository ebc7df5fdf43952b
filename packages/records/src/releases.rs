//! Toxic-release inventory (TRI) CSV loading.
//!
//! Keeps a single chemical, drops zero and incomplete releases, and
//! converts reported pounds to kilograms.

use std::path::Path;

use quake_map_records_models::ReleaseRecord;
use serde::Deserialize;

use crate::{LoadError, open_csv, present};

/// Columns the loader binds by name.
pub const RELEASE_COLUMNS: &[&str] = &[
    "CAS_CHEM_NAME",
    "TOTAL_ON_OFF_SITE_RELEASE",
    "LATITUDE",
    "LONGITUDE",
];

/// A TRI row as it appears in the CSV. Amounts are in pounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseRow {
    /// Chemical name.
    #[serde(rename = "CAS_CHEM_NAME")]
    pub chemical: String,
    /// Total on- and off-site release in pounds.
    #[serde(rename = "TOTAL_ON_OFF_SITE_RELEASE")]
    pub amount_lb: Option<f64>,
    /// Facility latitude.
    #[serde(rename = "LATITUDE")]
    pub latitude: Option<f64>,
    /// Facility longitude.
    #[serde(rename = "LONGITUDE")]
    pub longitude: Option<f64>,
}

impl ReleaseRow {
    /// Returns the converted record if this row is for `chemical`, has a
    /// non-zero amount, and carries a full location.
    #[must_use]
    pub fn select(&self, chemical: &str) -> Option<ReleaseRecord> {
        if self.chemical != chemical {
            return None;
        }
        let amount_lb = present(self.amount_lb).filter(|amount| *amount != 0.0)?;
        let latitude = present(self.latitude)?;
        let longitude = present(self.longitude)?;
        Some(ReleaseRecord::from_pounds(amount_lb, latitude, longitude))
    }
}

/// Applies the chemical, non-zero, and completeness filters to parsed rows.
#[must_use]
pub fn filter_releases(
    rows: impl IntoIterator<Item = ReleaseRow>,
    chemical: &str,
) -> Vec<ReleaseRecord> {
    rows.into_iter()
        .filter_map(|row| row.select(chemical))
        .collect()
}

/// Loads the TRI CSV at `path`, keeping non-zero `chemical` releases with
/// a complete location.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] if the file is missing,
/// [`LoadError::Csv`] on a CSV parse failure, or
/// [`LoadError::MalformedRow`] if a required column is absent.
pub fn load_releases(path: &Path, chemical: &str) -> Result<Vec<ReleaseRecord>, LoadError> {
    let (mut reader, headers) = open_csv(path, RELEASE_COLUMNS)?;

    let mut rows = Vec::new();
    let mut raw = csv::StringRecord::new();
    while reader.read_record(&mut raw)? {
        let row: ReleaseRow = raw.deserialize(Some(&headers))?;
        rows.push(row);
    }

    let total = rows.len();
    let records = filter_releases(rows, chemical);

    log::info!(
        "Loaded {} of {total} '{chemical}' releases from {}",
        records.len(),
        path.display()
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use quake_map_records_models::{POUNDS_TO_KILOGRAMS, TARGET_CHEMICAL};

    use super::*;

    fn row(chemical: &str, amount: Option<f64>, lat: Option<f64>, lon: Option<f64>) -> ReleaseRow {
        ReleaseRow {
            chemical: chemical.to_string(),
            amount_lb: amount,
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn keeps_non_zero_target_chemical() {
        let rows = vec![
            row(TARGET_CHEMICAL, Some(100.0), Some(40.0), Some(-100.0)),
            row(TARGET_CHEMICAL, Some(0.0), Some(40.0), Some(-100.0)),
            row("Toluene", Some(50.0), Some(40.0), Some(-100.0)),
            row(TARGET_CHEMICAL, None, Some(40.0), Some(-100.0)),
            row(TARGET_CHEMICAL, Some(7.0), None, Some(-100.0)),
            row(TARGET_CHEMICAL, Some(f64::NAN), Some(40.0), Some(-100.0)),
            row(TARGET_CHEMICAL, Some(2.5), Some(35.0), Some(-80.0)),
        ];

        let records = filter_releases(rows, TARGET_CHEMICAL);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount_kg, 100.0 * POUNDS_TO_KILOGRAMS);
        assert_eq!(records[1].amount_kg, 2.5 * POUNDS_TO_KILOGRAMS);
        assert!(records.iter().all(|r| r.amount_kg != 0.0));
    }

    #[test]
    fn chemical_match_is_exact() {
        let rows = vec![row("n-hexane", Some(1.0), Some(1.0), Some(1.0))];
        assert!(filter_releases(rows, TARGET_CHEMICAL).is_empty());
    }

    #[test]
    fn loads_from_csv_ignoring_extra_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"YEAR,FACILITY_NAME,LATITUDE,LONGITUDE,CAS_CHEM_NAME,TOTAL_ON_OFF_SITE_RELEASE\n\
              2022,Plant A,29.7,-95.2,n-Hexane,1000\n\
              2022,Plant B,29.8,-95.3,Benzene,400\n\
              2022,Plant C,,-95.3,n-Hexane,12\n\
              2022,Plant D,41.6,-87.5,n-Hexane,0\n\
              2022,Plant E,41.7,-87.6, n-Hexane ,3.5\n",
        )
        .unwrap();

        let records = load_releases(file.path(), TARGET_CHEMICAL).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount_kg, 1000.0 * POUNDS_TO_KILOGRAMS);
        assert!((records[0].latitude - 29.7).abs() < f64::EPSILON);
        assert!((records[1].longitude - -87.6).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_release_column_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"CAS_CHEM_NAME,LATITUDE,LONGITUDE\nn-Hexane,1,1\n")
            .unwrap();

        let err = load_releases(file.path(), TARGET_CHEMICAL).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { line: 1, .. }));
    }
}
