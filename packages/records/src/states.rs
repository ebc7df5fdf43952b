//! State boundary shapefile loading.
//!
//! Reads the Census cartographic boundary shapefile (`.shp` plus its `.shx`
//! and `.dbf` sidecars). Each shape becomes one [`StatePolygon`] in dataset
//! order; that order is the polygon's identity for the spatial join.

use std::path::Path;

use geo::MultiPolygon;
use quake_map_records_models::StatePolygon;
use shapefile::dbase::{FieldValue, Record};

use crate::{LoadError, require_file};

/// Attribute column holding the state name.
const NAME_FIELD: &str = "NAME";

/// Attribute column holding the postal abbreviation.
const ABBREVIATION_FIELD: &str = "STUSPS";

/// Loads every polygon in the shapefile at `path`.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] if the `.shp` file is missing, or
/// [`LoadError::Shapefile`] if it or a sidecar cannot be decoded.
pub fn load_states(path: &Path) -> Result<Vec<StatePolygon>, LoadError> {
    require_file(path)?;

    let shapes = shapefile::read_as::<_, shapefile::Polygon, Record>(path)?;

    let states: Vec<StatePolygon> = shapes
        .into_iter()
        .map(|(polygon, record)| StatePolygon {
            name: text_field(&record, NAME_FIELD),
            abbreviation: text_field(&record, ABBREVIATION_FIELD),
            geometry: MultiPolygon::<f64>::from(polygon),
        })
        .collect();

    log::info!(
        "Loaded {} state polygons from {}",
        states.len(),
        path.display()
    );

    Ok(states)
}

/// Reads a non-empty character attribute.
fn text_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(value))) => {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }
        _ => None,
    }
}
