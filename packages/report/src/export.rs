//! Per-state release table.

use std::path::Path;

use quake_map_spatial::AggregatedPolygon;
use serde::Serialize;

/// Output file name.
pub const AGGREGATES_FILE: &str = "release_by_state.csv";

#[derive(Serialize)]
struct AggregateRow<'a> {
    polygon_index: usize,
    name: &'a str,
    amount_sum_kg: f64,
    normalized_amount_sum: f64,
}

/// Writes one row per aggregated state, in dataset order.
///
/// # Errors
///
/// Returns [`csv::Error`] if the file cannot be created or written.
pub fn write_aggregates(path: &Path, aggregated: &[AggregatedPolygon]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;

    for state in aggregated {
        writer.serialize(AggregateRow {
            polygon_index: state.polygon_index,
            name: state.name.as_deref().unwrap_or_default(),
            amount_sum_kg: state.amount_sum,
            normalized_amount_sum: state.normalized_amount_sum,
        })?;
    }

    writer.flush()?;
    log::info!("Wrote {} state totals to {}", aggregated.len(), path.display());
    Ok(())
}
