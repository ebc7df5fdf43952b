//! Toxic-release choropleth with earthquake and facility markers.
//!
//! Layer order is fixed: base map, choropleth fill, earthquake halos,
//! earthquake centers, facilities.

use std::path::{Path, PathBuf};

use quake_map_records_models::{EarthquakeRecord, ReleaseRecord, StatePolygon, overlay_sites};
use quake_map_spatial::{AggregatedPolygon, summarize};

use crate::color::{
    BASE_FILL, BASE_FILL_OPACITY, BLACK, CHOROPLETH_OPACITY, OUTLINE, PURPLE, RED,
    SCATTER_OPACITY, choropleth_color,
};
use crate::figure::{
    BaseMapLayer, ChoroplethLayer, Fill, MapBounds, MapFigure, Marker, ScatterLayer,
};
use crate::{RenderError, RenderOptions};

/// Output file name.
pub const TRI_FILE: &str = "earthquakes_tri.png";

/// Marker area for earthquake centers, in points².
pub const CENTER_MARKER_SIZE: f64 = 1.0;

/// Marker area for release facilities, in points².
pub const FACILITY_MARKER_SIZE: f64 = 3.0;

/// A rendered overlay and the per-state totals it was shaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct TriPlot {
    /// Written image.
    pub path: PathBuf,
    /// Per-state release totals, in dataset order.
    pub aggregated: Vec<AggregatedPolygon>,
}

/// Builds the overlay from already aggregated per-state totals.
///
/// Earthquakes below `min_magnitude` are left out. Halo marker size is the
/// raw depth, unscaled.
#[must_use]
pub fn tri_figure(
    quakes: &[EarthquakeRecord],
    states: &[StatePolygon],
    aggregated: &[AggregatedPolygon],
    releases: &[ReleaseRecord],
    min_magnitude: f64,
) -> MapFigure {
    let sites = overlay_sites(quakes, min_magnitude);

    let base = BaseMapLayer {
        polygons: states.iter().map(|s| s.geometry.clone()).collect(),
        fill: Some(Fill {
            color: BASE_FILL,
            opacity: BASE_FILL_OPACITY,
        }),
        edge: OUTLINE,
    };

    let choropleth = ChoroplethLayer {
        regions: aggregated
            .iter()
            .map(|a| (a.geometry.clone(), choropleth_color(a.normalized_amount_sum)))
            .collect(),
        opacity: CHOROPLETH_OPACITY,
    };

    let halos = ScatterLayer::new(RED, SCATTER_OPACITY).with_markers(
        sites
            .iter()
            .map(|s| Marker::new(s.longitude, s.latitude, s.depth)),
    );

    let centers = ScatterLayer::new(BLACK, 1.0).with_markers(
        sites
            .iter()
            .map(|s| Marker::new(s.longitude, s.latitude, CENTER_MARKER_SIZE)),
    );

    let facilities = ScatterLayer::new(PURPLE, 1.0).with_markers(
        releases
            .iter()
            .map(|r| Marker::new(r.longitude, r.latitude, FACILITY_MARKER_SIZE)),
    );

    MapFigure::new(MapBounds::CONTIGUOUS_US)
        .layer(base)
        .layer(choropleth)
        .layer(halos)
        .layer(centers)
        .layer(facilities)
}

/// Aggregates releases per state and renders the overlay to
/// `<out_dir>/earthquakes_tri.png`.
///
/// # Errors
///
/// Returns [`RenderError`] if the directory cannot be created or the image
/// cannot be drawn.
pub fn plot_earthquakes_tri(
    quakes: &[EarthquakeRecord],
    states: &[StatePolygon],
    releases: &[ReleaseRecord],
    out_dir: &Path,
    options: &RenderOptions,
) -> Result<TriPlot, RenderError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(TRI_FILE);

    let aggregated = summarize(releases, states);
    log::info!(
        "Plotting release totals for {} states with {} facilities",
        aggregated.len(),
        releases.len()
    );

    tri_figure(
        quakes,
        states,
        &aggregated,
        releases,
        options.overlay_min_magnitude,
    )
    .with_size(options.width, options.height)
    .render(&path, options.font.as_deref())?;

    log::info!("Wrote {}", path.display());
    Ok(TriPlot { path, aggregated })
}
