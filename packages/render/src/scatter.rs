//! Earthquake scatter plot by magnitude band.

use std::path::{Path, PathBuf};

use quake_map_records_models::{BandPartition, EarthquakeRecord, MagnitudeBand, StatePolygon};

use crate::color::{OUTLINE, SCATTER_OPACITY, band_color};
use crate::figure::{BaseMapLayer, MapBounds, MapFigure, Marker, ScatterLayer};
use crate::{RenderError, RenderOptions};

/// Output file name.
pub const SCATTER_FILE: &str = "earthquakes_scatter.png";

/// Marker area for every earthquake on the scatter plot, in points².
pub const QUAKE_MARKER_SIZE: f64 = 36.0;

/// Legend columns above the scatter plot.
pub const LEGEND_COLUMNS: usize = 3;

/// Builds the scatter plot: state outlines, then one layer per magnitude
/// band from low to high.
#[must_use]
pub fn scatter_figure(quakes: &[EarthquakeRecord], states: &[StatePolygon]) -> MapFigure {
    let partition = BandPartition::from_records(quakes);

    let base = BaseMapLayer {
        polygons: states.iter().map(|s| s.geometry.clone()).collect(),
        fill: None,
        edge: OUTLINE,
    };

    MagnitudeBand::all().iter().fold(
        MapFigure::new(MapBounds::CONTIGUOUS_US)
            .with_legend(LEGEND_COLUMNS)
            .layer(base),
        |figure, band| {
            let markers = partition
                .get(*band)
                .iter()
                .map(|q| Marker::new(q.longitude, q.latitude, QUAKE_MARKER_SIZE));
            figure.layer(
                ScatterLayer::new(band_color(*band), SCATTER_OPACITY)
                    .with_label(band.label())
                    .with_markers(markers),
            )
        },
    )
}

/// Renders the scatter plot to `<out_dir>/earthquakes_scatter.png`.
///
/// # Errors
///
/// Returns [`RenderError`] if the directory cannot be created or the image
/// cannot be drawn.
pub fn plot_earthquakes_scatter(
    quakes: &[EarthquakeRecord],
    states: &[StatePolygon],
    out_dir: &Path,
    options: &RenderOptions,
) -> Result<PathBuf, RenderError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(SCATTER_FILE);

    let partition = BandPartition::from_records(quakes);
    log::info!(
        "Plotting {} earthquakes ({} low, {} medium, {} high)",
        partition.len(),
        partition.low.len(),
        partition.medium.len(),
        partition.high.len()
    );

    scatter_figure(quakes, states)
        .with_size(options.width, options.height)
        .render(&path, options.font.as_deref())?;

    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Polygon};
    use quake_map_records_models::REVIEWED_STATUS;

    use super::*;
    use crate::figure::{Layer, LayerKind};

    fn quake(magnitude: f64, latitude: f64, longitude: f64) -> EarthquakeRecord {
        EarthquakeRecord {
            magnitude,
            latitude,
            longitude,
            depth: 12.0,
            status: REVIEWED_STATUS.to_string(),
        }
    }

    fn state() -> StatePolygon {
        let exterior = LineString::from(vec![
            (-120.0, 32.0),
            (-114.0, 32.0),
            (-114.0, 42.0),
            (-120.0, 42.0),
            (-120.0, 32.0),
        ]);
        StatePolygon::new(MultiPolygon(vec![Polygon::new(exterior, vec![])]))
            .with_name("California")
    }

    fn quakes() -> Vec<EarthquakeRecord> {
        vec![
            quake(1.2, 35.0, -117.0),
            quake(2.5, 36.0, -118.0),
            quake(3.7, 37.0, -119.0),
            quake(4.5, 38.0, -119.5),
            quake(6.1, 40.5, -124.5),
        ]
    }

    #[test]
    fn outlines_then_three_bands() {
        let figure = scatter_figure(&quakes(), &[state()]);

        assert_eq!(
            figure.layer_kinds(),
            vec![
                LayerKind::BaseMap,
                LayerKind::Scatter,
                LayerKind::Scatter,
                LayerKind::Scatter
            ]
        );
        assert_eq!(
            figure.legend_labels(),
            vec!["mag <= 2.5", "2.5 < mag <= 4.5", "mag > 4.5"]
        );
        assert_eq!(figure.bounds(), &MapBounds::CONTIGUOUS_US);
    }

    #[test]
    fn base_map_has_no_fill() {
        let figure = scatter_figure(&quakes(), &[state()]);
        let Layer::BaseMap(base) = &figure.layers()[0] else {
            panic!("first layer is not the base map");
        };
        assert!(base.fill.is_none());
        assert_eq!(base.polygons.len(), 1);
    }

    #[test]
    fn band_layers_split_markers() {
        let figure = scatter_figure(&quakes(), &[state()]);
        let counts: Vec<usize> = figure.layers()[1..]
            .iter()
            .map(|layer| match layer {
                Layer::Scatter(scatter) => {
                    assert!((scatter.opacity - SCATTER_OPACITY).abs() < f64::EPSILON);
                    scatter.markers.len()
                }
                other => panic!("unexpected layer {:?}", other.kind()),
            })
            .collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn writes_non_empty_png() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("plots");

        let path =
            plot_earthquakes_scatter(&quakes(), &[state()], &out_dir, &RenderOptions::default())
                .unwrap();

        assert_eq!(path, out_dir.join(SCATTER_FILE));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
