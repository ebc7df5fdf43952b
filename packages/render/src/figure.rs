//! Layer stack for a single map image.
//!
//! A [`MapFigure`] holds a fixed geographic window and an ordered list of
//! [`Layer`]s. Layers are drawn in insertion order, so later layers cover
//! earlier ones where they overlap. Axes and grid lines are never drawn.

use std::ops::Range;
use std::path::Path;

use geo::{LineString, MultiPolygon};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::{RenderError, draw_error, font};

/// Default image width in pixels.
pub const DEFAULT_WIDTH: u32 = 640;

/// Default image height in pixels.
pub const DEFAULT_HEIGHT: u32 = 480;

/// Pixels per inch used to turn marker areas (points²) into pixel radii.
const DPI: f64 = 100.0;

const PLOT_MARGIN: u32 = 5;
const LEGEND_ROW_HEIGHT: u32 = 22;
const LEGEND_PADDING: u32 = 6;
const LEGEND_SWATCH_RADIUS: i32 = 5;
const LEGEND_FONT_SIZE: f64 = 13.0;

type MapChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Longitude/latitude window of a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapBounds {
    /// Longitude range in degrees.
    pub longitude: Range<f64>,
    /// Latitude range in degrees.
    pub latitude: Range<f64>,
}

impl MapBounds {
    /// Lower 48 states.
    pub const CONTIGUOUS_US: Self = Self {
        longitude: -130.0..-65.0,
        latitude: 20.0..50.0,
    };

    /// Returns `true` if the point lies inside the window, edges included.
    #[must_use]
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        (self.longitude.start..=self.longitude.end).contains(&longitude)
            && (self.latitude.start..=self.latitude.end).contains(&latitude)
    }
}

/// A single scatter marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Marker area in points².
    pub size: f64,
}

impl Marker {
    /// Creates a marker.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64, size: f64) -> Self {
        Self {
            longitude,
            latitude,
            size,
        }
    }

    /// Pixel radius for this marker's area, or `None` if the size is not
    /// positive. Visible markers are at least one pixel wide.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn radius(&self) -> Option<u32> {
        if self.size.is_nan() || self.size <= 0.0 {
            return None;
        }
        let radius = self.size.sqrt() / 2.0 * DPI / 72.0;
        Some(radius.round().max(1.0) as u32)
    }
}

/// Polygon fill color and opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    /// Fill color.
    pub color: RGBColor,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// State boundaries, outlined and optionally filled.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapLayer {
    /// Boundaries to draw.
    pub polygons: Vec<MultiPolygon<f64>>,
    /// Fill, or `None` for outlines only. The fill covers each exterior
    /// ring whole; holes are filled too and only show as outlines.
    pub fill: Option<Fill>,
    /// Outline color.
    pub edge: RGBColor,
}

/// Per-region fills with a shared opacity.
///
/// Like [`BaseMapLayer::fill`], only exterior rings are filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethLayer {
    /// Regions and their colors.
    pub regions: Vec<(MultiPolygon<f64>, RGBColor)>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Markers sharing one color.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterLayer {
    /// Legend label; unlabeled layers are left out of the legend.
    pub label: Option<String>,
    /// Marker color.
    pub color: RGBColor,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Markers in draw order.
    pub markers: Vec<Marker>,
}

impl ScatterLayer {
    /// Creates an empty, unlabeled layer.
    #[must_use]
    pub const fn new(color: RGBColor, opacity: f64) -> Self {
        Self {
            label: None,
            color,
            opacity,
            markers: Vec::new(),
        }
    }

    /// Sets the legend label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends markers.
    #[must_use]
    pub fn with_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.markers.extend(markers);
        self
    }
}

/// One drawing pass of a [`MapFigure`].
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// State boundaries.
    BaseMap(BaseMapLayer),
    /// Per-region fills.
    Choropleth(ChoroplethLayer),
    /// Point markers.
    Scatter(ScatterLayer),
}

/// Discriminant of a [`Layer`], for asserting layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// [`Layer::BaseMap`]
    BaseMap,
    /// [`Layer::Choropleth`]
    Choropleth,
    /// [`Layer::Scatter`]
    Scatter,
}

impl Layer {
    /// Returns the kind of this layer.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        match self {
            Self::BaseMap(_) => LayerKind::BaseMap,
            Self::Choropleth(_) => LayerKind::Choropleth,
            Self::Scatter(_) => LayerKind::Scatter,
        }
    }
}

impl From<BaseMapLayer> for Layer {
    fn from(layer: BaseMapLayer) -> Self {
        Self::BaseMap(layer)
    }
}

impl From<ChoroplethLayer> for Layer {
    fn from(layer: ChoroplethLayer) -> Self {
        Self::Choropleth(layer)
    }
}

impl From<ScatterLayer> for Layer {
    fn from(layer: ScatterLayer) -> Self {
        Self::Scatter(layer)
    }
}

/// An ordered stack of layers over a fixed map window.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFigure {
    bounds: MapBounds,
    width: u32,
    height: u32,
    legend_columns: usize,
    layers: Vec<Layer>,
}

impl MapFigure {
    /// Creates an empty figure at the default size with no legend.
    #[must_use]
    pub const fn new(bounds: MapBounds) -> Self {
        Self {
            bounds,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            legend_columns: 0,
            layers: Vec::new(),
        }
    }

    /// Sets the image size in pixels.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Places a legend of labeled scatter layers above the map, laid out
    /// in `columns` columns. Zero disables the legend.
    #[must_use]
    pub const fn with_legend(mut self, columns: usize) -> Self {
        self.legend_columns = columns;
        self
    }

    /// Pushes a layer on top of the stack.
    #[must_use]
    pub fn layer(mut self, layer: impl Into<Layer>) -> Self {
        self.layers.push(layer.into());
        self
    }

    /// Layers in draw order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer kinds in draw order.
    #[must_use]
    pub fn layer_kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(Layer::kind).collect()
    }

    /// Map window.
    #[must_use]
    pub const fn bounds(&self) -> &MapBounds {
        &self.bounds
    }

    /// Image size in pixels.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Legend labels in layer order.
    #[must_use]
    pub fn legend_labels(&self) -> Vec<&str> {
        self.legend_entries()
            .iter()
            .map(|layer| layer.label.as_deref().unwrap_or_default())
            .collect()
    }

    fn legend_entries(&self) -> Vec<&ScatterLayer> {
        if self.legend_columns == 0 {
            return Vec::new();
        }
        self.layers
            .iter()
            .filter_map(|layer| match layer {
                Layer::Scatter(scatter) if scatter.label.is_some() => Some(scatter),
                _ => None,
            })
            .collect()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn legend_height(&self, entries: usize) -> u32 {
        if entries == 0 {
            return 0;
        }
        let rows = entries.div_ceil(self.legend_columns) as u32;
        rows * LEGEND_ROW_HEIGHT + 2 * LEGEND_PADDING
    }

    /// Draws every layer and the legend, then writes a PNG to `path`.
    ///
    /// `font` is the legend font to register if none has been yet.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Draw`] if the backend fails to draw or encode
    /// the image.
    pub fn render(&self, path: &Path, font: Option<&Path>) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let entries = self.legend_entries();
        let (legend_area, plot_area) = root.split_vertically(self.legend_height(entries.len()));

        {
            let mut chart = ChartBuilder::on(&plot_area)
                .margin(PLOT_MARGIN)
                .build_cartesian_2d(self.bounds.longitude.clone(), self.bounds.latitude.clone())
                .map_err(draw_error)?;

            for layer in &self.layers {
                self.draw_layer(&mut chart, layer)?;
            }
        }

        if !entries.is_empty() {
            // Covers anything drawn past the northern edge of the map.
            legend_area.fill(&WHITE).map_err(draw_error)?;
            let font_ready = font::ensure_legend_font(font);
            draw_legend(&legend_area, &entries, self.legend_columns, font_ready)?;
        }

        root.present().map_err(draw_error)?;
        log::debug!(
            "Rendered {} layers to {}",
            self.layers.len(),
            path.display()
        );

        Ok(())
    }

    fn draw_layer(&self, chart: &mut MapChart<'_, '_>, layer: &Layer) -> Result<(), RenderError> {
        match layer {
            Layer::BaseMap(base) => {
                if let Some(fill) = base.fill {
                    let style = fill.color.mix(fill.opacity).filled();
                    chart
                        .draw_series(
                            base.polygons
                                .iter()
                                .flat_map(exteriors)
                                .map(|ring| Polygon::new(ring, style)),
                        )
                        .map_err(draw_error)?;
                }
                let edge = base.edge.stroke_width(1);
                chart
                    .draw_series(
                        base.polygons
                            .iter()
                            .flat_map(all_rings)
                            .map(|ring| PathElement::new(ring, edge)),
                    )
                    .map_err(draw_error)?;
            }
            Layer::Choropleth(choropleth) => {
                chart
                    .draw_series(choropleth.regions.iter().flat_map(|(geometry, color)| {
                        let style = color.mix(choropleth.opacity).filled();
                        exteriors(geometry)
                            .into_iter()
                            .map(move |ring| Polygon::new(ring, style))
                    }))
                    .map_err(draw_error)?;
            }
            Layer::Scatter(scatter) => {
                let style = scatter.color.mix(scatter.opacity).filled();
                chart
                    .draw_series(scatter.markers.iter().filter_map(|marker| {
                        if !self.bounds.contains(marker.longitude, marker.latitude) {
                            return None;
                        }
                        marker.radius().map(|radius| {
                            Circle::new((marker.longitude, marker.latitude), radius, style)
                        })
                    }))
                    .map_err(draw_error)?;
            }
        }
        Ok(())
    }
}

fn ring_points(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    ring.coords().map(|c| (c.x, c.y)).collect()
}

fn exteriors(geometry: &MultiPolygon<f64>) -> Vec<Vec<(f64, f64)>> {
    geometry
        .iter()
        .map(|polygon| ring_points(polygon.exterior()))
        .collect()
}

fn all_rings(geometry: &MultiPolygon<f64>) -> Vec<Vec<(f64, f64)>> {
    geometry
        .iter()
        .flat_map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(ring_points)
        })
        .collect()
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn draw_legend(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    entries: &[&ScatterLayer],
    columns: usize,
    font_ready: bool,
) -> Result<(), RenderError> {
    let (width, _) = area.dim_in_pixel();
    let column_width = (width / columns.max(1) as u32).max(1);

    for (i, entry) in entries.iter().enumerate() {
        let column = (i % columns) as u32;
        let row = (i / columns) as u32;
        let x = (column * column_width + LEGEND_PADDING) as i32;
        let y = (LEGEND_PADDING + row * LEGEND_ROW_HEIGHT + LEGEND_ROW_HEIGHT / 2) as i32;

        area.draw(&Circle::new(
            (x + LEGEND_SWATCH_RADIUS, y),
            LEGEND_SWATCH_RADIUS,
            entry.color.mix(entry.opacity).filled(),
        ))
        .map_err(draw_error)?;

        let Some(label) = entry.label.as_deref() else {
            continue;
        };
        if !font_ready {
            continue;
        }

        let style = (font::FONT_FAMILY, LEGEND_FONT_SIZE)
            .into_font()
            .color(&BLACK);
        let origin = (
            x + 3 * LEGEND_SWATCH_RADIUS,
            y - (LEGEND_FONT_SIZE / 2.0) as i32,
        );
        if let Err(e) = area.draw(&Text::new(label.to_string(), origin, style)) {
            log::warn!("Failed to draw legend label '{label}': {e}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon as GeoPolygon};

    use super::*;

    fn square() -> MultiPolygon<f64> {
        let exterior = LineString::from(vec![
            (-110.0, 30.0),
            (-90.0, 30.0),
            (-90.0, 45.0),
            (-110.0, 45.0),
            (-110.0, 30.0),
        ]);
        MultiPolygon(vec![GeoPolygon::new(exterior, vec![])])
    }

    fn square_with_hole() -> MultiPolygon<f64> {
        let hole = LineString::from(vec![
            (-105.0, 35.0),
            (-95.0, 35.0),
            (-95.0, 40.0),
            (-105.0, 40.0),
            (-105.0, 35.0),
        ]);
        let outer = square().0.remove(0).into_inner().0;
        MultiPolygon(vec![GeoPolygon::new(outer, vec![hole])])
    }

    #[test]
    fn fills_use_exteriors_and_outlines_include_holes() {
        let geometry = square_with_hole();

        let filled = exteriors(&geometry);
        let outlined = all_rings(&geometry);

        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0][0], (-110.0, 30.0));
        assert_eq!(outlined.len(), 2);
        assert_eq!(outlined[1][0], (-105.0, 35.0));
    }

    #[test]
    fn marker_radius_follows_area() {
        assert_eq!(Marker::new(0.0, 0.0, 36.0).radius(), Some(4));
        assert_eq!(Marker::new(0.0, 0.0, 1.0).radius(), Some(1));
        assert_eq!(Marker::new(0.0, 0.0, 100.0).radius(), Some(7));
        assert_eq!(Marker::new(0.0, 0.0, 0.0).radius(), None);
        assert_eq!(Marker::new(0.0, 0.0, -3.0).radius(), None);
        assert_eq!(Marker::new(0.0, 0.0, f64::NAN).radius(), None);
    }

    #[test]
    fn bounds_include_edges() {
        let bounds = MapBounds::CONTIGUOUS_US;
        assert!(bounds.contains(-130.0, 20.0));
        assert!(bounds.contains(-65.0, 50.0));
        assert!(!bounds.contains(-150.0, 61.0));
    }

    #[test]
    fn layers_keep_insertion_order() {
        let figure = MapFigure::new(MapBounds::CONTIGUOUS_US)
            .layer(ScatterLayer::new(RED, 0.5))
            .layer(BaseMapLayer {
                polygons: vec![square()],
                fill: None,
                edge: BLACK,
            })
            .layer(ChoroplethLayer {
                regions: vec![],
                opacity: 0.2,
            });

        assert_eq!(
            figure.layer_kinds(),
            vec![LayerKind::Scatter, LayerKind::BaseMap, LayerKind::Choropleth]
        );
    }

    #[test]
    fn legend_lists_labeled_scatter_layers_only() {
        let figure = MapFigure::new(MapBounds::CONTIGUOUS_US)
            .with_legend(3)
            .layer(ScatterLayer::new(BLUE, 0.5).with_label("one"))
            .layer(ScatterLayer::new(GREEN, 0.5))
            .layer(ScatterLayer::new(RED, 0.5).with_label("three"));

        assert_eq!(figure.legend_labels(), vec!["one", "three"]);
        assert_eq!(figure.legend_height(2), LEGEND_ROW_HEIGHT + 2 * LEGEND_PADDING);
        assert_eq!(figure.legend_height(4), 2 * LEGEND_ROW_HEIGHT + 2 * LEGEND_PADDING);
    }

    #[test]
    fn legend_disabled_without_columns() {
        let figure = MapFigure::new(MapBounds::CONTIGUOUS_US)
            .layer(ScatterLayer::new(BLUE, 0.5).with_label("one"));
        assert!(figure.legend_labels().is_empty());
    }

    #[test]
    fn renders_png_with_every_layer_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("figure.png");

        let figure = MapFigure::new(MapBounds::CONTIGUOUS_US)
            .with_size(320, 240)
            .with_legend(3)
            .layer(BaseMapLayer {
                polygons: vec![square()],
                fill: Some(Fill {
                    color: BLUE,
                    opacity: 0.7,
                }),
                edge: BLACK,
            })
            .layer(ChoroplethLayer {
                regions: vec![(square(), RGBColor(10, 10, 255))],
                opacity: 0.2,
            })
            .layer(
                ScatterLayer::new(RED, 0.5)
                    .with_label("quakes")
                    .with_markers([
                        Marker::new(-100.0, 40.0, 25.0),
                        Marker::new(-160.0, 60.0, 25.0),
                    ]),
            );

        figure.render(&path, None).unwrap();

        let written = std::fs::metadata(&path).unwrap();
        assert!(written.len() > 0);
    }
}
