#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static map rendering.
//!
//! Plots are assembled as a [`MapFigure`]: an ordered stack of layers
//! (base map, choropleth fill, scatter markers) that is rendered to PNG in
//! a single pass. Building the figure is separate from drawing it, so the
//! layer stack of each plot can be inspected without touching the
//! filesystem.

pub mod color;
pub mod figure;
pub mod font;
pub mod overlay;
pub mod scatter;

use std::path::PathBuf;

use thiserror::Error;

pub use figure::{Layer, LayerKind, MapBounds, MapFigure, Marker};
pub use overlay::{TRI_FILE, TriPlot, plot_earthquakes_tri, tri_figure};
pub use scatter::{SCATTER_FILE, plot_earthquakes_scatter, scatter_figure};

/// Errors that can occur while rendering a plot.
#[derive(Debug, Error)]
pub enum RenderError {
    /// I/O error (creating the output directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The drawing backend failed.
    #[error("Drawing error: {message}")]
    Draw {
        /// Description of what went wrong.
        message: String,
    },
}

/// Maps any plotters error into [`RenderError::Draw`].
pub(crate) fn draw_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Draw {
        message: err.to_string(),
    }
}

/// Settings shared by both plots.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// TrueType font used for legend labels. `None` tries the usual
    /// system locations. Fonts are registered once per process, so only
    /// the font given to the first render takes effect.
    pub font: Option<PathBuf>,
    /// Minimum magnitude for earthquakes on the release overlay.
    pub overlay_min_magnitude: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: figure::DEFAULT_WIDTH,
            height: figure::DEFAULT_HEIGHT,
            font: None,
            overlay_min_magnitude: quake_map_records_models::OVERLAY_MIN_MAGNITUDE,
        }
    }
}
