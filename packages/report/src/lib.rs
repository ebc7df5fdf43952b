#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake and toxic-release map report.
//!
//! [`run`] loads the three input datasets, renders the magnitude scatter
//! plot and the per-state release overlay, and optionally writes the
//! per-state release totals as CSV. Everything is driven by a
//! [`ReportConfig`]; nothing is read from global state.

pub mod config;
pub mod export;

use std::path::PathBuf;

use quake_map_records::LoadError;
use quake_map_records_models::{BandPartition, EarthquakeRecord, ReleaseRecord, StatePolygon};
use quake_map_render::RenderError;
use thiserror::Error;

pub use config::ReportConfig;

/// Errors that can occur while producing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An input dataset could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A plot could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The configuration TOML is invalid.
    #[error("Config error in {}: {source}", .path.display())]
    Config {
        /// File the configuration came from.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// I/O error (reading config, creating the output directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The aggregate table could not be written.
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

/// The three input datasets after filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    /// State boundaries in dataset order.
    pub states: Vec<StatePolygon>,
    /// Earthquakes with the configured review status.
    pub earthquakes: Vec<EarthquakeRecord>,
    /// Releases of the configured chemical, in kilograms.
    pub releases: Vec<ReleaseRecord>,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// State polygons loaded.
    pub states: usize,
    /// Earthquakes plotted.
    pub earthquakes: usize,
    /// Earthquakes per band: low, medium, high.
    pub band_counts: [usize; 3],
    /// Release facilities plotted.
    pub releases: usize,
    /// States with at least one attributed release.
    pub aggregated_states: usize,
    /// Written scatter plot.
    pub scatter_path: PathBuf,
    /// Written release overlay.
    pub tri_path: PathBuf,
    /// Written aggregate table, if enabled.
    pub aggregates_path: Option<PathBuf>,
}

/// Loads and filters all three datasets.
///
/// # Errors
///
/// Returns [`ReportError::Load`] if any file is missing or malformed.
pub fn load_datasets(config: &ReportConfig) -> Result<Datasets, ReportError> {
    let states = quake_map_records::load_states(&config.states_path())?;
    let earthquakes = quake_map_records::load_earthquakes(
        &config.earthquakes_path(),
        &config.filters.reviewed_status,
    )?;
    let releases =
        quake_map_records::load_releases(&config.releases_path(), &config.filters.chemical)?;

    Ok(Datasets {
        states,
        earthquakes,
        releases,
    })
}

/// Renders both plots (and the aggregate table, if enabled) from
/// already-loaded datasets.
///
/// # Errors
///
/// Returns [`ReportError`] if the output directory cannot be created, a
/// plot cannot be rendered, or the table cannot be written.
pub fn render_reports(datasets: &Datasets, config: &ReportConfig) -> Result<RunSummary, ReportError> {
    let plots_dir = config.plots_dir();
    quake_map_records::paths::ensure_dir(&plots_dir)?;
    let options = config.render_options();

    let scatter_path = quake_map_render::plot_earthquakes_scatter(
        &datasets.earthquakes,
        &datasets.states,
        &plots_dir,
        &options,
    )?;

    let tri = quake_map_render::plot_earthquakes_tri(
        &datasets.earthquakes,
        &datasets.states,
        &datasets.releases,
        &plots_dir,
        &options,
    )?;

    let aggregates_path = if config.export.aggregates_csv {
        let path = plots_dir.join(export::AGGREGATES_FILE);
        export::write_aggregates(&path, &tri.aggregated)?;
        Some(path)
    } else {
        None
    };

    let bands = BandPartition::from_records(&datasets.earthquakes);

    Ok(RunSummary {
        states: datasets.states.len(),
        earthquakes: datasets.earthquakes.len(),
        band_counts: [bands.low.len(), bands.medium.len(), bands.high.len()],
        releases: datasets.releases.len(),
        aggregated_states: tri.aggregated.len(),
        scatter_path,
        tri_path: tri.path,
        aggregates_path,
    })
}

/// Loads every dataset and renders the full report.
///
/// # Errors
///
/// Returns [`ReportError`] on the first failure; nothing is retried.
pub fn run(config: &ReportConfig) -> Result<RunSummary, ReportError> {
    log::info!("Building report under {}", config.root.display());

    let datasets = load_datasets(config)?;
    let summary = render_reports(&datasets, config)?;

    log::info!(
        "Report complete: {} earthquakes, {} releases across {} states",
        summary.earthquakes,
        summary.releases,
        summary.aggregated_states
    );

    Ok(summary)
}
