//! Report configuration.
//!
//! Defaults are embedded from `config/default.toml` at compile time. A file
//! passed on the command line replaces them; any key it leaves out keeps
//! its default.

use std::path::{Path, PathBuf};

use quake_map_records::paths;
use quake_map_records_models::{OVERLAY_MIN_MAGNITUDE, REVIEWED_STATUS, TARGET_CHEMICAL};
use quake_map_render::RenderOptions;
use quake_map_render::figure::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use serde::Deserialize;

use crate::ReportError;

/// Built-in configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Name used for [`DEFAULT_CONFIG`] in error messages.
const DEFAULT_CONFIG_NAME: &str = "<embedded default.toml>";

/// Everything [`crate::run`] needs to know.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory relative paths resolve against. Not read from TOML.
    #[serde(skip, default = "paths::project_root")]
    pub root: PathBuf,
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Row filters.
    pub filters: FiltersConfig,
    /// Image settings.
    pub render: RenderConfig,
    /// Extra outputs.
    pub export: ExportConfig,
}

/// Input and output locations, relative to the project root unless
/// absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// State boundary shapefile.
    pub states: PathBuf,
    /// Earthquake CSV.
    pub earthquakes: PathBuf,
    /// Toxic-release inventory CSV.
    pub releases: PathBuf,
    /// Output directory for plots and tables.
    pub plots: PathBuf,
}

/// Row filters applied while loading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    /// Earthquake status to keep.
    pub reviewed_status: String,
    /// Chemical name to keep from the release inventory.
    pub chemical: String,
    /// Minimum magnitude drawn on the release overlay.
    pub overlay_min_magnitude: f64,
}

/// Image settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// TrueType font for legend labels.
    pub font: Option<PathBuf>,
}

/// Extra outputs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Write `release_by_state.csv` next to the plots.
    pub aggregates_csv: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            root: paths::project_root(),
            paths: PathsConfig::default(),
            filters: FiltersConfig::default(),
            render: RenderConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            states: PathBuf::from(paths::STATES_SHAPEFILE),
            earthquakes: PathBuf::from(paths::EARTHQUAKES_CSV),
            releases: PathBuf::from(paths::RELEASES_CSV),
            plots: PathBuf::from(paths::PLOTS_DIR),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            reviewed_status: REVIEWED_STATUS.to_string(),
            chemical: TARGET_CHEMICAL.to_string(),
            overlay_min_magnitude: OVERLAY_MIN_MAGNITUDE,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            font: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            aggregates_csv: true,
        }
    }
}

impl ReportConfig {
    /// Parses the built-in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Config`] if the embedded TOML is malformed.
    pub fn embedded() -> Result<Self, ReportError> {
        Self::parse(DEFAULT_CONFIG, Path::new(DEFAULT_CONFIG_NAME))
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] if the file cannot be read or
    /// [`ReportError::Config`] if it is not valid configuration TOML.
    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    /// Parses configuration TOML. `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Config`] if the TOML is malformed or has
    /// unknown keys.
    pub fn parse(toml_str: &str, origin: &Path) -> Result<Self, ReportError> {
        toml::de::from_str(toml_str).map_err(|source| ReportError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Replaces the project root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Resolved state boundary shapefile path.
    #[must_use]
    pub fn states_path(&self) -> PathBuf {
        paths::resolve(&self.root, &self.paths.states)
    }

    /// Resolved earthquake CSV path.
    #[must_use]
    pub fn earthquakes_path(&self) -> PathBuf {
        paths::resolve(&self.root, &self.paths.earthquakes)
    }

    /// Resolved release CSV path.
    #[must_use]
    pub fn releases_path(&self) -> PathBuf {
        paths::resolve(&self.root, &self.paths.releases)
    }

    /// Resolved output directory.
    #[must_use]
    pub fn plots_dir(&self) -> PathBuf {
        paths::resolve(&self.root, &self.paths.plots)
    }

    /// Renderer settings derived from this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.render.width,
            height: self.render.height,
            font: self.render.font.as_ref().map(|f| paths::resolve(&self.root, f)),
            overlay_min_magnitude: self.filters.overlay_min_magnitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_matches_defaults() {
        let config = ReportConfig::embedded().unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = ReportConfig::parse(
            "[filters]\nchemical = \"Toluene\"\n\n[render]\nwidth = 1024\n",
            Path::new("partial.toml"),
        )
        .unwrap();

        assert_eq!(config.filters.chemical, "Toluene");
        assert_eq!(config.filters.reviewed_status, REVIEWED_STATUS);
        assert_eq!(config.render.width, 1024);
        assert_eq!(config.render.height, DEFAULT_HEIGHT);
        assert_eq!(config.paths, PathsConfig::default());
        assert!(config.export.aggregates_csv);
    }

    #[test]
    fn misspelled_key_is_rejected() {
        let err = ReportConfig::parse("[filters]\nchemcial = \"Toluene\"\n", Path::new("typo.toml"))
            .unwrap_err();
        assert!(matches!(err, ReportError::Config { ref path, .. } if path == Path::new("typo.toml")));
    }

    #[test]
    fn paths_resolve_against_root() {
        let config = ReportConfig::default().with_root("/srv/quakes");
        assert_eq!(
            config.states_path(),
            PathBuf::from("/srv/quakes/data/cb_2018_us_state_500k.shp")
        );
        assert_eq!(config.plots_dir(), PathBuf::from("/srv/quakes/plots"));
    }

    #[test]
    fn render_options_carry_overlay_threshold() {
        let mut config = ReportConfig::default().with_root("/srv/quakes");
        config.filters.overlay_min_magnitude = 5.0;
        config.render.font = Some(PathBuf::from("fonts/label.ttf"));

        let options = config.render_options();
        assert!((options.overlay_min_magnitude - 5.0).abs() < f64::EPSILON);
        assert_eq!(options.font, Some(PathBuf::from("/srv/quakes/fonts/label.ttf")));
    }
}
