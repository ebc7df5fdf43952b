#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for input datasets and rendered plots.
//!
//! Inputs live under the project root's `data/` directory; outputs are
//! written to `plots/`.

use std::path::{Path, PathBuf};

/// Default state boundary shapefile, relative to the project root.
pub const STATES_SHAPEFILE: &str = "data/cb_2018_us_state_500k.shp";

/// Default earthquake CSV, relative to the project root.
pub const EARTHQUAKES_CSV: &str = "data/earthquakes.csv";

/// Default toxic-release inventory CSV, relative to the project root.
pub const RELEASES_CSV: &str = "data/tri.csv";

/// Default output directory, relative to the project root.
pub const PLOTS_DIR: &str = "plots";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// manifest directory itself if it is not nested two levels deep.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Resolves `path` against `root` unless it is already absolute.
#[must_use]
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_root_contains_packages() {
        assert!(project_root().join("packages").is_dir());
    }

    #[test]
    fn resolves_relative_paths_under_root() {
        let root = Path::new("/srv/quakes");
        assert_eq!(
            resolve(root, Path::new(EARTHQUAKES_CSV)),
            PathBuf::from("/srv/quakes/data/earthquakes.csv")
        );
        assert_eq!(
            resolve(root, Path::new("/tmp/tri.csv")),
            PathBuf::from("/tmp/tri.csv")
        );
    }

    #[test]
    fn default_locations_resolve_under_root() {
        let root = Path::new("/srv/quakes");
        assert_eq!(
            resolve(root, Path::new(STATES_SHAPEFILE)),
            PathBuf::from("/srv/quakes/data/cb_2018_us_state_500k.shp")
        );
        assert_eq!(
            resolve(root, Path::new(PLOTS_DIR)),
            PathBuf::from("/srv/quakes/plots")
        );
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
