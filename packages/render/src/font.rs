//! Legend font registration.
//!
//! The bitmap backend has no built-in font, so a TrueType file is read from
//! disk and registered under [`FONT_FAMILY`] the first time a legend is
//! drawn. Without one the legend keeps its color swatches and drops the
//! label text.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};

/// Family name legend text is drawn with.
pub const FONT_FAMILY: &str = "sans-serif";

/// Locations tried when no font is configured.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Outcome of the one registration attempt made per process.
#[derive(Debug)]
struct Registration {
    requested: Option<PathBuf>,
    available: bool,
}

static REGISTERED: OnceLock<Registration> = OnceLock::new();

/// Registers the legend font once per process, returning whether a font
/// is available.
///
/// The path passed on the first call wins. Later calls asking for a
/// different font are logged and otherwise ignored.
pub fn ensure_legend_font(configured: Option<&Path>) -> bool {
    let registration = REGISTERED.get_or_init(|| Registration {
        requested: configured.map(Path::to_path_buf),
        available: register_first_available(configured),
    });

    if is_ignored_request(registration.requested.as_deref(), configured) {
        log::debug!(
            "Legend font already registered; ignoring {}",
            configured.map_or_else(String::new, |p| p.display().to_string())
        );
    }

    registration.available
}

/// A later request is ignored when it names a font other than the one the
/// first call asked for.
fn is_ignored_request(registered: Option<&Path>, requested: Option<&Path>) -> bool {
    requested.is_some() && requested != registered
}

fn register_first_available(configured: Option<&Path>) -> bool {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_PATHS.iter().map(PathBuf::from));

    for candidate in candidates {
        let bytes = match std::fs::read(&candidate) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("Font {} unavailable: {e}", candidate.display());
                continue;
            }
        };

        // Registered fonts must outlive every later draw call.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
            log::debug!("Registered legend font {}", candidate.display());
            return true;
        }
        log::warn!("{} is not a usable TrueType font", candidate.display());
    }

    log::warn!("No legend font found; legend labels will be omitted");
    false
}
