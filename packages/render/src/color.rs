//! Fixed palette and the choropleth color ramp.

use plotters::style::RGBColor;
use quake_map_records_models::MagnitudeBand;

/// State outline color.
pub const OUTLINE: RGBColor = RGBColor(0, 0, 0);

/// Base map fill on the release overlay.
pub const BASE_FILL: RGBColor = RGBColor(31, 119, 180);

/// Low magnitude band.
pub const BLUE: RGBColor = RGBColor(0, 0, 255);

/// Medium magnitude band.
pub const GREEN: RGBColor = RGBColor(0, 128, 0);

/// High magnitude band and overlay earthquake halos.
pub const RED: RGBColor = RGBColor(255, 0, 0);

/// Overlay earthquake centers.
pub const BLACK: RGBColor = RGBColor(0, 0, 0);

/// Release facilities.
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);

/// Scatter marker opacity for earthquakes.
pub const SCATTER_OPACITY: f64 = 0.5;

/// Base map fill opacity on the release overlay.
pub const BASE_FILL_OPACITY: f64 = 0.7;

/// Choropleth fill opacity, layered over the base fill.
pub const CHOROPLETH_OPACITY: f64 = 0.2;

/// Color for a magnitude band on the scatter plot.
#[must_use]
pub const fn band_color(band: MagnitudeBand) -> RGBColor {
    match band {
        MagnitudeBand::Low => BLUE,
        MagnitudeBand::Medium => GREEN,
        MagnitudeBand::High => RED,
    }
}

/// Red and green level for a normalized amount: 250 at 0.0 down to 0 at
/// 1.0, rounded half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gray_level(normalized: f64) -> u8 {
    (-250.0 * normalized + 250.0).round().clamp(0.0, 255.0) as u8
}

/// Choropleth color: near-white blue for the smallest total, deep blue for
/// the largest.
#[must_use]
pub fn choropleth_color(normalized: f64) -> RGBColor {
    let level = gray_level(normalized);
    RGBColor(level, level, 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_level_spans_ramp() {
        assert_eq!(gray_level(0.0), 250);
        assert_eq!(gray_level(1.0), 0);
        assert_eq!(gray_level(0.5), 125);
        assert_eq!(gray_level(0.123), 219);
    }

    #[test]
    fn choropleth_keeps_blue_channel_saturated() {
        assert_eq!(choropleth_color(0.0), RGBColor(250, 250, 255));
        assert_eq!(choropleth_color(1.0), RGBColor(0, 0, 255));
    }

    #[test]
    fn bands_have_distinct_colors() {
        assert_eq!(band_color(MagnitudeBand::Low), BLUE);
        assert_eq!(band_color(MagnitudeBand::Medium), GREEN);
        assert_eq!(band_color(MagnitudeBand::High), RED);
    }
}
