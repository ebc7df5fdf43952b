#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types shared across the quake map toolchain.
//!
//! Earthquake events, toxic-release facilities, and state boundary polygons
//! as they look after loading and filtering. Magnitude bands and the filter
//! constants used by the loaders live here too so that every crate agrees
//! on the same thresholds.

use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Earthquake status value that marks a human-reviewed event.
pub const REVIEWED_STATUS: &str = "reviewed";

/// Chemical name (`CAS_CHEM_NAME`) selected from the toxic-release inventory.
pub const TARGET_CHEMICAL: &str = "n-Hexane";

/// Minimum magnitude for an earthquake to appear on the release overlay.
pub const OVERLAY_MIN_MAGNITUDE: f64 = 4.0;

/// Pounds to kilograms.
pub const POUNDS_TO_KILOGRAMS: f64 = 0.453_592;

/// Upper bound (inclusive) of the [`MagnitudeBand::Low`] band.
pub const LOW_BAND_MAX: f64 = 2.5;

/// Upper bound (inclusive) of the [`MagnitudeBand::Medium`] band.
pub const MEDIUM_BAND_MAX: f64 = 4.5;

/// A single earthquake event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeRecord {
    /// Event magnitude.
    pub magnitude: f64,
    /// Epicenter latitude in degrees.
    pub latitude: f64,
    /// Epicenter longitude in degrees.
    pub longitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth: f64,
    /// Review status reported by the network (e.g. `"reviewed"`).
    pub status: String,
}

impl EarthquakeRecord {
    /// Returns the magnitude band this event falls into.
    #[must_use]
    pub fn band(&self) -> MagnitudeBand {
        MagnitudeBand::classify(self.magnitude)
    }

    /// Returns `true` if the event carries the given review status.
    #[must_use]
    pub fn has_status(&self, status: &str) -> bool {
        self.status == status
    }

    /// Drops everything but the location and depth.
    #[must_use]
    pub const fn site(&self) -> QuakeSite {
        QuakeSite {
            latitude: self.latitude,
            longitude: self.longitude,
            depth: self.depth,
        }
    }
}

/// Location and depth of an earthquake, as drawn on the release overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuakeSite {
    /// Epicenter latitude in degrees.
    pub latitude: f64,
    /// Epicenter longitude in degrees.
    pub longitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth: f64,
}

/// Returns the sites of every earthquake with magnitude at or above
/// `min_magnitude`, in input order.
#[must_use]
pub fn overlay_sites(records: &[EarthquakeRecord], min_magnitude: f64) -> Vec<QuakeSite> {
    records
        .iter()
        .filter(|r| r.magnitude >= min_magnitude)
        .map(EarthquakeRecord::site)
        .collect()
}

/// Earthquake severity class used for the scatter plot encoding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MagnitudeBand {
    /// Magnitude at or below 2.5.
    Low,
    /// Magnitude above 2.5, at or below 4.5.
    Medium,
    /// Magnitude above 4.5.
    High,
}

impl MagnitudeBand {
    /// Classifies a magnitude. Upper bounds are inclusive, so 2.5 is
    /// [`Self::Low`] and 4.5 is [`Self::Medium`].
    #[must_use]
    pub fn classify(magnitude: f64) -> Self {
        if magnitude <= LOW_BAND_MAX {
            Self::Low
        } else if magnitude <= MEDIUM_BAND_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Legend label for this band.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "mag <= 2.5",
            Self::Medium => "2.5 < mag <= 4.5",
            Self::High => "mag > 4.5",
        }
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Earthquakes split by [`MagnitudeBand`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandPartition {
    /// Events in [`MagnitudeBand::Low`].
    pub low: Vec<EarthquakeRecord>,
    /// Events in [`MagnitudeBand::Medium`].
    pub medium: Vec<EarthquakeRecord>,
    /// Events in [`MagnitudeBand::High`].
    pub high: Vec<EarthquakeRecord>,
}

impl BandPartition {
    /// Splits `records` into their bands, preserving input order within
    /// each band.
    #[must_use]
    pub fn from_records(records: &[EarthquakeRecord]) -> Self {
        let mut partition = Self::default();
        for record in records {
            match record.band() {
                MagnitudeBand::Low => partition.low.push(record.clone()),
                MagnitudeBand::Medium => partition.medium.push(record.clone()),
                MagnitudeBand::High => partition.high.push(record.clone()),
            }
        }
        partition
    }

    /// Events in `band`.
    #[must_use]
    pub fn get(&self, band: MagnitudeBand) -> &[EarthquakeRecord] {
        match band {
            MagnitudeBand::Low => &self.low,
            MagnitudeBand::Medium => &self.medium,
            MagnitudeBand::High => &self.high,
        }
    }

    /// Total number of events across all bands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.low.len() + self.medium.len() + self.high.len()
    }

    /// Returns `true` if no band holds any event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A toxic-release facility with its release amount in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    /// Total on- and off-site release in kilograms.
    pub amount_kg: f64,
    /// Facility latitude in degrees.
    pub latitude: f64,
    /// Facility longitude in degrees.
    pub longitude: f64,
}

impl ReleaseRecord {
    /// Builds a record from an amount reported in pounds.
    #[must_use]
    pub fn from_pounds(amount_lb: f64, latitude: f64, longitude: f64) -> Self {
        Self {
            amount_kg: amount_lb * POUNDS_TO_KILOGRAMS,
            latitude,
            longitude,
        }
    }

    /// Facility location as an `(x = longitude, y = latitude)` point.
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A state boundary read from the boundary shapefile.
///
/// Identity is the polygon's position in the source dataset; the name
/// columns are informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePolygon {
    /// State name from the `NAME` attribute, if present.
    pub name: Option<String>,
    /// Postal abbreviation from the `STUSPS` attribute, if present.
    pub abbreviation: Option<String>,
    /// Boundary geometry in longitude/latitude degrees.
    pub geometry: MultiPolygon<f64>,
}

impl StatePolygon {
    /// Creates an unnamed state polygon.
    #[must_use]
    pub const fn new(geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: None,
            abbreviation: None,
            geometry,
        }
    }

    /// Sets the state name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Human-readable label for logs: the name, the abbreviation, or the
    /// dataset index as a last resort.
    #[must_use]
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .or_else(|| self.abbreviation.clone())
            .unwrap_or_else(|| format!("#{index}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake(magnitude: f64) -> EarthquakeRecord {
        EarthquakeRecord {
            magnitude,
            latitude: 0.0,
            longitude: 0.0,
            depth: 10.0,
            status: REVIEWED_STATUS.to_string(),
        }
    }

    #[test]
    fn band_boundaries_are_inclusive_above() {
        assert_eq!(MagnitudeBand::classify(2.5), MagnitudeBand::Low);
        assert_eq!(MagnitudeBand::classify(2.51), MagnitudeBand::Medium);
        assert_eq!(MagnitudeBand::classify(4.5), MagnitudeBand::Medium);
        assert_eq!(MagnitudeBand::classify(4.51), MagnitudeBand::High);
        assert_eq!(MagnitudeBand::classify(-1.0), MagnitudeBand::Low);
    }

    #[test]
    fn partition_covers_every_record_once() {
        let records: Vec<_> = [0.5, 2.5, 2.51, 3.0, 4.5, 4.6, 7.2]
            .into_iter()
            .map(quake)
            .collect();
        let partition = BandPartition::from_records(&records);

        assert_eq!(partition.len(), records.len());
        assert_eq!(partition.low.len(), 2);
        assert_eq!(partition.medium.len(), 3);
        assert_eq!(partition.high.len(), 2);

        for band in MagnitudeBand::all() {
            for record in partition.get(*band) {
                assert_eq!(record.band(), *band);
            }
        }
    }

    #[test]
    fn empty_partition_is_empty() {
        assert!(BandPartition::from_records(&[]).is_empty());
    }

    #[test]
    fn overlay_sites_keep_magnitude_four_and_up() {
        let records = vec![quake(3.99), quake(4.0), quake(5.5)];
        let sites = overlay_sites(&records, OVERLAY_MIN_MAGNITUDE);
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().all(|s| (s.depth - 10.0).abs() < f64::EPSILON));
    }

    #[test]
    fn converts_pounds_to_kilograms() {
        let record = ReleaseRecord::from_pounds(100.0, 40.0, -100.0);
        assert!((record.amount_kg - 45.3592).abs() < 1e-9);
        assert_eq!(record.point(), Point::new(-100.0, 40.0));
    }

    #[test]
    fn band_round_trips_through_strum() {
        assert_eq!(MagnitudeBand::Medium.to_string(), "MEDIUM");
        assert_eq!("HIGH".parse::<MagnitudeBand>().unwrap(), MagnitudeBand::High);
    }

    #[test]
    fn state_label_falls_back_to_index() {
        let polygon = StatePolygon::new(MultiPolygon(vec![]));
        assert_eq!(polygon.label(3), "#3");
        assert_eq!(polygon.with_name("Utah").label(3), "Utah");
    }
}
