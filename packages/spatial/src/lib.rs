#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point-in-polygon attribution of release facilities to states.
//!
//! Every facility is tested against every state polygon in dataset order
//! and attributed to the first one that contains it. Release amounts are
//! then summed per state and min-max normalized for color mapping.
//!
//! No spatial index is built. Dataset order is the tie-breaker when
//! polygons overlap.

use std::collections::BTreeMap;

use geo::{Contains, MultiPolygon, Point};
use quake_map_records_models::{ReleaseRecord, StatePolygon};

/// Returns the index of the first polygon, in dataset order, whose interior
/// contains `point`.
///
/// Points on a boundary are not contained. Overlapping polygons are not
/// disambiguated beyond first match.
#[must_use]
pub fn locate_polygon(point: &Point<f64>, polygons: &[StatePolygon]) -> Option<usize> {
    polygons
        .iter()
        .position(|polygon| polygon.geometry.contains(point))
}

/// Result of attributing releases to polygons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialJoin {
    /// `(polygon index, amount in kg)` for each release that landed in a
    /// polygon, in release order.
    pub assignments: Vec<(usize, f64)>,
    /// Number of releases that matched no polygon.
    pub unmatched: usize,
}

/// Attributes every release to the first polygon containing it.
#[must_use]
pub fn join_releases(releases: &[ReleaseRecord], polygons: &[StatePolygon]) -> SpatialJoin {
    let mut join = SpatialJoin::default();

    for release in releases {
        match locate_polygon(&release.point(), polygons) {
            Some(index) => join.assignments.push((index, release.amount_kg)),
            None => join.unmatched += 1,
        }
    }

    log::info!(
        "Attributed {} of {} releases to {} polygons ({} unmatched)",
        join.assignments.len(),
        releases.len(),
        polygons.len(),
        join.unmatched
    );

    join
}

/// Sums amounts per polygon index.
#[must_use]
pub fn aggregate(assignments: impl IntoIterator<Item = (usize, f64)>) -> BTreeMap<usize, f64> {
    let mut sums = BTreeMap::new();
    for (index, amount) in assignments {
        *sums.entry(index).or_insert(0.0) += amount;
    }
    sums
}

/// A state with its summed release amount.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPolygon {
    /// Position of the state in the boundary dataset.
    pub polygon_index: usize,
    /// State name, if the dataset carries one.
    pub name: Option<String>,
    /// Boundary geometry.
    pub geometry: MultiPolygon<f64>,
    /// Summed release amount in kilograms.
    pub amount_sum: f64,
    /// `amount_sum` rescaled to `[0, 1]` across all aggregated states.
    pub normalized_amount_sum: f64,
}

/// Rescales `value` into `[0, 1]` given the observed range.
///
/// A degenerate range (`max == min`) maps everything to `0.0`.
#[must_use]
pub fn min_max_normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 {
        (value - min) / span
    } else {
        0.0
    }
}

/// Pairs each per-polygon sum with its geometry and min-max normalizes the
/// sums.
///
/// Output is in dataset order. Indices with no polygon in `polygons` are
/// skipped. When every sum is equal all states normalize to `0.0`.
#[must_use]
pub fn normalize(sums: &BTreeMap<usize, f64>, polygons: &[StatePolygon]) -> Vec<AggregatedPolygon> {
    let (min, max) = sums
        .values()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), sum| {
            (min.min(*sum), max.max(*sum))
        });

    if sums.len() > 1 && min >= max {
        log::warn!(
            "All {} aggregated states share the same total; normalizing to 0",
            sums.len()
        );
    }

    sums.iter()
        .filter_map(|(&index, &amount_sum)| {
            let Some(polygon) = polygons.get(index) else {
                log::warn!("Aggregate for unknown polygon index {index}");
                return None;
            };
            Some(AggregatedPolygon {
                polygon_index: index,
                name: polygon.name.clone(),
                geometry: polygon.geometry.clone(),
                amount_sum,
                normalized_amount_sum: min_max_normalize(amount_sum, min, max),
            })
        })
        .collect()
}

/// Joins, aggregates, and normalizes `releases` against `polygons`.
#[must_use]
pub fn summarize(releases: &[ReleaseRecord], polygons: &[StatePolygon]) -> Vec<AggregatedPolygon> {
    let join = join_releases(releases, polygons);
    let sums = aggregate(join.assignments);
    let aggregated = normalize(&sums, polygons);

    for state in &aggregated {
        log::debug!(
            "{}: {:.3} kg (normalized {:.3})",
            polygons[state.polygon_index].label(state.polygon_index),
            state.amount_sum,
            state.normalized_amount_sum
        );
    }

    aggregated
}
