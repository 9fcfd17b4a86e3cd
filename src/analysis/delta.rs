use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use super::interpolation::LinearInterpolant;
use crate::{errors::LapDeltaError, telemetry::LapSeries};

const MICROS_PER_SECOND: f64 = 1_000_000.;

/// Time gap between two laps sampled every meter of the common distance range.
///
/// `delta_seconds[i]` is `reference_time - comparison_time` at
/// `distance_axis[i]`, so a negative value means the comparison lap was slower
/// at that point of the lap.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedDelta {
    pub distance_axis: Vec<f64>,
    pub delta_seconds: Vec<f64>,
}

impl AlignedDelta {
    pub fn len(&self) -> usize {
        self.distance_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance_axis.is_empty()
    }

    /// Delta at the axis step containing `distance`
    pub fn delta_at(&self, distance: f64) -> Option<f64> {
        if !(distance >= 0.) {
            return None;
        }
        self.delta_seconds.get(distance.floor() as usize).copied()
    }

    /// Smallest and largest delta, `None` for an empty curve
    pub fn range(&self) -> Option<(f64, f64)> {
        self.delta_seconds
            .iter()
            .copied()
            .minmax_by(|a, b| a.total_cmp(b))
            .into_option()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distance_axis
            .iter()
            .copied()
            .zip(self.delta_seconds.iter().copied())
    }
}

/// Aligns `comparison` to `reference` by distance into the lap.
///
/// Both distance series are shifted to start at 0. The lap that covers more
/// distance is clipped at the shorter lap's end so nothing is extrapolated
/// past what both laps recorded; samples collapsed onto the clip point keep
/// only the first one.
pub fn compute_delta(
    reference: &LapSeries,
    comparison: &LapSeries,
) -> Result<AlignedDelta, LapDeltaError> {
    let reference_points = normalized_points(reference)?;
    let comparison_points = normalized_points(comparison)?;

    let reference_max = last_distance(&reference_points);
    let comparison_max = last_distance(&comparison_points);
    let common_max = reference_max.min(comparison_max);
    if reference_max != comparison_max {
        debug!(
            "Clipping lap end to {:.1}m (reference {:.1}m, comparison {:.1}m)",
            common_max, reference_max, comparison_max
        );
    }

    let reference_curve = build_curve(reference, reference_points, common_max)?;
    let comparison_curve = build_curve(comparison, comparison_points, common_max)?;

    let axis_len = common_max.ceil() as usize;
    let distance_axis = (0..axis_len).map(|d| d as f64).collect_vec();
    let delta_seconds = distance_axis
        .iter()
        .map(|&d| (reference_curve.at(d) - comparison_curve.at(d)) / MICROS_PER_SECOND)
        .collect_vec();

    debug!(
        "Computed delta of {} lap {} against {} lap {} over {} points",
        comparison.driver,
        comparison.lap_number,
        reference.driver,
        reference.lap_number,
        distance_axis.len()
    );
    Ok(AlignedDelta {
        distance_axis,
        delta_seconds,
    })
}

/// Checks that `lap` can be aligned against any other lap, without pairing it.
pub fn validate_series(lap: &LapSeries) -> Result<(), LapDeltaError> {
    let points = normalized_points(lap)?;
    let own_max = last_distance(&points);
    build_curve(lap, points, own_max).map(|_| ())
}

fn last_distance(points: &[(f64, f64)]) -> f64 {
    points.last().map(|p| p.0).unwrap_or(0.)
}

/// (distance from lap start, elapsed microseconds) for every sample
fn normalized_points(lap: &LapSeries) -> Result<Vec<(f64, f64)>, LapDeltaError> {
    if lap.len() < 2 {
        return Err(LapDeltaError::InsufficientData {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
            samples: lap.len(),
        });
    }
    if let Some(bad) = lap.samples.iter().find(|s| !s.distance.is_finite()) {
        return Err(degenerate(lap, format!("non-finite distance {}", bad.distance)));
    }
    if let Some((prev, next)) = lap
        .samples
        .iter()
        .tuple_windows()
        .find(|(prev, next)| next.distance < prev.distance)
    {
        return Err(degenerate(
            lap,
            format!(
                "distance decreases from {:.3}m to {:.3}m",
                prev.distance, next.distance
            ),
        ));
    }

    let start = lap.samples[0].distance;
    Ok(lap
        .samples
        .iter()
        .map(|s| (s.distance - start, s.time_offset.as_micros() as f64))
        .collect())
}

fn build_curve(
    lap: &LapSeries,
    mut points: Vec<(f64, f64)>,
    clip_at: f64,
) -> Result<LinearInterpolant, LapDeltaError> {
    for point in points.iter_mut() {
        point.0 = point.0.min(clip_at);
    }
    points.dedup_by(|later, earlier| later.0 == earlier.0);

    if points.len() < 2 {
        return Err(LapDeltaError::InsufficientData {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
            samples: points.len(),
        });
    }
    if let Some((prev, next)) = points.iter().tuple_windows().find(|(p, n)| n.1 <= p.1) {
        return Err(degenerate(
            lap,
            format!(
                "elapsed time does not increase between {:.3}m and {:.3}m",
                prev.0, next.0
            ),
        ));
    }

    LinearInterpolant::new(&points)
        .ok_or_else(|| degenerate(lap, "distance knots are not strictly increasing".to_string()))
}

fn degenerate(lap: &LapSeries, reason: String) -> LapDeltaError {
    LapDeltaError::DegenerateSeries {
        driver: lap.driver.clone(),
        lap_number: lap.lap_number,
        reason,
    }
}
