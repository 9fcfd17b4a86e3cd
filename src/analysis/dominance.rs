use std::{collections::BTreeMap, time::Duration};

use log::debug;

use super::segments::TrackSegmentation;
use crate::{
    errors::LapDeltaError,
    telemetry::{DriverId, LapSeries},
};

/// Fastest lap through one minisector
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentWinner {
    pub driver: DriverId,
    pub lap_number: u32,
    /// Position of the winning lap in the participant order
    pub participant: usize,
    pub elapsed: Duration,
}

/// Winner per 1-based segment index. Segments nobody recorded samples in are absent.
pub type DominanceMap = BTreeMap<usize, SegmentWinner>;

/// Time spent by `lap` in each minisector, indexed by `segment - 1`.
///
/// The time is the span between the first and last sample recorded inside the
/// segment, which only approximates the true split time. Segments without
/// samples are `None`.
pub fn segment_times(lap: &LapSeries, segmentation: &TrackSegmentation) -> Vec<Option<Duration>> {
    let mut windows: Vec<Option<(Duration, Duration)>> = vec![None; segmentation.segment_count()];
    for sample in &lap.samples {
        let slot = &mut windows[segmentation.segment_of(sample.distance) - 1];
        *slot = Some(match *slot {
            Some((first, last)) => (first.min(sample.time_offset), last.max(sample.time_offset)),
            None => (sample.time_offset, sample.time_offset),
        });
    }
    windows
        .into_iter()
        .map(|window| window.map(|(first, last)| last - first))
        .collect()
}

/// Picks the fastest lap through every minisector.
///
/// Laps without samples in a segment do not contend for it. On equal times
/// the lap that comes first in `active_laps` wins.
pub fn compute_dominance<'a>(
    active_laps: impl IntoIterator<Item = &'a LapSeries>,
    segmentation: &TrackSegmentation,
) -> Result<DominanceMap, LapDeltaError> {
    let laps: Vec<&LapSeries> = active_laps.into_iter().collect();
    if laps.is_empty() {
        return Err(LapDeltaError::NoContendingLaps);
    }

    let times: Vec<Vec<Option<Duration>>> = laps
        .iter()
        .map(|lap| segment_times(lap, segmentation))
        .collect();

    let mut dominance = DominanceMap::new();
    for segment in 1..=segmentation.segment_count() {
        let mut best: Option<(usize, Duration)> = None;
        for (participant, lap_times) in times.iter().enumerate() {
            let Some(elapsed) = lap_times[segment - 1] else {
                continue;
            };
            if best.is_none_or(|(_, best_elapsed)| elapsed < best_elapsed) {
                best = Some((participant, elapsed));
            }
        }

        match best {
            Some((participant, elapsed)) => {
                let lap = laps[participant];
                dominance.insert(
                    segment,
                    SegmentWinner {
                        driver: lap.driver.clone(),
                        lap_number: lap.lap_number,
                        participant,
                        elapsed,
                    },
                );
            }
            None => debug!("No lap recorded samples in segment {}", segment),
        }
    }
    Ok(dominance)
}
