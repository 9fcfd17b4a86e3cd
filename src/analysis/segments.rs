use serde::{Deserialize, Serialize};

use crate::errors::LapDeltaError;

/// Number of minisectors the circuit is split into unless configured otherwise
pub const DEFAULT_SEGMENT_COUNT: usize = 18;

/// Distance range covered by one minisector. `index` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentBounds {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
}

impl SegmentBounds {
    pub fn length(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.lower && distance < self.upper
    }
}

/// 1-based minisector containing `distance`, clamped to `[1, segment_count]`.
///
/// Total over every input: distances before the line land in the first
/// segment, distances past the circuit length in the last one.
pub fn segment_of(distance: f64, circuit_length: f64, segment_count: usize) -> usize {
    let segment_count = segment_count.max(1);
    let width = circuit_length / segment_count as f64;
    let raw = (distance / width).floor();
    if raw.is_nan() || raw < 0. {
        return 1;
    }
    (raw as usize).saturating_add(1).min(segment_count)
}

/// Bounds of every minisector in order, the last one ending exactly at `circuit_length`
pub fn segment_bounds(segment_count: usize, circuit_length: f64) -> Vec<SegmentBounds> {
    let boundary = |i: usize| i as f64 * circuit_length / segment_count as f64;
    (1..=segment_count)
        .map(|index| SegmentBounds {
            index,
            lower: boundary(index - 1),
            upper: boundary(index),
        })
        .collect()
}

/// A validated split of one circuit into equal-length minisectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSegmentation {
    circuit_length: f64,
    segment_count: usize,
}

impl TrackSegmentation {
    pub fn new(circuit_length: f64, segment_count: usize) -> Result<Self, LapDeltaError> {
        if !(circuit_length.is_finite() && circuit_length > 0.) {
            return Err(LapDeltaError::InvalidSegmentation {
                reason: format!("circuit length must be positive, got {}", circuit_length),
            });
        }
        if segment_count == 0 {
            return Err(LapDeltaError::InvalidSegmentation {
                reason: "segment count must be at least 1".to_string(),
            });
        }
        Ok(Self {
            circuit_length,
            segment_count,
        })
    }

    pub fn with_default_count(circuit_length: f64) -> Result<Self, LapDeltaError> {
        Self::new(circuit_length, DEFAULT_SEGMENT_COUNT)
    }

    pub fn circuit_length(&self) -> f64 {
        self.circuit_length
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn segment_width(&self) -> f64 {
        self.circuit_length / self.segment_count as f64
    }

    pub fn segment_of(&self, distance: f64) -> usize {
        segment_of(distance, self.circuit_length, self.segment_count)
    }

    pub fn bounds(&self) -> Vec<SegmentBounds> {
        segment_bounds(self.segment_count, self.circuit_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_segment_of_5000m_circuit() {
        let segmentation = TrackSegmentation::with_default_count(5000.).unwrap();

        assert!((segmentation.segment_width() - 277.777).abs() < 0.01);
        assert_eq!(segmentation.segment_of(300.), 2);
        assert_eq!(segmentation.segment_of(0.), 1);
        assert_eq!(segmentation.segment_of(5000. - 1e-6), 18);
    }

    #[test]
    fn test_segment_of_clamps_out_of_range() {
        assert_eq!(segment_of(-25., 5000., 18), 1);
        assert_eq!(segment_of(5000., 5000., 18), 18);
        assert_eq!(segment_of(7500., 5000., 18), 18);
        assert_eq!(segment_of(f64::NAN, 5000., 18), 1);
        assert_eq!(segment_of(10., 5000., 0), 1);
    }

    #[test]
    fn test_bounds_tile_the_circuit() {
        let bounds = segment_bounds(18, 5000.);

        assert_eq!(bounds.len(), 18);
        assert_eq!(bounds[0].index, 1);
        assert_eq!(bounds[0].lower, 0.);
        assert_eq!(bounds[17].upper, 5000.);
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
        }
        assert!(bounds[1].contains(300.));
        assert!(!bounds[0].contains(300.));
    }

    #[test]
    fn test_invalid_segmentation() {
        assert!(TrackSegmentation::new(0., 18).is_err());
        assert!(TrackSegmentation::new(-1., 18).is_err());
        assert!(TrackSegmentation::new(f64::INFINITY, 18).is_err());
        assert!(TrackSegmentation::new(5000., 0).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_segment_of_is_surjective(
            circuit_length in 1000.0f64..8000.0,
            segment_count in 1usize..40,
        ) {
            let width = circuit_length / segment_count as f64;
            let mut seen = HashSet::new();
            for i in 0..segment_count {
                // midpoint of each segment
                let segment = segment_of((i as f64 + 0.5) * width, circuit_length, segment_count);
                prop_assert_eq!(segment, i + 1);
                seen.insert(segment);
            }
            prop_assert_eq!(seen.len(), segment_count);
            prop_assert_eq!(
                segment_of(circuit_length - 1e-6, circuit_length, segment_count),
                segment_count
            );
        }

        #[test]
        fn prop_segment_matches_bounds(
            circuit_length in 1000.0f64..8000.0,
            distance_pct in 0.0f64..1.0,
        ) {
            let segmentation = TrackSegmentation::with_default_count(circuit_length).unwrap();
            let distance = distance_pct * circuit_length;
            let segment = segmentation.segment_of(distance);

            prop_assert!((1..=DEFAULT_SEGMENT_COUNT).contains(&segment));
            let bounds = segmentation.bounds()[segment - 1];
            prop_assert!(distance >= bounds.lower - 1e-9 && distance <= bounds.upper + 1e-9);
        }
    }
}
