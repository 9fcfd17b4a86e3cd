use itertools::Itertools;

use super::{
    CircuitInfo,
    geometry::{BoundingBox, Point2D, rotate},
};
use crate::{analysis::TrackSegmentation, telemetry::LapSeries};

/// Part of the track outline belonging to one minisector
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMapSegment {
    pub index: usize,
    pub points: Vec<Point2D>,
}

/// Rotated track outline of one lap, split by minisector
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMap {
    pub segments: Vec<TrackMapSegment>,
    /// First position of the lap, used as the start line marker
    pub start: Option<Point2D>,
    pub bounds: BoundingBox,
}

impl TrackMap {
    /// Builds the outline from the lap's position samples. Every segment is
    /// present, segments the lap has no samples in have no points.
    pub fn build(lap: &LapSeries, circuit: &CircuitInfo, segmentation: &TrackSegmentation) -> Self {
        let angle = circuit.rotation_deg.to_radians();
        let mut bounds = BoundingBox::new();
        let mut segments = (1..=segmentation.segment_count())
            .map(|index| TrackMapSegment {
                index,
                points: Vec::new(),
            })
            .collect_vec();

        for sample in &lap.samples {
            let point = rotate(Point2D::new(sample.x, sample.y), angle);
            bounds.update(point);
            segments[segmentation.segment_of(sample.distance) - 1]
                .points
                .push(point);
        }

        // join each segment to the next so the outline has no gaps when drawn
        for i in 1..segments.len() {
            if let Some(first) = segments[i].points.first().copied() {
                segments[i - 1].points.push(first);
            }
        }

        let start = lap
            .samples
            .first()
            .map(|s| rotate(Point2D::new(s.x, s.y), angle));
        Self {
            segments,
            start,
            bounds,
        }
    }
}
