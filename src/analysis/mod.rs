// Lap comparison analytics: distance-aligned deltas and minisector dominance

pub mod delta;
pub mod dominance;
pub(crate) mod interpolation;
pub mod segments;

pub use delta::{AlignedDelta, compute_delta, validate_series};
pub use dominance::{DominanceMap, SegmentWinner, compute_dominance, segment_times};
pub use segments::{
    DEFAULT_SEGMENT_COUNT, SegmentBounds, TrackSegmentation, segment_bounds, segment_of,
};
