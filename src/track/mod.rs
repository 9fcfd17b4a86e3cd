// Circuit geometry: corner markers, map orientation and the minisector track map

pub mod geometry;
pub mod map;

use serde::{Deserialize, Serialize};

use crate::{errors::LapDeltaError, telemetry::SessionInfo};

pub use geometry::{BoundingBox, Point2D, corner_label_position, rotate};
pub use map::{TrackMap, TrackMapSegment};

/// Layout information for one circuit
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct CircuitInfo {
    /// Length of one lap in meters
    pub length: f64,
    /// Rotation in degrees that puts the map in its official orientation
    pub rotation_deg: f64,
    pub corners: Vec<CornerMarker>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct CornerMarker {
    pub number: u32,
    /// Suffix for corners sharing a number, e.g. "a" in 9a
    pub letter: String,
    /// Distance from the start line in meters
    pub distance: f64,
    /// Direction, in degrees, the label is pushed away from the track
    pub angle: f64,
    pub x: f64,
    pub y: f64,
}

impl CornerMarker {
    pub fn label(&self) -> String {
        format!("{}{}", self.number, self.letter)
    }
}

/// Source of circuit layouts for a session
pub trait CircuitGeometryProvider {
    fn circuit(&self, session: &SessionInfo) -> Result<CircuitInfo, LapDeltaError>;
}
