use serde::{Deserialize, Serialize};

use super::CornerMarker;

/// Represents a 2D coordinate point on the circuit map
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box for coordinate calculations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn update(&mut self, point: Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Rotates `point` by `angle_rad` using the row-vector convention of the
/// published circuit rotations (`[x y] · R`).
pub fn rotate(point: Point2D, angle_rad: f64) -> Point2D {
    let (sin, cos) = angle_rad.sin_cos();
    Point2D::new(point.x * cos - point.y * sin, point.x * sin + point.y * cos)
}

/// Where the label of `corner` goes on a map rotated by `rotation_deg`.
///
/// The label is pushed `offset` map units away from the corner in the
/// direction of the corner angle, then rotated with the rest of the map.
pub fn corner_label_position(corner: &CornerMarker, rotation_deg: f64, offset: f64) -> Point2D {
    let push = rotate(Point2D::new(offset, 0.), corner.angle.to_radians());
    let label = Point2D::new(corner.x + push.x, corner.y + push.y);
    rotate(label, rotation_deg.to_radians())
}
