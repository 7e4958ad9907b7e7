//! Crosshair marker.

use super::AnnotationTrait;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A single pinned point, drawn as full-bleed crosshair lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Point,
}

impl Marker {
    pub fn new(position: Point) -> Self {
        Self {
            position: position.round(),
        }
    }
}

impl AnnotationTrait for Marker {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.position, self.position)
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
    }

    fn set_moving_point(&mut self, point: Point) {
        self.position = point.round();
    }
}
