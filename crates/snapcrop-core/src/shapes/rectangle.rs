//! Rectangle shape.

use super::AnnotationTrait;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned box spanned by two corners, in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub corner1: Point,
    pub corner2: Point,
}

impl Rectangle {
    /// Create a new rectangle. Corners are snapped to whole pixels.
    pub fn new(corner1: Point, corner2: Point) -> Self {
        Self {
            corner1: corner1.round(),
            corner2: corner2.round(),
        }
    }
}

impl AnnotationTrait for Rectangle {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.corner1, self.corner2)
    }

    fn transform(&mut self, affine: Affine) {
        self.corner1 = affine * self.corner1;
        self.corner2 = affine * self.corner2;
    }

    fn set_moving_point(&mut self, point: Point) {
        self.corner2 = point.round();
    }

    fn is_degenerate(&self) -> bool {
        let r = self.bounds();
        r.width() == 0.0 || r.height() == 0.0
    }
}
