//! Line segment.

use super::AnnotationTrait;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
}

impl Line {
    /// Create a new line. Endpoints are snapped to whole pixels.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start: start.round(),
            end: end.round(),
        }
    }
}

impl AnnotationTrait for Line {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
    }

    fn set_moving_point(&mut self, point: Point) {
        self.end = point.round();
    }

    fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}
