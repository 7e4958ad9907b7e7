//! Arrow shape.

use super::AnnotationTrait;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An arrow from `start` to `end`. The head is derived when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    /// Start point.
    pub start: Point,
    /// End point (where the arrowhead points).
    pub end: Point,
}

impl Arrow {
    /// Create a new arrow. Endpoints are snapped to whole pixels.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start: start.round(),
            end: end.round(),
        }
    }

    /// Get the direction vector (normalized).
    pub fn direction(&self) -> Vec2 {
        let d = self.end - self.start;
        let len = d.hypot();
        if len < f64::EPSILON {
            Vec2::new(1.0, 0.0)
        } else {
            d / len
        }
    }

    /// Tips of the two chevron legs.
    ///
    /// The reversed shaft direction is rotated by `+angle` and `-angle`
    /// (radians) and scaled to `length`, both measured from `end`.
    pub fn head_points(&self, length: f64, angle: f64) -> (Point, Point) {
        let back = -self.direction();
        let left = Affine::rotate(angle) * back.to_point();
        let right = Affine::rotate(-angle) * back.to_point();
        (
            self.end + left.to_vec2() * length,
            self.end + right.to_vec2() * length,
        )
    }
}

impl AnnotationTrait for Arrow {
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
