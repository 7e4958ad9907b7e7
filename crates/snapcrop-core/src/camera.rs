//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Default lower zoom bound.
pub const DEFAULT_MIN_ZOOM: f64 = 0.3;
/// Default upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f64 = 100.0;
/// Smallest lower bound a camera accepts.
pub const ZOOM_FLOOR: f64 = 0.01;
/// Smallest damping factor applied to a scroll step.
const MIN_ZOOM_DAMPING: f64 = 0.05;

/// Camera manages the view transform between the screen and the captured canvas.
///
/// The mapping is anchored on a pair of points: `target` (in canvas space)
/// is drawn at `offset` (in screen space), and everything else is scaled by
/// `zoom` around that pair:
///
/// ```text
/// screen = (canvas - target) * zoom + offset
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Canvas point currently drawn at `offset`.
    pub target: Point,
    /// Screen point that `target` maps to.
    pub offset: Point,
    /// Current zoom level (1.0 = one canvas pixel per screen pixel).
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Point::ZERO,
            offset: Point::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom bounds.
    ///
    /// Non-finite bounds fall back to the defaults and both bounds are raised
    /// to at least [`ZOOM_FLOOR`]. Reversed bounds are swapped. The starting
    /// zoom of 1.0 is clamped into range.
    pub fn with_zoom_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        let sanitize = |bound: f64, fallback: f64| {
            if bound.is_finite() { bound.max(ZOOM_FLOOR) } else { fallback }
        };
        let min_zoom = sanitize(min_zoom, DEFAULT_MIN_ZOOM);
        let max_zoom = sanitize(max_zoom, DEFAULT_MAX_ZOOM);
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts canvas coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset.to_vec2())
            * Affine::scale(self.zoom)
            * Affine::translate(-self.target.to_vec2())
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        let v = (screen_point - self.offset) / self.zoom;
        self.target + v
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        let v = (canvas_point - self.target) * self.zoom;
        self.offset + v
    }

    /// Apply one scroll step, keeping the canvas point under `cursor` fixed.
    ///
    /// The step is damped by `ln(zoom + 0.9)` so a wheel tick feels the same
    /// at every scale. Below zoom 0.15 the damping is held at a small positive
    /// minimum so zooming in still recovers. The result is clamped into
    /// `[min_zoom, max_zoom]`.
    pub fn apply_zoom_delta(&mut self, delta: f64, cursor: Point) {
        self.target = self.screen_to_canvas(cursor);
        self.offset = cursor;
        let step = delta * (self.zoom + 0.9).ln().max(MIN_ZOOM_DAMPING);
        self.zoom = (self.zoom + step).clamp(self.min_zoom, self.max_zoom);
    }

    /// Pan by a screen-space delta.
    ///
    /// The canvas point that sat at `offset + delta` moves to `offset`.
    pub fn pan(&mut self, delta: Vec2) {
        self.target = self.screen_to_canvas(self.offset + delta);
    }
}
