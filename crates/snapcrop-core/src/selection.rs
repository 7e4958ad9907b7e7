//! Two-anchor crop selection, clamped to the canvas.

use kurbo::{Point, Rect, Size};

/// A selection with both anchors placed.
///
/// `min` and `max` are derived together from the anchors and only exist
/// here, so they can never be read before both anchors are set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub first: Point,
    pub second: Point,
    pub min: Point,
    pub max: Point,
}

impl Region {
    fn from_anchors(first: Point, second: Point, bounds: Size) -> Self {
        let first = clamp_to(first, bounds);
        let second = clamp_to(second, bounds);
        Self {
            first,
            second,
            min: Point::new(first.x.min(second.x), first.y.min(second.y)),
            max: Point::new(first.x.max(second.x), first.y.max(second.y)),
        }
    }

    /// True when the two anchors coincide.
    pub fn is_degenerate(&self) -> bool {
        self.first == self.second
    }

    /// The region as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchors {
    Unset,
    First(Point),
    Second(Point),
    Complete(Region),
}

/// The four rectangles that cover the canvas outside a selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingBands {
    pub top: Rect,
    pub bottom: Rect,
    pub left: Rect,
    pub right: Rect,
}

impl ShadingBands {
    pub fn iter(&self) -> impl Iterator<Item = Rect> {
        [self.top, self.bottom, self.left, self.right].into_iter()
    }
}

/// Crop selection manager.
#[derive(Debug, Clone)]
pub struct SelectionRegion {
    anchors: Anchors,
    bounds: Size,
}

impl SelectionRegion {
    /// Create an empty selection bounded by the given canvas size.
    pub fn new(bounds: Size) -> Self {
        Self {
            anchors: Anchors::Unset,
            bounds,
        }
    }

    /// Clear the first anchor so the next gesture starts a fresh region.
    pub fn begin_new_selection(&mut self) {
        self.anchors = match self.anchors {
            Anchors::Unset | Anchors::First(_) => Anchors::Unset,
            Anchors::Second(second) => Anchors::Second(second),
            Anchors::Complete(region) => Anchors::Second(region.second),
        };
    }

    /// Place the first anchor.
    pub fn set_first(&mut self, point: Point) {
        let point = point.round();
        self.anchors = match self.anchors {
            Anchors::Unset => Anchors::First(point),
            Anchors::First(current) if current == point => return,
            Anchors::First(_) => Anchors::First(point),
            Anchors::Second(second) => {
                Anchors::Complete(Region::from_anchors(point, second, self.bounds))
            }
            Anchors::Complete(region) if region.first == point => return,
            Anchors::Complete(region) => {
                Anchors::Complete(Region::from_anchors(point, region.second, self.bounds))
            }
        };
    }

    /// Place the second anchor.
    pub fn set_second(&mut self, point: Point) {
        let point = point.round();
        self.anchors = match self.anchors {
            Anchors::Unset => Anchors::Second(point),
            Anchors::Second(current) if current == point => return,
            Anchors::Second(_) => Anchors::Second(point),
            Anchors::First(first) => {
                Anchors::Complete(Region::from_anchors(first, point, self.bounds))
            }
            Anchors::Complete(region) if region.second == point => return,
            Anchors::Complete(region) => {
                Anchors::Complete(Region::from_anchors(region.first, point, self.bounds))
            }
        };
    }

    /// Current anchors, if placed.
    pub fn anchors(&self) -> (Option<Point>, Option<Point>) {
        match self.anchors {
            Anchors::Unset => (None, None),
            Anchors::First(first) => (Some(first), None),
            Anchors::Second(second) => (None, Some(second)),
            Anchors::Complete(region) => (Some(region.first), Some(region.second)),
        }
    }

    pub fn first(&self) -> Option<Point> {
        self.anchors().0
    }

    pub fn second(&self) -> Option<Point> {
        self.anchors().1
    }

    /// The complete region, including degenerate ones.
    pub fn region(&self) -> Option<&Region> {
        match &self.anchors {
            Anchors::Complete(region) => Some(region),
            _ => None,
        }
    }

    /// Both anchors set and distinct.
    pub fn has_region(&self) -> bool {
        self.region().is_some_and(|r| !r.is_degenerate())
    }

    /// Crop bounds, falling back to the whole canvas when there is no usable region.
    ///
    /// A region with zero width or height also falls back, so the result
    /// always has a positive area.
    pub fn bounds_or_full(&self, canvas: Size) -> (Point, Point) {
        match self.region() {
            Some(r) if r.max.x > r.min.x && r.max.y > r.min.y => (r.min, r.max),
            _ => (Point::ZERO, Point::new(canvas.width, canvas.height)),
        }
    }

    /// Bands covering the canvas outside the selected region.
    pub fn shading(&self, canvas: Size) -> Option<ShadingBands> {
        if !self.has_region() {
            return None;
        }
        let r = self.region()?;
        let (w, h) = (canvas.width, canvas.height);
        Some(ShadingBands {
            left: Rect::new(0.0, 0.0, r.min.x, h),
            top: Rect::new(r.min.x, 0.0, w, r.min.y),
            right: Rect::new(r.max.x, r.min.y, w, h),
            bottom: Rect::new(r.min.x, r.max.y, r.max.x, h),
        })
    }
}

fn clamp_to(p: Point, bounds: Size) -> Point {
    Point::new(p.x.clamp(0.0, bounds.width), p.y.clamp(0.0, bounds.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Size = Size::new(800.0, 600.0);

    fn in_bounds(p: Point) -> bool {
        (0.0..=CANVAS.width).contains(&p.x) && (0.0..=CANVAS.height).contains(&p.y)
    }

    #[test]
    fn test_empty_selection_uses_full_canvas() {
        let selection = SelectionRegion::new(CANVAS);
        assert!(!selection.has_region());
        assert_eq!(
            selection.bounds_or_full(CANVAS),
            (Point::ZERO, Point::new(800.0, 600.0))
        );
        assert!(selection.shading(CANVAS).is_none());
    }

    #[test]
    fn test_first_anchor_alone_is_not_clamped() {
        let mut selection = SelectionRegion::new(CANVAS);
        selection.set_first(Point::new(-20.4, 900.6));
        assert_eq!(selection.first(), Some(Point::new(-20.0, 901.0)));
        assert!(selection.region().is_none());
    }

    #[test]
    fn test_min_max_from_anchors() {
        let mut selection = SelectionRegion::new(CANVAS);
        selection.set_first(Point::new(400.0, 100.0));
        selection.set_second(Point::new(100.0, 500.0));

        let region = selection.region().unwrap();
        assert_eq!(region.min, Point::new(100.0, 100.0));
        assert_eq!(region.max, Point::new(400.0, 500.0));
        assert!(selection.has_region());
    }

    #[test]
    fn test_both_anchors_clamped_once_paired() {
        let mut selection = SelectionRegion::new(CANVAS);
        selection.set_first(Point::new(-50.0, -50.0));
        selection.set_second(Point::new(1000.0, 700.2));

        let region = selection.region().unwrap();
        assert_eq!(region.first, Point::ZERO);
        assert_eq!(region.second, Point::new(800.0, 600.0));
        assert_eq!(region.min, Point::ZERO);
        assert_eq!(region.max, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_invariants_over_arbitrary_updates() {
        let mut selection = SelectionRegion::new(CANVAS);
        let points = [
            Point::new(-100.0, 20.0),
            Point::new(900.0, -3.0),
            Point::new(400.5, 300.5),
            Point::new(12.0, 1200.0),
            Point::new(799.9, 599.9),
            Point::new(0.0, 0.0),
        ];
        for (i, a) in points.iter().enumerate() {
            for b in points.iter().skip(i) {
                selection.set_first(*a);
                selection.set_second(*b);
                let r = selection.region().unwrap();
                assert!(r.min.x <= r.max.x && r.min.y <= r.max.y);
                for p in [r.first, r.second, r.min, r.max] {
                    assert!(in_bounds(p), "{p:?} out of bounds");
                }
            }
        }
    }

    #[test]
    fn test_degenerate_selection_is_not_a_region() {
        let mut selection = SelectionRegion::new(CANVAS);
        selection.set_first(Point::new(50.0, 50.0));
        selection.set_second(Point::new(50.2, 49.8));

        assert!(selection.region().is_some());
        assert!(!selection.has_region());
        assert!(selection.shading(CANVAS).is_none());
        assert_eq!(selection.bounds_or_full(CANVAS).1, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_zero_width_region_falls_back_to_full() {
        let mut selection = SelectionRegion::new(CANVAS);
        selection.set_first(Point::new(50.0, 10.0));
        selection.set_second(Point::new(50.0, 300.0));
        assert!(selection.has_region());
        assert_eq!(
            selection.bounds_or_full(CANVAS),
            (Point::ZERO, Point::new(800.0, 600.0))
        );
    }

    #[test]
    fn test_begin_new_selection_clears_first_only() {
        let mut selection = SelectionRegion::new(CANVAS);
        selection.set_first(Point::new(10.0, 10.0));
        selection.set_second(Point::new(20.0, 30.0));

        selection.begin_new_selection();
        assert_eq!(selection.anchors(), (None, Some(Point::new(20.0, 30.0))));
        assert!(selection.region().is_none());

        selection.set_first(Point::new(5.0, 5.0));
        assert_eq!(selection.region().unwrap().min, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_shading_bands_cover_outside() {
        let mut selection = SelectionRegion::new(CANVAS);
        selection.set_first(Point::new(100.0, 100.0));
        selection.set_second(Point::new(400.0, 500.0));

        let bands = selection.shading(CANVAS).unwrap();
        assert_eq!(bands.left, Rect::new(0.0, 0.0, 100.0, 600.0));
        assert_eq!(bands.top, Rect::new(100.0, 0.0, 800.0, 100.0));
        assert_eq!(bands.right, Rect::new(400.0, 100.0, 800.0, 600.0));
        assert_eq!(bands.bottom, Rect::new(100.0, 500.0, 400.0, 600.0));

        let shaded: f64 = bands.iter().map(|r| r.area()).sum();
        assert!((shaded - (800.0 * 600.0 - 300.0 * 400.0)).abs() < f64::EPSILON);
    }
}
