//! Annotation shapes placed over the captured canvas.

mod arrow;
mod line;
mod marker;
mod rectangle;

pub use arrow::Arrow;
pub use line::Line;
pub use marker::Marker;
pub use rectangle::Rectangle;

use kurbo::{Affine, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Kinds of annotation, one track per kind in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Marker,
    Line,
    Arrow,
    Rectangle,
}

impl AnnotationKind {
    /// Paint order: boxes at the back, markers on top.
    pub const ALL: [AnnotationKind; 4] = [
        AnnotationKind::Rectangle,
        AnnotationKind::Line,
        AnnotationKind::Arrow,
        AnnotationKind::Marker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnnotationKind::Marker => "Marker",
            AnnotationKind::Line => "Line",
            AnnotationKind::Arrow => "Arrow",
            AnnotationKind::Rectangle => "Rectangle",
        }
    }
}

/// Common behavior for annotation shapes.
pub trait AnnotationTrait {
    /// Bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Apply an affine transform to every stored point.
    fn transform(&mut self, affine: Affine);

    /// Move the point that follows the pointer while drafting.
    fn set_moving_point(&mut self, point: Point);

    /// True when the shape has no extent (a click without a drag).
    fn is_degenerate(&self) -> bool {
        false
    }
}

/// A placed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Marker(Marker),
    Line(Line),
    Arrow(Arrow),
    Rectangle(Rectangle),
}

impl Annotation {
    /// Start a new shape of the given kind anchored at `point`.
    pub fn begin(kind: AnnotationKind, point: Point) -> Self {
        match kind {
            AnnotationKind::Marker => Annotation::Marker(Marker::new(point)),
            AnnotationKind::Line => Annotation::Line(Line::new(point, point)),
            AnnotationKind::Arrow => Annotation::Arrow(Arrow::new(point, point)),
            AnnotationKind::Rectangle => Annotation::Rectangle(Rectangle::new(point, point)),
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Marker(_) => AnnotationKind::Marker,
            Annotation::Line(_) => AnnotationKind::Line,
            Annotation::Arrow(_) => AnnotationKind::Arrow,
            Annotation::Rectangle(_) => AnnotationKind::Rectangle,
        }
    }

    fn as_trait(&self) -> &dyn AnnotationTrait {
        match self {
            Annotation::Marker(s) => s,
            Annotation::Line(s) => s,
            Annotation::Arrow(s) => s,
            Annotation::Rectangle(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn AnnotationTrait {
        match self {
            Annotation::Marker(s) => s,
            Annotation::Line(s) => s,
            Annotation::Arrow(s) => s,
            Annotation::Rectangle(s) => s,
        }
    }

    /// Return a copy mapped through `affine`.
    pub fn transformed(&self, affine: Affine) -> Self {
        let mut out = self.clone();
        out.as_trait_mut().transform(affine);
        out
    }
}

impl AnnotationTrait for Annotation {
    fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    fn transform(&mut self, affine: Affine) {
        self.as_trait_mut().transform(affine);
    }

    fn set_moving_point(&mut self, point: Point) {
        self.as_trait_mut().set_moving_point(point);
    }

    fn is_degenerate(&self) -> bool {
        self.as_trait().is_degenerate()
    }
}
