//! CPU rasterization of draw lists into a tiny-skia pixmap.

use crate::renderer::{DrawCommand, DrawList};
use kurbo::{Affine, BezPath, PathEl};
use peniko::Color;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Paints draw commands onto a pixmap under a fixed transform.
///
/// `Blit` commands are skipped: pixels are copied into the pixmap by the
/// caller before painting.
pub struct PixmapPainter<'a> {
    pixmap: &'a mut Pixmap,
    transform: Transform,
}

impl<'a> PixmapPainter<'a> {
    pub fn new(pixmap: &'a mut Pixmap, transform: Affine) -> Self {
        Self {
            pixmap,
            transform: to_skia_transform(transform),
        }
    }

    pub fn paint(&mut self, list: &DrawList) {
        for command in list.iter() {
            match command {
                DrawCommand::FillRect { rect, color } => {
                    let Some(r) = tiny_skia::Rect::from_ltrb(
                        rect.x0 as f32,
                        rect.y0 as f32,
                        rect.x1 as f32,
                        rect.y1 as f32,
                    ) else {
                        continue;
                    };
                    self.pixmap.fill_rect(r, &paint_for(*color), self.transform, None);
                }
                DrawCommand::Stroke { path, width, color } => {
                    let Some(path) = to_skia_path(path) else {
                        log::trace!("Skipping empty path");
                        continue;
                    };
                    let stroke = Stroke {
                        width: *width as f32,
                        line_cap: LineCap::Round,
                        line_join: LineJoin::Round,
                        ..Default::default()
                    };
                    self.pixmap
                        .stroke_path(&path, &paint_for(*color), &stroke, self.transform, None);
                }
                DrawCommand::Blit { .. } => {}
            }
        }
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = true;
    paint
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
