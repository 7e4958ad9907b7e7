//! Draw commands and the shape-drawing routines shared by preview and export.

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Shape as KurboShape, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use snapcrop_core::canvas::Canvas;
use snapcrop_core::session::Session;
use snapcrop_core::shapes::{Annotation, SerializableColor};
use snapcrop_core::store::Visible;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// A primitive draw call in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Solid rectangle.
    FillRect { rect: Rect, color: Color },
    /// Stroked path.
    Stroke { path: BezPath, width: f64, color: Color },
    /// The captured canvas image, stretched into `dest`.
    Blit { dest: Rect },
}

/// Ordered list of draw calls for one frame or one export.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    pub fn stroke(&mut self, path: BezPath, width: f64, color: Color) {
        self.push(DrawCommand::Stroke { path, width, color });
    }

    fn segment(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.stroke(path, width, color);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Colors and sizes for everything drawn over the canvas.
///
/// Annotation sizes are in canvas pixels, so they scale with zoom in the
/// preview and come out at the same size in the export. Selection chrome
/// is sized in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub annotation_color: SerializableColor,
    /// Color of the draft a held tool is still shaping.
    pub draft_color: SerializableColor,
    pub stroke_width: f64,
    pub marker_width: f64,
    /// Length of each arrowhead leg.
    pub arrow_head_length: f64,
    /// Angle between the shaft and each arrowhead leg, in degrees.
    pub arrow_head_angle: f64,
    pub corner_radius: f64,
    pub shading_color: SerializableColor,
    pub selection_color: SerializableColor,
    pub selection_width: f64,
    pub guide_width: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            annotation_color: SerializableColor::new(230, 41, 55, 255),
            draft_color: SerializableColor::new(255, 161, 0, 255),
            stroke_width: 3.0,
            marker_width: 1.0,
            arrow_head_length: 15.0,
            arrow_head_angle: 30.0,
            corner_radius: 4.0,
            shading_color: SerializableColor::new(10, 10, 10, 180),
            selection_color: SerializableColor::new(0, 121, 241, 255),
            selection_width: 2.0,
            guide_width: 1.0,
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The captured image, for `Blit` commands.
    pub canvas: &'a Canvas,
    /// Commands in canvas coordinates.
    pub commands: &'a DrawList,
    /// Canvas to screen transform.
    pub transform: Affine,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Background color.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas, commands: &'a DrawList, viewport_size: Size) -> Self {
        Self {
            canvas,
            commands,
            transform: Affine::IDENTITY,
            viewport_size,
            background_color: Color::from_rgba8(24, 24, 24, 255),
        }
    }

    /// Set the canvas to screen transform.
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the scene/command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Append draw calls for one annotation.
///
/// `extent` is the drawable area; markers span it edge to edge.
fn draw_annotation(
    list: &mut DrawList,
    annotation: &Annotation,
    color: Color,
    style: &RenderStyle,
    extent: Rect,
) {
    match annotation {
        Annotation::Marker(marker) => {
            let p = marker.position;
            list.segment(
                Point::new(extent.x0, p.y),
                Point::new(extent.x1, p.y),
                style.marker_width,
                color,
            );
            list.segment(
                Point::new(p.x, extent.y0),
                Point::new(p.x, extent.y1),
                style.marker_width,
                color,
            );
        }
        Annotation::Line(line) => {
            list.segment(line.start, line.end, style.stroke_width, color);
        }
        Annotation::Arrow(arrow) => {
            let (left, right) = arrow.head_points(
                style.arrow_head_length,
                style.arrow_head_angle.to_radians(),
            );
            let mut path = BezPath::new();
            path.move_to(arrow.start);
            path.line_to(arrow.end);
            path.move_to(left);
            path.line_to(arrow.end);
            path.line_to(right);
            list.stroke(path, style.stroke_width, color);
        }
        Annotation::Rectangle(rect) => {
            let bounds = Rect::from_points(rect.corner1, rect.corner2);
            let radius = style
                .corner_radius
                .min(bounds.width() / 2.0)
                .min(bounds.height() / 2.0)
                .max(0.0);
            let path = RoundedRect::from_rect(bounds, radius).to_path(0.1);
            list.stroke(path, style.stroke_width, color);
        }
    }
}

/// Append draw calls for every visible annotation, mapped through `map` first.
///
/// Live drafts use `draft_color`, committed annotations `annotation_color`.
///
/// The preview passes the identity; the exporter passes its crop-and-flip
/// mapping, so both go through the same routines.
pub fn annotation_commands<'a>(
    list: &mut DrawList,
    visible: impl IntoIterator<Item = Visible<'a>>,
    map: Affine,
    style: &RenderStyle,
    extent: Rect,
) {
    for entry in visible {
        let color: Color = if entry.live {
            style.draft_color.into()
        } else {
            style.annotation_color.into()
        };
        if map == Affine::IDENTITY {
            draw_annotation(list, entry.annotation, color, style, extent);
        } else {
            draw_annotation(list, &entry.annotation.transformed(map), color, style, extent);
        }
    }
}

/// Build the on-screen preview for a session, in canvas coordinates.
///
/// Order: canvas image, shading outside the selection, selection outline,
/// anchor guides while selecting, then annotations on top.
pub fn preview_commands(session: &Session, style: &RenderStyle) -> DrawList {
    let mut list = DrawList::new();
    let size = session.canvas().size();
    let extent = size.to_rect();
    // Screen-pixel widths expressed in canvas units.
    let zoom = session.camera.zoom;

    list.push(DrawCommand::Blit { dest: extent });

    if let Some(bands) = session.selection.shading(size) {
        let shade: Color = style.shading_color.into();
        for band in bands.iter().filter(|r| r.area() > 0.0) {
            list.fill_rect(band, shade);
        }
    }

    let selection_color: Color = style.selection_color.into();
    if let Some(region) = session.selection.region().filter(|_| session.selection.has_region()) {
        let path = region.rect().to_path(0.1);
        list.stroke(path, style.selection_width / zoom, selection_color);
    }

    if session.is_selecting() {
        let (first, second) = session.selection.anchors();
        for anchor in [first, second].into_iter().flatten() {
            let w = style.guide_width / zoom;
            list.segment(Point::new(extent.x0, anchor.y), Point::new(extent.x1, anchor.y), w, selection_color);
            list.segment(Point::new(anchor.x, extent.y0), Point::new(anchor.x, extent.y1), w, selection_color);
        }
    }

    annotation_commands(
        &mut list,
        session.store.visible_all(session.active_tools()),
        Affine::IDENTITY,
        style,
        extent,
    );

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapcrop_core::input::{InputState, KeyEvent, MouseButton, PointerEvent};
    use snapcrop_core::session::SessionOptions;
    use snapcrop_core::shapes::{Arrow, Marker};

    fn session(width: u32, height: u32) -> Session {
        let canvas = Canvas::new(width, height, vec![0; (width * height * 3) as usize]).unwrap();
        Session::new(canvas, SessionOptions::default())
    }

    fn stroke_count(list: &DrawList) -> usize {
        list.iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count()
    }

    #[test]
    fn test_marker_spans_extent() {
        let mut list = DrawList::new();
        let marker = Annotation::Marker(Marker::new(Point::new(10.0, 20.0)));
        let white = Color::from_rgba8(255, 255, 255, 255);
        draw_annotation(&mut list, &marker, white, &RenderStyle::default(), Rect::new(0.0, 0.0, 100.0, 50.0));

        let bounds: Vec<Rect> = list
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke { path, .. } => Some(path.bounding_box()),
                _ => None,
            })
            .collect();
        assert_eq!(bounds, vec![Rect::new(0.0, 20.0, 100.0, 20.0), Rect::new(10.0, 0.0, 10.0, 50.0)]);
    }

    #[test]
    fn test_arrow_is_one_path_with_chevron() {
        let mut list = DrawList::new();
        let arrow = Annotation::Arrow(Arrow::new(Point::ZERO, Point::new(100.0, 0.0)));
        let white = Color::from_rgba8(255, 255, 255, 255);
        draw_annotation(&mut list, &arrow, white, &RenderStyle::default(), Rect::ZERO);

        assert_eq!(list.len(), 1);
        let Some(DrawCommand::Stroke { path, .. }) = list.iter().next() else {
            panic!("expected a stroke");
        };
        let bbox = path.bounding_box();
        assert!((bbox.x1 - 100.0).abs() < 1e-9);
        assert!(bbox.height() > 0.0);
    }

    #[test]
    fn test_empty_session_preview_is_just_the_canvas() {
        let s = session(64, 48);
        let list = preview_commands(&s, &RenderStyle::default());
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.iter().next(),
            Some(&DrawCommand::Blit { dest: Rect::new(0.0, 0.0, 64.0, 48.0) })
        );
    }

    #[test]
    fn test_selection_preview_has_shading_outline_and_guides() {
        let mut s = session(800, 600);
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Down {
            position: Point::new(100.0, 100.0),
            button: MouseButton::Right,
        });
        s.update(&input);
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Move { position: Point::new(400.0, 500.0) });
        s.update(&input);

        let list = preview_commands(&s, &RenderStyle::default());
        let fills = list
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(fills, 4);
        // Outline plus two guides per anchor.
        assert_eq!(stroke_count(&list), 1 + 4);
    }

    #[test]
    fn test_live_draft_is_previewed() {
        let mut s = session(200, 200);
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Move { position: Point::new(10.0, 10.0) });
        input.handle_key_event(KeyEvent::Pressed("l".to_string()));
        s.update(&input);
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Move { position: Point::new(90.0, 10.0) });
        s.update(&input);

        let list = preview_commands(&s, &RenderStyle::default());
        assert_eq!(stroke_count(&list), 1);
    }

    #[test]
    fn test_draft_and_committed_colors() {
        let style = RenderStyle::default();
        let stroke_colors = |s: &Session| -> Vec<Color> {
            preview_commands(s, &style)
                .iter()
                .filter_map(|c| match c {
                    DrawCommand::Stroke { color, .. } => Some(*color),
                    _ => None,
                })
                .collect()
        };

        let mut s = session(200, 200);
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Move { position: Point::new(10.0, 10.0) });
        input.handle_key_event(KeyEvent::Pressed("l".to_string()));
        s.update(&input);
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Move { position: Point::new(90.0, 10.0) });
        s.update(&input);
        input.begin_frame();
        assert_eq!(stroke_colors(&s), vec![Color::from(style.draft_color)]);

        input.handle_key_event(KeyEvent::Released("l".to_string()));
        s.update(&input);
        assert_eq!(stroke_colors(&s), vec![Color::from(style.annotation_color)]);
    }
}
