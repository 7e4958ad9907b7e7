//! Final image composition: crop, vertical flip, and annotation flattening.

use crate::raster::PixmapPainter;
use crate::renderer::{DrawList, RenderStyle, annotation_commands};
use kurbo::{Affine, Point, Rect};
use snapcrop_core::canvas::Canvas;
use snapcrop_core::selection::SelectionRegion;
use snapcrop_core::session::Session;
use snapcrop_core::store::AnnotationStore;
use snapcrop_core::tools::ToolSet;
use thiserror::Error;
use tiny_skia::Pixmap;

/// Composition errors.
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("Cannot allocate a {width}x{height} image")]
    Allocation { width: u32, height: u32 },
}

/// Row order of a raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Row 0 is the top of the picture.
    TopDown,
    /// Row 0 is the bottom of the picture.
    BottomUp,
}

/// An RGBA8 image produced by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rows: RowOrder,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// Pixel at buffer position `(x, y)`, in the buffer's own row order.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    /// Copy with rows reordered so row 0 is the top of the picture.
    pub fn to_top_down(&self) -> RasterImage {
        match self.rows {
            RowOrder::TopDown => self.clone(),
            RowOrder::BottomUp => {
                let stride = self.width as usize * 4;
                let rgba = self.rgba.chunks_exact(stride).rev().flatten().copied().collect();
                RasterImage {
                    width: self.width,
                    height: self.height,
                    rows: RowOrder::TopDown,
                    rgba,
                }
            }
        }
    }
}

/// Produces the exported image from a session snapshot.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    style: RenderStyle,
}

impl Compositor {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    /// Export using a session's current state.
    pub fn export_session(&self, session: &Session) -> Result<RasterImage, CompositeError> {
        self.export(
            session.canvas(),
            &session.selection,
            &session.store,
            session.active_tools(),
        )
    }

    /// Crop the canvas to the selection and flatten visible annotations onto it.
    ///
    /// Output row `y` holds canvas row `max.y - y` (bottom-left origin), and
    /// annotations are mapped the same way: `p -> (p.x - min.x, max.y - p.y)`.
    /// Without a usable selection the whole canvas is exported.
    ///
    /// Source rows are read over `(min.y, max.y]`, clamped to the canvas. A
    /// crop reaching the bottom edge therefore repeats the last canvas row in
    /// output row 0 and never shows its top row `min.y`; a full-canvas export
    /// drops canvas row 0 and duplicates row `height - 1`.
    pub fn export(
        &self,
        canvas: &Canvas,
        selection: &SelectionRegion,
        store: &AnnotationStore,
        tools: &ToolSet,
    ) -> Result<RasterImage, CompositeError> {
        let (min, max) = selection.bounds_or_full(canvas.size());
        let (x0, y_max) = (min.x as u32, max.y as u32);
        let width = (max.x - min.x) as u32;
        let height = (max.y - min.y) as u32;
        log::info!("Compositing {}x{} at ({}, {})", width, height, min.x, min.y);

        let mut pixmap =
            Pixmap::new(width, height).ok_or(CompositeError::Allocation { width, height })?;
        blit_flipped(canvas, &mut pixmap, x0, y_max);

        let flip = Affine::new([1.0, 0.0, 0.0, -1.0, -min.x, max.y]);
        let mut list = DrawList::new();
        let extent = Rect::from_points(Point::ZERO, Point::new(width as f64, height as f64));
        annotation_commands(&mut list, store.visible_all(tools), flip, &self.style, extent);
        PixmapPainter::new(&mut pixmap, Affine::IDENTITY).paint(&list);

        // Every pixel is opaque, so premultiplied and straight alpha agree.
        Ok(RasterImage {
            width,
            height,
            rows: RowOrder::BottomUp,
            rgba: pixmap.take(),
        })
    }
}

/// Copy canvas columns `x0..x0 + width`, taking output row `y` from canvas row `y_max - y`.
fn blit_flipped(canvas: &Canvas, pixmap: &mut Pixmap, x0: u32, y_max: u32) {
    let width = pixmap.width() as usize;
    let height = pixmap.height();
    let stride = width * 4;
    let data = pixmap.data_mut();
    for y in 0..height {
        // `row` clamps the source row when the crop touches the bottom edge.
        let src = canvas.row(y_max - y);
        let src = &src[x0 as usize * 3..(x0 as usize + width) * 3];
        let dst = &mut data[y as usize * stride..(y as usize + 1) * stride];
        for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(3)) {
            out.copy_from_slice(&[px[0], px[1], px[2], 255]);
        }
    }
}
