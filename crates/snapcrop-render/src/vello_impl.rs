//! Vello-based renderer implementation.

use crate::renderer::{DrawCommand, RenderContext, Renderer};
use kurbo::{Affine, Cap, Join, Stroke};
use peniko::Fill;
use snapcrop_core::canvas::Canvas;
use std::sync::Arc;
use vello::Scene;

/// Vello-based renderer for the live preview.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Uploaded canvas image. The capture never changes, so it is built once.
    canvas_image: Option<peniko::ImageData>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            canvas_image: None,
        }
    }

    /// Get the built scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take the built scene, leaving an empty one behind.
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn canvas_image(&mut self, canvas: &Canvas) -> peniko::ImageData {
        self.canvas_image
            .get_or_insert_with(|| {
                log::debug!("Uploading {}x{} canvas image", canvas.width(), canvas.height());
                peniko::ImageData {
                    data: peniko::Blob::new(Arc::new(canvas.to_rgba8())),
                    format: peniko::ImageFormat::Rgba8,
                    width: canvas.width(),
                    height: canvas.height(),
                    alpha_type: peniko::ImageAlphaType::Alpha,
                }
            })
            .clone()
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        let transform = ctx.transform;

        for command in ctx.commands.iter() {
            match command {
                DrawCommand::FillRect { rect, color } => {
                    self.scene.fill(Fill::NonZero, transform, *color, None, rect);
                }
                DrawCommand::Stroke { path, width, color } => {
                    let stroke = Stroke::new(*width).with_caps(Cap::Round).with_join(Join::Round);
                    self.scene.stroke(&stroke, transform, *color, None, path);
                }
                DrawCommand::Blit { dest } => {
                    let image = self.canvas_image(ctx.canvas);
                    let scale_x = dest.width() / image.width as f64;
                    let scale_y = dest.height() / image.height as f64;
                    let image_transform = transform
                        * Affine::translate((dest.x0, dest.y0))
                        * Affine::scale_non_uniform(scale_x, scale_y);
                    self.scene.draw_image(&peniko::ImageBrush::from(image), image_transform);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawList;
    use kurbo::{Rect, Size};
    use peniko::Color;

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::new();
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_commands() {
        let canvas = Canvas::new(2, 2, vec![0; 12]).unwrap();
        let mut list = DrawList::new();
        list.push(DrawCommand::Blit { dest: Rect::new(0.0, 0.0, 2.0, 2.0) });
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_rgba8(10, 10, 10, 180));

        let mut renderer = VelloRenderer::new();
        let ctx = RenderContext::new(&canvas, &list, Size::new(2.0, 2.0));
        renderer.build_scene(&ctx);
        assert!(!renderer.scene().encoding().is_empty());
        assert!(renderer.canvas_image.is_some());
    }
}
