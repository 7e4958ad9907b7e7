//! SnapCrop Render Library
//!
//! Draw-command abstraction shared by the live preview and the exporter,
//! the CPU compositor that produces the final image, and the Vello presenter
//! used for the on-screen preview.

mod compositor;
mod raster;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use compositor::{CompositeError, Compositor, RasterImage, RowOrder};
pub use raster::PixmapPainter;
pub use renderer::{
    DrawCommand, DrawList, RenderContext, RenderStyle, Renderer, RendererError,
    annotation_commands, preview_commands,
};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
