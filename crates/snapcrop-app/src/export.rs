//! Publishing the exported image: PNG file and clipboard.

use snapcrop_render::RasterImage;
use std::path::PathBuf;
use std::thread::JoinHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Export thread failed: {0}")]
    Thread(String),
}

/// Where an exported image goes.
#[derive(Debug, Clone, Default)]
pub struct ExportTarget {
    pub output_path: Option<PathBuf>,
    pub clipboard: bool,
    /// On Linux, block until another client owns the clipboard contents.
    pub clipboard_wait: bool,
}

/// What a successful publish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub width: u32,
    pub height: u32,
    pub path: Option<PathBuf>,
    pub png_bytes: usize,
    pub clipboard: bool,
}

/// Encode RGBA pixels as PNG.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, ExportError> {
    let upright = image.to_top_down();
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, upright.width, upright.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&upright.rgba)?;
    }
    Ok(png_data)
}

/// Write and copy the image according to `target`.
pub fn publish(image: &RasterImage, target: &ExportTarget) -> Result<PublishReport, ExportError> {
    let mut report = PublishReport {
        width: image.width,
        height: image.height,
        path: None,
        png_bytes: 0,
        clipboard: false,
    };

    if let Some(path) = &target.output_path {
        let png_data = encode_png(image)?;
        std::fs::write(path, &png_data).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("Saved {}x{} PNG to {}", image.width, image.height, path.display());
        report.path = Some(path.clone());
        report.png_bytes = png_data.len();
    }

    if target.clipboard {
        copy_to_clipboard(image, target.clipboard_wait)?;
        report.clipboard = true;
    }

    Ok(report)
}

#[cfg(feature = "native")]
fn copy_to_clipboard(image: &RasterImage, wait: bool) -> Result<(), ExportError> {
    let upright = image.to_top_down();
    // arboard expects straight RGBA pixel data
    let image_data = arboard::ImageData {
        width: upright.width as usize,
        height: upright.height as usize,
        bytes: std::borrow::Cow::Owned(upright.rgba),
    };

    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;

    #[cfg(target_os = "linux")]
    let result = if wait {
        use arboard::SetExtLinux;
        log::info!("Serving clipboard until another client takes it");
        clipboard.set().wait().image(image_data)
    } else {
        clipboard.set_image(image_data)
    };
    #[cfg(not(target_os = "linux"))]
    let result = {
        let _ = wait;
        clipboard.set_image(image_data)
    };

    result.map_err(|e| ExportError::Clipboard(e.to_string()))?;
    log::info!("Image copied to clipboard ({}x{})", image.width, image.height);
    Ok(())
}

#[cfg(not(feature = "native"))]
fn copy_to_clipboard(_image: &RasterImage, _wait: bool) -> Result<(), ExportError> {
    Err(ExportError::Clipboard("clipboard support not built".to_string()))
}

/// A publish running on a background thread.
pub struct ExportTask {
    handle: JoinHandle<Result<PublishReport, ExportError>>,
}

impl ExportTask {
    pub fn join(self) -> Result<PublishReport, ExportError> {
        self.handle
            .join()
            .map_err(|_| ExportError::Thread("panicked".to_string()))?
    }
}

/// Publish in the background so the caller can tear down the window.
pub fn spawn_export(image: RasterImage, target: ExportTarget) -> Result<ExportTask, ExportError> {
    let handle = std::thread::Builder::new()
        .name("export".to_string())
        .spawn(move || publish(&image, &target))
        .map_err(|e| ExportError::Thread(e.to_string()))?;
    Ok(ExportTask { handle })
}
