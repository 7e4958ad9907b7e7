//! Screen capture: produces the canvas the session annotates.

use snapcrop_core::canvas::{Canvas, CanvasError};
use std::path::PathBuf;
use std::thread::JoinHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),
    #[error("No monitor found")]
    NoMonitor,
    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),
    #[error("Failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("Capture thread panicked")]
    Panicked,
}

/// Something that can produce one screen image.
pub trait ScreenSource: Send + 'static {
    fn capture(&self) -> Result<Canvas, CaptureError>;

    fn describe(&self) -> String;
}

/// The primary monitor, falling back to the first one.
#[cfg(feature = "native")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MonitorSource;

#[cfg(feature = "native")]
impl ScreenSource for MonitorSource {
    fn capture(&self) -> Result<Canvas, CaptureError> {
        let monitors =
            xcap::Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;
        let index = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors.get(index).ok_or(CaptureError::NoMonitor)?;

        let image = monitor
            .capture_image()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
        Ok(Canvas::from_rgba(image.width(), image.height(), image.as_raw())?)
    }

    fn describe(&self) -> String {
        "primary monitor".to_string()
    }
}

/// An image file standing in for the screen.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScreenSource for FileSource {
    fn capture(&self) -> Result<Canvas, CaptureError> {
        let image = image::open(&self.path)
            .map_err(|source| CaptureError::Load {
                path: self.path.clone(),
                source,
            })?
            .to_rgb8();
        let (width, height) = image.dimensions();
        Ok(Canvas::new(width, height, image.into_raw())?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A capture running on a background thread.
pub struct CaptureTask {
    handle: JoinHandle<Result<Canvas, CaptureError>>,
}

impl CaptureTask {
    /// Block until the capture finishes.
    pub fn join(self) -> Result<Canvas, CaptureError> {
        self.handle.join().map_err(|_| CaptureError::Panicked)?
    }
}

/// Start a one-shot capture in the background.
pub fn spawn_capture<S: ScreenSource>(source: S) -> Result<CaptureTask, CaptureError> {
    let handle = std::thread::Builder::new()
        .name("capture".to_string())
        .spawn(move || {
            log::info!("Capturing {}", source.describe());
            let canvas = source.capture();
            match &canvas {
                Ok(c) => log::info!("Captured {}x{}", c.width(), c.height()),
                Err(e) => log::error!("Capture failed: {}", e),
            }
            canvas
        })
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
    Ok(CaptureTask { handle })
}

/// Capture source selected by configuration.
pub fn spawn_configured(capture_from: Option<PathBuf>) -> Result<CaptureTask, CaptureError> {
    match capture_from {
        Some(path) => spawn_capture(FileSource::new(path)),
        #[cfg(feature = "native")]
        None => spawn_capture(MonitorSource),
        #[cfg(not(feature = "native"))]
        None => Err(CaptureError::NoMonitor),
    }
}
