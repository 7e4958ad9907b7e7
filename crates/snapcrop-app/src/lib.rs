//! SnapCrop Application
//!
//! The application shell: configuration, screen capture, the interactive
//! window and publishing of the exported image.

#[cfg(feature = "native")]
mod app;
pub mod capture;
pub mod config;
pub mod export;
mod hud;
mod shortcuts;

#[cfg(feature = "native")]
pub use app::{App, AppError};
pub use capture::{CaptureError, CaptureTask, FileSource, ScreenSource, spawn_capture, spawn_configured};
#[cfg(feature = "native")]
pub use capture::MonitorSource;
pub use config::{AppConfig, ConfigError, parse_color};
pub use export::{ExportError, ExportTarget, ExportTask, PublishReport, encode_png, publish, spawn_export};
pub use hud::{HudState, render_hud, status_lines};
pub use shortcuts::{Shortcut, ShortcutRegistry};
