//! Application configuration loaded from the user's config directory.

use peniko::Color;
use serde::{Deserialize, Serialize};
use snapcrop_core::session::SessionOptions;
use snapcrop_core::tools::ToolBindings;
use snapcrop_render::RenderStyle;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "SNAPCROP_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid color {0:?}, expected #rrggbb")]
    Color(String),
    #[error("Invalid {field} {value}, expected a positive number")]
    Zoom { field: &'static str, value: f64 },
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Clear color behind the canvas, `#rrggbb`.
    pub background_color: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom delta per scroll notch.
    pub zoom_step: f64,
    pub bindings: ToolBindings,
    pub style: RenderStyle,
    /// Where the exported PNG is written. `None` uses `<temp>/snapcrop.png`.
    pub output_path: Option<PathBuf>,
    /// Write the exported PNG to `output_path`.
    pub write_file: bool,
    /// Place the exported image on the clipboard.
    pub clipboard: bool,
    /// Keep serving the clipboard until another client takes ownership (Linux).
    pub clipboard_wait: bool,
    /// Load the canvas from this image instead of capturing the screen.
    pub capture_from: Option<PathBuf>,
    pub show_hud: bool,
    /// Keys that toggle the HUD.
    pub hud_keys: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "SnapCrop".to_string(),
            background_color: "#181818".to_string(),
            min_zoom: snapcrop_core::camera::DEFAULT_MIN_ZOOM,
            max_zoom: snapcrop_core::camera::DEFAULT_MAX_ZOOM,
            zoom_step: 1.0,
            bindings: ToolBindings::default(),
            style: RenderStyle::default(),
            output_path: None,
            write_file: true,
            clipboard: true,
            clipboard_wait: true,
            capture_from: None,
            show_hud: true,
            hud_keys: vec!["h".to_string(), "F1".to_string()],
        }
    }
}

impl AppConfig {
    /// Load from `SNAPCROP_CONFIG` or the default location.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file is
    /// reported and also yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::debug!("No config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    /// Config file location.
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("snapcrop").join("config.json"))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.background()?;
        config.check_zoom()?;
        Ok(config)
    }

    /// Zoom bounds and step must be finite and positive.
    fn check_zoom(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("zoom_step", self.zoom_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Zoom { field, value });
            }
        }
        Ok(())
    }

    pub fn background(&self) -> Result<Color, ConfigError> {
        parse_color(&self.background_color)
            .ok_or_else(|| ConfigError::Color(self.background_color.clone()))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            zoom_step: self.zoom_step,
            bindings: self.bindings.clone(),
        }
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        if !self.write_file {
            return None;
        }
        Some(
            self.output_path
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("snapcrop.png")),
        )
    }
}

/// Parse a `#rrggbb` color.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') && s.len() == 7 {
        let r = u8::from_str_radix(&s[1..3], 16).ok()?;
        let g = u8::from_str_radix(&s[3..5], 16).ok()?;
        let b = u8::from_str_radix(&s[5..7], 16).ok()?;
        Some(Color::from_rgba8(r, g, b, 255))
    } else {
        None
    }
}
