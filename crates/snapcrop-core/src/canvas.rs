//! The captured screen image.

use kurbo::Size;
use thiserror::Error;

/// Errors raised when building a canvas from raw capture data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanvasError {
    #[error("Canvas dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Immutable RGB8 pixel buffer with a top-left origin.
///
/// Built once from the capture collaborator and only read afterwards.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl Canvas {
    /// Wrap a tightly packed RGB8 buffer.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(CanvasError::BufferSize {
                expected,
                actual: rgb.len(),
            });
        }
        Ok(Self { width, height, rgb })
    }

    /// Build from an RGBA8 buffer, dropping alpha.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, CanvasError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CanvasError::BufferSize {
                expected,
                actual: rgba.len(),
            });
        }
        let rgb = rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Self::new(width, height, rgb)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canvas extent as a kurbo size.
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Raw RGB8 bytes, row-major from the top-left.
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgb
    }

    /// Get one row of RGB8 pixels. Rows past the bottom are clamped to the last row.
    pub fn row(&self, y: u32) -> &[u8] {
        let y = y.min(self.height - 1) as usize;
        let stride = self.width as usize * 3;
        &self.rgb[y * stride..(y + 1) * stride]
    }

    /// Get a single pixel. Coordinates past the edge are clamped.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width - 1) as usize * 3;
        let row = self.row(y);
        [row[x], row[x + 1], row[x + 2]]
    }

    /// Expand to opaque RGBA8 for texture upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.rgb
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Canvas {
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                rgb.extend_from_slice(&[x as u8, y as u8, 7]);
            }
        }
        Canvas::new(width, height, rgb).unwrap()
    }

    #[test]
    fn test_rejects_zero_size() {
        assert_eq!(
            Canvas::new(0, 10, Vec::new()).unwrap_err(),
            CanvasError::ZeroDimension { width: 0, height: 10 }
        );
    }

    #[test]
    fn test_rejects_wrong_buffer_length() {
        let err = Canvas::new(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(err, CanvasError::BufferSize { expected: 12, actual: 11 });
    }

    #[test]
    fn test_pixel_lookup() {
        let canvas = gradient(4, 3);
        assert_eq!(canvas.pixel(2, 1), [2, 1, 7]);
        assert_eq!(canvas.pixel(9, 9), [3, 2, 7]);
        assert_eq!(canvas.row(1).len(), 12);
    }

    #[test]
    fn test_from_rgba_drops_alpha() {
        let canvas = Canvas::from_rgba(1, 2, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(canvas.as_bytes(), &[1, 2, 3, 5, 6, 7]);
        assert_eq!(canvas.to_rgba8(), vec![1, 2, 3, 255, 5, 6, 7, 255]);
    }
}
