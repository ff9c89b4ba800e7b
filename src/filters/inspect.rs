//! Read-only views for pixel inspection.

use serde::Serialize;

use crate::buffer::{ChannelMode, PixelBuffer};
use crate::error::{Error, Result};

/// Square window of raw samples around a selected pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    /// Top-left corner `(x, y)` of the window in image coordinates.
    pub origin: (usize, usize),
    /// The selected pixel `(x, y)`.
    pub center: (usize, usize),
    pub pixels: PixelBuffer,
}

impl Neighborhood {
    /// Position of the selected pixel inside [`Neighborhood::pixels`].
    pub fn center_offset(&self) -> (usize, usize) {
        (self.center.0 - self.origin.0, self.center.1 - self.origin.1)
    }
}

/// Copy the `size x size` window around `(x, y)`.
///
/// Near the edges the window is shifted, not clipped, so it stays `size`
/// wide whenever the image is; the selected pixel is then off-center.
/// Images smaller than `size` yield the whole image along that axis.
///
/// # Errors
/// [`Error::InvalidParameter`] when `size` is even or zero, or `(x, y)` is
/// outside the image.
pub fn neighborhood(input: &PixelBuffer, x: usize, y: usize, size: usize) -> Result<Neighborhood> {
    if size == 0 || size % 2 == 0 {
        return Err(Error::invalid(format!("neighborhood size must be odd and >= 1, got {size}")));
    }
    if x >= input.width() || y >= input.height() {
        return Err(Error::invalid(format!(
            "pixel ({x}, {y}) outside {}x{} image",
            input.width(),
            input.height()
        )));
    }

    let x0 = window_start(x, size, input.width());
    let y0 = window_start(y, size, input.height());

    Ok(Neighborhood {
        origin: (x0, y0),
        center: (x, y),
        pixels: input.crop(x0, y0, size, size),
    })
}

fn window_start(pos: usize, size: usize, extent: usize) -> usize {
    let start = pos.saturating_sub(size / 2);
    let end = (start + size).min(extent);
    if end - start < size {
        end.saturating_sub(size)
    } else {
        start
    }
}

/// Summary of a buffer's geometry and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: usize,
    pub height: usize,
    pub pixel_count: usize,
    pub mode: ChannelMode,
    pub channels: usize,
    pub bits_per_pixel: usize,
    pub has_alpha: bool,
}

impl ImageInfo {
    pub fn of(input: &PixelBuffer) -> Self {
        let mode = input.mode();
        ImageInfo {
            width: input.width(),
            height: input.height(),
            pixel_count: input.pixel_count(),
            mode,
            channels: mode.channels(),
            bits_per_pixel: mode.channels() * 8,
            has_alpha: mode.has_alpha(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: usize, height: usize) -> PixelBuffer {
        let bytes = (0..width * height).map(|i| i as u8).collect();
        PixelBuffer::new(width, height, ChannelMode::Gray8, bytes).unwrap()
    }

    #[test]
    fn test_centered_window() {
        let n = neighborhood(&grid(10, 10), 5, 5, 3).unwrap();
        assert_eq!(n.origin, (4, 4));
        assert_eq!(n.center_offset(), (1, 1));
        assert_eq!(n.pixels.to_bytes(), vec![44, 45, 46, 54, 55, 56, 64, 65, 66]);
    }

    #[test]
    fn test_window_shifts_at_edges() {
        let img = grid(10, 10);
        let n = neighborhood(&img, 0, 9, 5).unwrap();
        assert_eq!(n.origin, (0, 5));
        assert_eq!(n.pixels.width(), 5);
        assert_eq!(n.pixels.height(), 5);
        assert_eq!(n.center_offset(), (0, 4));
    }

    #[test]
    fn test_window_larger_than_image() {
        let n = neighborhood(&grid(3, 2), 1, 1, 5).unwrap();
        assert_eq!(n.origin, (0, 0));
        assert_eq!((n.pixels.width(), n.pixels.height()), (3, 2));
    }

    #[test]
    fn test_neighborhood_validation() {
        let img = grid(4, 4);
        assert!(neighborhood(&img, 1, 1, 4).is_err());
        assert!(neighborhood(&img, 4, 0, 3).is_err());
    }

    #[test]
    fn test_image_info() {
        let img = PixelBuffer::zeros(6, 4, ChannelMode::Rgba8);
        let info = ImageInfo::of(&img);
        assert_eq!(info.pixel_count, 24);
        assert_eq!(info.bits_per_pixel, 32);
        assert!(info.has_alpha);
        assert_eq!(ImageInfo::of(&grid(2, 2)).bits_per_pixel, 8);
    }
}
