//! Laplacian edge detection and sharpening.
//!
//! Second-derivative operator on a 3x3 window, applied to each color channel
//! independently.
//!
//! ## Kernels
//!
//! ```text
//! FourNeighbor        EightNeighbor
//! [ 0,  1,  0]        [ 1,  1,  1]
//! [ 1, -4,  1]        [ 1, -8,  1]
//! [ 0,  1,  0]        [ 1,  1,  1]
//! ```
//!
//! ## Supported Formats
//!
//! - **Gray8**: filters the single channel
//! - **Rgb8**: filters R, G, B independently
//! - **Rgba8**: filters RGB, preserves alpha

use crate::buffer::PixelBuffer;

use super::fill_rows;
use super::spatial::{BorderPolicy, SpatialOptions};

/// Laplacian neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaplacianKernel {
    /// 4-connected, no diagonal terms.
    FourNeighbor,
    /// 8-connected, includes diagonals.
    EightNeighbor,
}

impl LaplacianKernel {
    pub fn from_diagonals(include_diagonals: bool) -> Self {
        if include_diagonals {
            LaplacianKernel::EightNeighbor
        } else {
            LaplacianKernel::FourNeighbor
        }
    }

    pub fn weights(self) -> [[i32; 3]; 3] {
        match self {
            LaplacianKernel::FourNeighbor => [[0, 1, 0], [1, -4, 1], [0, 1, 0]],
            LaplacianKernel::EightNeighbor => [[1, 1, 1], [1, -8, 1], [1, 1, 1]],
        }
    }
}

/// How the raw response is turned into output samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaplacianMode {
    /// Response clamped to 0-255; negative responses become 0.
    Raw,
    /// Response + 128, centred on mid-gray.
    Adjusted,
    /// `original - 0.5 * response`.
    Sharpen,
}

impl LaplacianMode {
    /// Sharpening wins when both flags are set.
    pub fn from_flags(apply_adjustment: bool, sharpen: bool) -> Self {
        if sharpen {
            LaplacianMode::Sharpen
        } else if apply_adjustment {
            LaplacianMode::Adjusted
        } else {
            LaplacianMode::Raw
        }
    }

    #[inline]
    fn output(self, original: u8, response: i32) -> u8 {
        match self {
            LaplacianMode::Raw => response.clamp(0, 255) as u8,
            LaplacianMode::Adjusted => (response + 128).clamp(0, 255) as u8,
            // truncates toward zero after clamping, like a float-to-u8 cast
            LaplacianMode::Sharpen => ((2 * original as i32 - response).clamp(0, 510) / 2) as u8,
        }
    }
}

/// Laplacian filter with border-retain semantics.
///
/// # Arguments
/// * `include_diagonals` - Use the 8-neighbor kernel instead of 4-neighbor
/// * `apply_adjustment` - Shift the response by +128 for display
/// * `sharpen` - Return `original - 0.5 * response`; takes precedence
///
/// # Returns
/// Buffer of the same shape and mode. Pixels on the outermost rows and
/// columns keep their original samples.
pub fn laplacian(
    input: &PixelBuffer,
    include_diagonals: bool,
    apply_adjustment: bool,
    sharpen: bool,
) -> PixelBuffer {
    laplacian_with(
        input,
        LaplacianKernel::from_diagonals(include_diagonals),
        LaplacianMode::from_flags(apply_adjustment, sharpen),
        SpatialOptions::default(),
    )
}

pub fn laplacian_with(
    input: &PixelBuffer,
    kernel: LaplacianKernel,
    mode: LaplacianMode,
    options: SpatialOptions,
) -> PixelBuffer {
    tracing::debug!(
        width = input.width(),
        height = input.height(),
        kernel = ?kernel,
        mode = ?mode,
        border = ?options.border,
        "laplacian"
    );

    let src = input.view();
    let (height, width, _) = src.dim();
    let color_channels = input.mode().color_channels();
    let weights = kernel.weights();
    let mut output = input.as_array().clone();

    if width == 0 || height == 0 {
        return PixelBuffer::from_parts(input.mode(), output);
    }

    fill_rows(&mut output, options.parallel_threshold, |y, mut row| {
        let row_interior = y >= 1 && y + 1 < height;
        if options.border == BorderPolicy::Retain && !row_interior {
            return;
        }

        for x in 0..width {
            let interior = row_interior && x >= 1 && x + 1 < width;
            if options.border == BorderPolicy::Retain && !interior {
                continue;
            }

            for c in 0..color_channels {
                let mut sum = 0i32;
                for (ky, kernel_row) in weights.iter().enumerate() {
                    let sy = (y + ky).saturating_sub(1).min(height - 1);
                    for (kx, &w) in kernel_row.iter().enumerate() {
                        if w == 0 {
                            continue;
                        }
                        let sx = (x + kx).saturating_sub(1).min(width - 1);
                        sum += w * src[[sy, sx, c]] as i32;
                    }
                }
                row[[x, c]] = mode.output(src[[y, x, c]], sum);
            }
        }
    });

    PixelBuffer::from_parts(input.mode(), output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ChannelMode;

    fn gray(width: usize, height: usize, bytes: Vec<u8>) -> PixelBuffer {
        PixelBuffer::new(width, height, ChannelMode::Gray8, bytes).unwrap()
    }

    /// 3x3 image with a single dark center pixel.
    fn dark_center() -> PixelBuffer {
        gray(3, 3, vec![100, 100, 100, 100, 60, 100, 100, 100, 100])
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(LaplacianMode::from_flags(false, false), LaplacianMode::Raw);
        assert_eq!(LaplacianMode::from_flags(true, false), LaplacianMode::Adjusted);
        assert_eq!(LaplacianMode::from_flags(true, true), LaplacianMode::Sharpen);
    }

    #[test]
    fn test_uniform_image_raw_is_zero_inside() {
        let img = gray(4, 4, vec![80; 16]);
        let out = laplacian(&img, true, false, false);
        assert_eq!(out.sample(1, 1, 0), 0);
        assert_eq!(out.sample(2, 2, 0), 0);
        // borders retained
        assert_eq!(out.sample(0, 0, 0), 80);
    }

    #[test]
    fn test_raw_response() {
        // 8 * 100 - 8 * 60 = 320 -> 255; 4-neighbor: 400 - 240 = 160
        assert_eq!(laplacian(&dark_center(), true, false, false).sample(1, 1, 0), 255);
        assert_eq!(laplacian(&dark_center(), false, false, false).sample(1, 1, 0), 160);
    }

    #[test]
    fn test_raw_negative_truncates_to_zero() {
        let img = gray(3, 3, vec![10, 10, 10, 10, 200, 10, 10, 10, 10]);
        assert_eq!(laplacian(&img, false, false, false).sample(1, 1, 0), 0);
    }

    #[test]
    fn test_adjusted_centres_on_gray() {
        let img = gray(3, 3, vec![50; 9]);
        assert_eq!(laplacian(&img, false, true, false).sample(1, 1, 0), 128);
        // 4-neighbor response 160 + 128 clamps
        assert_eq!(laplacian(&dark_center(), false, true, false).sample(1, 1, 0), 255);
    }

    #[test]
    fn test_sharpen_darkens_dark_detail() {
        // 60 - 0.5 * 160 = -20 -> 0
        let out = laplacian(&dark_center(), false, false, true);
        assert_eq!(out.sample(1, 1, 0), 0);

        // 200 - 0.5 * (40 - 800) = 580 -> 255; a bright dot gets brighter
        let img = gray(3, 3, vec![10, 10, 10, 10, 200, 10, 10, 10, 10]);
        let out = laplacian(&img, false, false, true);
        assert_eq!(out.sample(1, 1, 0), 255);
    }

    #[test]
    fn test_sharpen_truncates_half() {
        // response = 101 - 100 = 1 along one neighbor; 100 - 0.5 = 99.5 -> 99
        let img = gray(3, 3, vec![100, 101, 100, 100, 100, 100, 100, 100, 100]);
        let out = laplacian(&img, false, false, true);
        assert_eq!(out.sample(1, 1, 0), 99);
    }

    #[test]
    fn test_sharpen_wins_over_adjustment() {
        let img = dark_center();
        assert_eq!(laplacian(&img, true, true, true), laplacian(&img, true, false, true));
    }

    #[test]
    fn test_rgba_alpha_preserved() {
        let mut bytes = Vec::new();
        for i in 0..9u8 {
            bytes.extend_from_slice(&[i * 20, 100, 255 - i * 20, 42 + i]);
        }
        let img = PixelBuffer::new(3, 3, ChannelMode::Rgba8, bytes).unwrap();
        let out = laplacian(&img, true, true, false);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(out.sample(x, y, 3), img.sample(x, y, 3));
            }
        }
        // green is flat, adjusted response is exactly 128
        assert_eq!(out.sample(1, 1, 1), 128);
    }

    #[test]
    fn test_tiny_images_unchanged() {
        let img = gray(2, 2, vec![0, 255, 255, 0]);
        assert_eq!(laplacian(&img, true, false, false), img);
        let empty = PixelBuffer::zeros(0, 0, ChannelMode::Rgb8);
        assert_eq!(laplacian(&empty, true, false, false), empty);
    }

    #[test]
    fn test_replicate_touches_borders() {
        let img = dark_center();
        let options = SpatialOptions {
            border: BorderPolicy::Replicate,
            ..SpatialOptions::default()
        };
        let out = laplacian_with(&img, LaplacianKernel::FourNeighbor, LaplacianMode::Raw, options);
        // corner (0,0): 100 + 100 + 100 + 100 - 400 = 0, edge (1,0): 100 + 100 + 100 + 60 - 400 < 0
        assert_eq!(out.sample(0, 0, 0), 0);
        assert_eq!(out.sample(1, 0, 0), 0);
        assert_eq!(out.sample(1, 1, 0), 160);
    }
}
