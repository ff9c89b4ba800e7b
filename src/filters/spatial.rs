//! Neighborhood filters: Mean, Min, Max, Median.
//!
//! Each output sample is a statistic of the `k x k` window centred on it,
//! computed per color channel. Alpha is copied through.
//!
//! ## Borders
//!
//! With [`BorderPolicy::Retain`] (the default) only pixels whose full window
//! lies inside the image are recomputed; the outer `k / 2` rows and columns
//! keep their original samples. [`BorderPolicy::Replicate`] instead clamps
//! window coordinates to the nearest edge pixel so every pixel is filtered.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

use super::{fill_rows, PARALLEL_THRESHOLD};

/// Odd square neighborhood size whose area fits in `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kernel(usize);

impl Kernel {
    /// # Errors
    /// [`Error::InvalidParameter`] when `size` is even or zero, or when
    /// `size * size` overflows.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(Error::invalid(format!("kernel size must be odd and >= 1, got {size}")));
        }
        if size.checked_mul(size).is_none() {
            return Err(Error::invalid(format!("kernel size {size} is too large")));
        }
        Ok(Kernel(size))
    }

    pub fn size(self) -> usize {
        self.0
    }

    pub fn radius(self) -> usize {
        self.0 / 2
    }

    pub fn area(self) -> usize {
        self.0 * self.0
    }
}

/// What happens to pixels whose window would leave the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// Keep the original sample.
    #[default]
    Retain,
    /// Clamp window coordinates to the image edge.
    Replicate,
}

/// Options shared by the neighborhood filters and the Laplacian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialOptions {
    pub border: BorderPolicy,
    /// Images with at least this many pixels are filtered in parallel.
    pub parallel_threshold: usize,
}

impl Default for SpatialOptions {
    fn default() -> Self {
        SpatialOptions {
            border: BorderPolicy::Retain,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

/// Statistic computed over each neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialFilter {
    Mean,
    Min,
    Max,
    Median,
}

impl SpatialFilter {
    pub fn name(self) -> &'static str {
        match self {
            SpatialFilter::Mean => "mean",
            SpatialFilter::Min => "min",
            SpatialFilter::Max => "max",
            SpatialFilter::Median => "median",
        }
    }

    /// Reduce a window. `window` is never empty and may be reordered.
    fn reduce(self, window: &mut [u8]) -> u8 {
        match self {
            SpatialFilter::Mean => {
                let sum: u64 = window.iter().map(|&v| v as u64).sum();
                (sum / window.len() as u64).min(255) as u8
            }
            SpatialFilter::Min => window.iter().copied().min().unwrap_or(0),
            SpatialFilter::Max => window.iter().copied().max().unwrap_or(0),
            SpatialFilter::Median => {
                let mid = window.len() / 2;
                *window.select_nth_unstable(mid).1
            }
        }
    }
}

/// Arithmetic mean (truncated) of each `kernel_size x kernel_size` window.
pub fn mean_filter(input: &PixelBuffer, kernel_size: usize) -> Result<PixelBuffer> {
    apply_filter(input, SpatialFilter::Mean, kernel_size, SpatialOptions::default())
}

/// Minimum of each window.
pub fn min_filter(input: &PixelBuffer, kernel_size: usize) -> Result<PixelBuffer> {
    apply_filter(input, SpatialFilter::Min, kernel_size, SpatialOptions::default())
}

/// Maximum of each window.
pub fn max_filter(input: &PixelBuffer, kernel_size: usize) -> Result<PixelBuffer> {
    apply_filter(input, SpatialFilter::Max, kernel_size, SpatialOptions::default())
}

/// Median of each window. Removes salt-and-pepper noise while keeping edges.
pub fn median_filter(input: &PixelBuffer, kernel_size: usize) -> Result<PixelBuffer> {
    apply_filter(input, SpatialFilter::Median, kernel_size, SpatialOptions::default())
}

/// Apply a neighborhood filter with explicit options.
///
/// # Errors
/// [`Error::InvalidParameter`] when `kernel_size` is even, zero, or too large
/// for its square to fit in `usize`.
pub fn apply_filter(
    input: &PixelBuffer,
    filter: SpatialFilter,
    kernel_size: usize,
    options: SpatialOptions,
) -> Result<PixelBuffer> {
    let kernel = Kernel::new(kernel_size)?;

    tracing::debug!(
        filter = filter.name(),
        width = input.width(),
        height = input.height(),
        kernel_size,
        border = ?options.border,
        "spatial filter"
    );

    let src = input.view();
    let (height, width, _) = src.dim();
    let color_channels = input.mode().color_channels();
    let r = kernel.radius();
    let mut output = input.as_array().clone();

    fill_rows(&mut output, options.parallel_threshold, |y, mut row| {
        let row_interior = y >= r && y + r < height;
        if options.border == BorderPolicy::Retain && !row_interior {
            return;
        }

        let mut window = Vec::with_capacity(kernel.area());

        for x in 0..width {
            let interior = row_interior && x >= r && x + r < width;
            if options.border == BorderPolicy::Retain && !interior {
                continue;
            }

            for c in 0..color_channels {
                window.clear();
                if interior {
                    for sy in y - r..=y + r {
                        for sx in x - r..=x + r {
                            window.push(src[[sy, sx, c]]);
                        }
                    }
                } else {
                    for dy in 0..kernel.size() {
                        let sy = (y as isize + dy as isize - r as isize)
                            .clamp(0, height as isize - 1) as usize;
                        for dx in 0..kernel.size() {
                            let sx = (x as isize + dx as isize - r as isize)
                                .clamp(0, width as isize - 1) as usize;
                            window.push(src[[sy, sx, c]]);
                        }
                    }
                }
                row[[x, c]] = filter.reduce(&mut window);
            }
        }
    });

    Ok(PixelBuffer::from_parts(input.mode(), output))
}
