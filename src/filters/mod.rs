//! Pixel transformation engine.
//!
//! ## Supported Formats
//!
//! Every operation accepts a [`PixelBuffer`](crate::buffer::PixelBuffer) with
//! 1, 3, or 4 channels:
//!
//! | Mode | Shape | Description |
//! |------|-------|-------------|
//! | Gray8 | (H, W, 1) | Single intensity channel, 0-255 |
//! | Rgb8 | (H, W, 3) | Red, green, blue, 0-255 |
//! | Rgba8 | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! ## Architecture
//!
//! All operations follow these principles:
//! - **Value semantics** - input is borrowed, a new buffer is returned
//! - **Alpha preservation** - alpha is copied through untouched
//! - **Validate first** - parameter errors are reported before any work is done
//! - **Row parallel** - large images are processed row by row on the rayon pool
//!
//! ## Operation Categories
//!
//! - **Point**: negative, zero intensity, power (gamma), contrast stretch
//! - **Histogram**: counts, normalized histogram, CDF, equalization
//! - **Bit planes**: adaptive depth, plane extraction, reconstruction
//! - **Spatial**: mean, min, max, median (odd square kernels)
//! - **Edge**: Laplacian with raw, adjusted and sharpened output
//! - **Pseudocolor**: intensity slicing, per-channel transfer functions
//! - **Inspect**: pixel neighborhoods and image summaries

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayViewMut2, Axis};

pub mod lut;
pub mod point;
pub mod histogram;
pub mod bit_plane;
pub mod spatial;
pub mod edge;
pub mod pseudocolor;
pub mod inspect;

/// Images with at least this many pixels are processed in parallel.
pub const PARALLEL_THRESHOLD: usize = 64 * 64;

/// Run `f` once per output row, in parallel when the image is large enough.
///
/// `f` receives the row index and a `(width, channels)` view of that row.
/// Rows are independent, so the result does not depend on scheduling.
pub(crate) fn fill_rows<F>(output: &mut Array3<u8>, threshold: usize, f: F)
where
    F: Fn(usize, ArrayViewMut2<u8>) + Send + Sync,
{
    let (height, width, _) = output.dim();

    if height * width >= threshold {
        output
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    } else {
        for (y, row) in output.axis_iter_mut(Axis(0)).enumerate() {
            f(y, row);
        }
    }
}
