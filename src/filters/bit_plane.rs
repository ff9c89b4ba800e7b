//! Bit-plane slicing.
//!
//! Planes are taken from the single-channel intensity of the input. The
//! number of meaningful planes follows the image's actual dynamic range
//! instead of being fixed at 8.

use ndarray::Array3;

use crate::buffer::{ChannelMode, PixelBuffer};
use crate::error::{Error, Result};

/// Planes at or above this index are never meaningful for 8-bit data and
/// yield an all-zero image.
pub const MAX_PLANE: u32 = 30;

/// Bit depth inferred from the brightest intensity sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitDepth {
    /// Number of extractable planes, at least 1.
    pub depth: u32,
    pub max_intensity: u8,
}

/// `depth = max(1, ceil(log2(M + 1)))` where M is the maximum intensity.
///
/// An all-black image is a legitimate input and reports depth 1.
pub fn infer_bit_depth(input: &PixelBuffer) -> BitDepth {
    let gray = input.to_intensity();
    let max_intensity = gray.as_array().iter().copied().max().unwrap_or(0);
    BitDepth {
        depth: bits_for(max_intensity),
        max_intensity,
    }
}

#[inline]
fn bits_for(value: u8) -> u32 {
    (u8::BITS - value.leading_zeros()).max(1)
}

/// Weight of a plane in the reconstructed intensity: `2^plane`.
///
/// `None` when the weight does not fit in `u32`.
pub fn plane_weight(plane: u32) -> Option<u32> {
    1u32.checked_shl(plane)
}

/// Binary image of one bit plane: 255 where the bit is set, 0 elsewhere.
///
/// Output is Gray8 with the input's dimensions.
///
/// # Errors
/// [`Error::InvalidParameter`] when `plane` is outside `[0, depth - 1]`.
/// Planes at or above [`MAX_PLANE`] return an all-zero image instead.
pub fn extract_plane(input: &PixelBuffer, plane: u32) -> Result<PixelBuffer> {
    if plane >= MAX_PLANE {
        tracing::warn!(plane, "bit plane index out of any meaningful range, returning zeros");
        return Ok(PixelBuffer::zeros(input.width(), input.height(), ChannelMode::Gray8));
    }

    let gray = input.to_intensity();
    let max_intensity = gray.as_array().iter().copied().max().unwrap_or(0);
    let depth = bits_for(max_intensity);
    if plane >= depth {
        return Err(Error::invalid(format!(
            "bit plane {plane} out of range, image has {depth} planes"
        )));
    }

    tracing::debug!(width = input.width(), height = input.height(), plane, depth, "extract bit plane");

    let mask = 1u8 << plane;
    let data = gray
        .as_array()
        .mapv(|v| if v & mask != 0 { 255 } else { 0 });
    Ok(PixelBuffer::from_parts(ChannelMode::Gray8, data))
}

/// Rebuild an intensity image keeping only the listed planes.
///
/// Each sample becomes the sum of `2^p` over the selected planes whose bit
/// is set. Duplicate planes are counted once.
///
/// # Errors
/// [`Error::InvalidParameter`] for planes outside `[0, 7]`.
pub fn reconstruct_from_planes(input: &PixelBuffer, planes: &[u32]) -> Result<PixelBuffer> {
    let mut mask = 0u8;
    for &plane in planes {
        if plane >= u8::BITS {
            return Err(Error::invalid(format!("bit plane {plane} out of range 0-7")));
        }
        mask |= 1 << plane;
    }

    tracing::debug!(width = input.width(), height = input.height(), mask, "reconstruct from bit planes");

    let gray = input.to_intensity();
    let data: Array3<u8> = gray.as_array().mapv(|v| v & mask);
    Ok(PixelBuffer::from_parts(ChannelMode::Gray8, data))
}
