//! WebAssembly exports for the transformation engine.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Buffer Convention
//!
//! Images cross the boundary as flat interleaved bytes plus
//! `(width, height, channels)`, where `channels` is 1, 3 or 4. Results use
//! the same layout; bit planes come back with 1 channel and pseudocolor
//! with 3. Invalid parameters become JavaScript exceptions.

use wasm_bindgen::prelude::*;

use crate::buffer::{ChannelMode, PixelBuffer};
use crate::error::Error;
use crate::filters::spatial::{self, SpatialFilter, SpatialOptions};
use crate::filters::{bit_plane, edge, histogram, point, pseudocolor};

fn to_buffer(data: &[u8], width: usize, height: usize, channels: usize) -> Result<PixelBuffer, JsValue> {
    let mode = ChannelMode::from_channels(channels)
        .ok_or_else(|| JsValue::from_str(&format!("unsupported channel count {channels}")))?;
    PixelBuffer::new(width, height, mode, data.to_vec()).map_err(to_js)
}

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ============================================================================
// Point Transforms
// ============================================================================

/// Invert intensities.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1, 3 or 4
///
/// # Returns
/// Flat array of bytes in the input layout
#[wasm_bindgen]
pub fn negative_wasm(data: &[u8], width: usize, height: usize, channels: usize) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    Ok(point::negative(&input).into_bytes())
}

#[wasm_bindgen]
pub fn power_transform_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    gamma: f64,
    c: f64,
) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    point::power_transform(&input, gamma, c)
        .map(PixelBuffer::into_bytes)
        .map_err(to_js)
}

#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn contrast_stretch_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    r1: u8,
    s1: u8,
    r2: u8,
    s2: u8,
) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    point::contrast_stretch(&input, r1, s1, r2, s2)
        .map(PixelBuffer::into_bytes)
        .map_err(to_js)
}

// ============================================================================
// Histogram
// ============================================================================

/// Normalized intensity histogram, 256 entries.
#[wasm_bindgen]
pub fn histogram_wasm(data: &[u8], width: usize, height: usize, channels: usize) -> Result<Vec<f64>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    Ok(histogram::compute_histogram(&input).normalized().to_vec())
}

#[wasm_bindgen]
pub fn equalize_wasm(data: &[u8], width: usize, height: usize, channels: usize) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    Ok(histogram::equalize(&input).image.into_bytes())
}

// ============================================================================
// Bit Planes
// ============================================================================

/// Number of meaningful bit planes in the image.
#[wasm_bindgen]
pub fn bit_depth_wasm(data: &[u8], width: usize, height: usize, channels: usize) -> Result<u32, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    Ok(bit_plane::infer_bit_depth(&input).depth)
}

/// Single-channel binary image of one bit plane.
#[wasm_bindgen]
pub fn extract_bit_plane_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    plane: u32,
) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    bit_plane::extract_plane(&input, plane)
        .map(PixelBuffer::into_bytes)
        .map_err(to_js)
}

// ============================================================================
// Spatial Filters
// ============================================================================

/// Neighborhood filter by name: `mean`, `min`, `max` or `median`.
#[wasm_bindgen]
pub fn spatial_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    filter: &str,
    kernel_size: usize,
) -> Result<Vec<u8>, JsValue> {
    let filter = match filter {
        "mean" => SpatialFilter::Mean,
        "min" => SpatialFilter::Min,
        "max" => SpatialFilter::Max,
        "median" => SpatialFilter::Median,
        other => return Err(JsValue::from_str(&format!("unknown spatial filter '{other}'"))),
    };
    let input = to_buffer(data, width, height, channels)?;
    spatial::apply_filter(&input, filter, kernel_size, SpatialOptions::default())
        .map(PixelBuffer::into_bytes)
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn laplacian_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    include_diagonals: bool,
    apply_adjustment: bool,
    sharpen: bool,
) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    Ok(edge::laplacian(&input, include_diagonals, apply_adjustment, sharpen).into_bytes())
}

// ============================================================================
// Pseudocolor
// ============================================================================

/// Intensity slicing with a named preset. Returns RGB bytes.
#[wasm_bindgen]
pub fn slice_preset_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    name: &str,
) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    pseudocolor::apply_slice_preset(&input, name)
        .map(PixelBuffer::into_bytes)
        .map_err(to_js)
}

/// Channel transform with a named preset. Returns RGB bytes.
#[wasm_bindgen]
pub fn channel_preset_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    name: &str,
) -> Result<Vec<u8>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    pseudocolor::apply_channel_preset(&input, name)
        .map(PixelBuffer::into_bytes)
        .map_err(to_js)
}
