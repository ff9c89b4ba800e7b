//! In-memory raster shared by every operation in the crate.
//!
//! A [`PixelBuffer`] is an 8-bit image with 1, 3, or 4 interleaved channels
//! stored as an `(height, width, channels)` array in row-major order, the same
//! shape convention the filters have always used. Buffers are plain values:
//! every transform reads one and returns a fresh one, so an earlier snapshot is
//! never touched by a later edit.

use ndarray::{s, Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Channel layout of a [`PixelBuffer`]. Fixed for the lifetime of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelMode {
    Gray8,
    Rgb8,
    Rgba8,
}

impl ChannelMode {
    /// Number of interleaved samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            ChannelMode::Gray8 => 1,
            ChannelMode::Rgb8 => 3,
            ChannelMode::Rgba8 => 4,
        }
    }

    /// Channels that carry intensity; alpha is excluded.
    pub fn color_channels(self) -> usize {
        match self {
            ChannelMode::Rgba8 => 3,
            other => other.channels(),
        }
    }

    pub fn has_alpha(self) -> bool {
        self == ChannelMode::Rgba8
    }

    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(ChannelMode::Gray8),
            3 => Some(ChannelMode::Rgb8),
            4 => Some(ChannelMode::Rgba8),
            _ => None,
        }
    }
}

/// Weights used to reduce RGB samples to a single intensity.
///
/// Weights are stored as 16-bit fixed point so the reduction is exact and
/// reproducible across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumaWeights {
    r: u32,
    g: u32,
    b: u32,
}

impl LumaWeights {
    /// ITU-R BT.601, the classic "RGB to L" conversion.
    pub const REC601: LumaWeights = LumaWeights {
        r: 19595,
        g: 38470,
        b: 7471,
    };

    /// ITU-R BT.709 luminosity.
    pub const BT709: LumaWeights = LumaWeights {
        r: 13933,
        g: 46871,
        b: 4732,
    };

    /// Custom weights, normalized so they sum to one.
    pub fn custom(r: f32, g: f32, b: f32) -> Self {
        let (r, g, b) = (r.max(0.0), g.max(0.0), b.max(0.0));
        let sum = r + g + b;
        if sum <= 0.0 {
            return Self::REC601;
        }
        let scale = 65536.0 / sum;
        LumaWeights {
            r: (r * scale).round() as u32,
            g: (g * scale).round() as u32,
            b: (b * scale).round() as u32,
        }
    }

    #[inline]
    pub fn luma(&self, r: u8, g: u8, b: u8) -> u8 {
        let v = (r as u32 * self.r + g as u32 * self.g + b as u32 * self.b + 0x8000) >> 16;
        v.min(255) as u8
    }
}

impl Default for LumaWeights {
    fn default() -> Self {
        Self::REC601
    }
}

/// 8-bit raster with an explicit channel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    mode: ChannelMode,
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Wrap row-major interleaved bytes.
    ///
    /// Fails with [`Error::Shape`] when `bytes.len()` is not
    /// `width * height * mode.channels()`.
    pub fn new(width: usize, height: usize, mode: ChannelMode, bytes: Vec<u8>) -> Result<Self> {
        let channels = mode.channels();
        let actual = bytes.len();
        let data = Array3::from_shape_vec((height, width, channels), bytes).map_err(|_| {
            Error::Shape {
                width,
                height,
                channels,
                actual,
            }
        })?;
        Ok(PixelBuffer { mode, data })
    }

    /// Take ownership of an `(height, width, channels)` array.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        let mode = ChannelMode::from_channels(channels).ok_or_else(|| {
            Error::invalid(format!("unsupported channel count {channels}, expected 1, 3 or 4"))
        })?;
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        debug_assert_eq!(data.dim(), (height, width, channels));
        Ok(PixelBuffer { mode, data })
    }

    /// All-zero buffer of the given shape.
    pub fn zeros(width: usize, height: usize, mode: ChannelMode) -> Self {
        PixelBuffer {
            mode,
            data: Array3::zeros((height, width, mode.channels())),
        }
    }

    pub(crate) fn from_parts(mode: ChannelMode, data: Array3<u8>) -> Self {
        debug_assert_eq!(data.dim().2, mode.channels());
        PixelBuffer { mode, data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Single sample. Panics when out of bounds, like array indexing.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, channel: usize) -> u8 {
        self.data[[y, x, channel]]
    }

    /// Row-major interleaved copy of the samples.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let (bytes, offset) = self.data.into_raw_vec_and_offset();
        match offset {
            Some(0) | None => bytes,
            Some(start) => bytes[start..].to_vec(),
        }
    }

    /// Reduce to a single intensity channel using [`LumaWeights::REC601`].
    ///
    /// Gray buffers pass through unchanged; alpha is ignored.
    pub fn to_intensity(&self) -> PixelBuffer {
        self.to_intensity_with(LumaWeights::REC601)
    }

    pub fn to_intensity_with(&self, weights: LumaWeights) -> PixelBuffer {
        if self.mode == ChannelMode::Gray8 {
            return self.clone();
        }

        let (height, width, _) = self.data.dim();
        let mut output = Array3::<u8>::zeros((height, width, 1));
        for y in 0..height {
            for x in 0..width {
                output[[y, x, 0]] = weights.luma(
                    self.data[[y, x, 0]],
                    self.data[[y, x, 1]],
                    self.data[[y, x, 2]],
                );
            }
        }
        PixelBuffer::from_parts(ChannelMode::Gray8, output)
    }

    /// Copy a rectangular region. The region is clipped to the image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> PixelBuffer {
        let x0 = x.min(self.width());
        let y0 = y.min(self.height());
        let x1 = (x0 + width).min(self.width());
        let y1 = (y0 + height).min(self.height());
        let data = self.data.slice(s![y0..y1, x0..x1, ..]).to_owned();
        PixelBuffer::from_parts(self.mode, data)
    }
}
