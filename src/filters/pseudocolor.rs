//! Pseudocolor: map gray intensities to RGB.
//!
//! Two mechanisms, both driven by the single-channel intensity of the input
//! and both producing an Rgb8 buffer:
//!
//! - **Intensity slicing** - the 0-255 range is cut at ascending thresholds and
//!   every slice gets one flat color.
//! - **Channel transform** - three unary functions compute R, G and B from the
//!   intensity.
//!
//! Named presets for both live in static registries ([`SLICE_PRESETS`],
//! [`CHANNEL_PRESETS`]).

use std::f64::consts::PI;

use ndarray::Array3;

use crate::buffer::{ChannelMode, PixelBuffer};
use crate::error::{Error, Result};

use super::{fill_rows, PARALLEL_THRESHOLD};

/// RGB triple.
pub type Rgb = [u8; 3];

// ============================================================================
// Intensity Slicing
// ============================================================================

/// Ascending thresholds paired with one color per slice.
///
/// `colors[0]` covers `v < thresholds[0]`, `colors[k]` covers
/// `thresholds[k-1] <= v < thresholds[k]` and the last color covers
/// `v >= thresholds[last]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceMap {
    thresholds: Vec<u8>,
    colors: Vec<Rgb>,
}

impl SliceMap {
    /// Validate and normalize a threshold/color pairing.
    ///
    /// Colors are positional: `colors[k]` stays bound to the k-th slice of the
    /// sorted threshold list. Thresholds are sorted ascending; when a
    /// threshold repeats, the slice between the two copies is empty and its
    /// color is dropped.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] unless `colors.len() == thresholds.len() + 1`.
    pub fn new(thresholds: &[u8], colors: &[Rgb]) -> Result<Self> {
        if colors.len() != thresholds.len() + 1 {
            return Err(Error::invalid(format!(
                "intensity slicing needs {} colors for {} thresholds, got {}",
                thresholds.len() + 1,
                thresholds.len(),
                colors.len()
            )));
        }

        let mut sorted = thresholds.to_vec();
        sorted.sort_unstable();

        let mut kept_thresholds = Vec::with_capacity(sorted.len());
        let mut kept_colors = Vec::with_capacity(colors.len());
        kept_colors.push(colors[0]);

        for (i, &t) in sorted.iter().enumerate() {
            if kept_thresholds.last() == Some(&t) {
                if let Some(last) = kept_colors.last_mut() {
                    *last = colors[i + 1];
                }
                continue;
            }
            kept_thresholds.push(t);
            kept_colors.push(colors[i + 1]);
        }

        Ok(SliceMap {
            thresholds: kept_thresholds,
            colors: kept_colors,
        })
    }

    /// Equal-width slices over 0-255, one per color.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] when `colors` is empty.
    pub fn uniform(colors: &[Rgb]) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::invalid("uniform slicing needs at least one color"));
        }
        let n = colors.len();
        let thresholds: Vec<u8> = (1..n).map(|i| (i * 256 / n) as u8).collect();
        SliceMap::new(&thresholds, colors)
    }

    pub fn thresholds(&self) -> &[u8] {
        &self.thresholds
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color of a single intensity.
    pub fn color_of(&self, value: u8) -> Rgb {
        let slice = self.thresholds.partition_point(|&t| t <= value);
        self.colors[slice]
    }

    /// Precomputed color for every intensity.
    pub fn table(&self) -> [Rgb; 256] {
        let mut table = [[0u8; 3]; 256];
        for (v, entry) in table.iter_mut().enumerate() {
            *entry = self.color_of(v as u8);
        }
        table
    }

    pub fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        tracing::debug!(
            width = input.width(),
            height = input.height(),
            slices = self.colors.len(),
            "intensity slicing"
        );
        let table = self.table();
        map_intensity(input, |v| table[v as usize])
    }
}

/// Intensity slicing with caller-supplied thresholds and colors.
///
/// # Arguments
/// * `thresholds` - Slice boundaries, sorted internally
/// * `colors` - One color per slice, `thresholds.len() + 1` entries
///
/// # Returns
/// Rgb8 buffer with the input's dimensions
pub fn intensity_slicing(input: &PixelBuffer, thresholds: &[u8], colors: &[Rgb]) -> Result<PixelBuffer> {
    let map = SliceMap::new(thresholds, colors)?;
    Ok(map.apply(input))
}

/// Named threshold/color pairing.
#[derive(Debug, Clone, Copy)]
pub struct SlicePreset {
    pub name: &'static str,
    pub thresholds: &'static [u8],
    pub colors: &'static [Rgb],
}

impl SlicePreset {
    pub fn to_map(&self) -> Result<SliceMap> {
        SliceMap::new(self.thresholds, self.colors)
    }
}

pub static SLICE_PRESETS: [SlicePreset; 5] = [
    SlicePreset {
        name: "rainbow",
        thresholds: &[32, 64, 96, 128, 160, 192, 224],
        colors: &[
            [0, 0, 143],
            [0, 0, 255],
            [0, 255, 255],
            [0, 255, 0],
            [255, 255, 0],
            [255, 128, 0],
            [255, 0, 0],
            [128, 0, 0],
        ],
    },
    SlicePreset {
        name: "temperature",
        thresholds: &[64, 128, 192],
        colors: &[[0, 0, 255], [0, 255, 255], [255, 255, 0], [255, 0, 0]],
    },
    SlicePreset {
        name: "density",
        thresholds: &[50, 100, 150, 200],
        colors: &[
            [0, 0, 0],
            [128, 0, 128],
            [255, 0, 0],
            [255, 255, 0],
            [255, 255, 255],
        ],
    },
    SlicePreset {
        name: "topographic",
        thresholds: &[32, 64, 96, 128, 160, 192],
        colors: &[
            [0, 0, 128],
            [0, 128, 255],
            [0, 255, 0],
            [128, 128, 0],
            [128, 64, 0],
            [192, 192, 192],
            [255, 255, 255],
        ],
    },
    SlicePreset {
        name: "binary",
        thresholds: &[128],
        colors: &[[0, 0, 0], [255, 255, 255]],
    },
];

pub fn slice_preset(name: &str) -> Option<&'static SlicePreset> {
    SLICE_PRESETS.iter().find(|p| p.name == name)
}

/// Slice with a named preset.
///
/// # Errors
/// [`Error::InvalidParameter`] for an unknown name.
pub fn apply_slice_preset(input: &PixelBuffer, name: &str) -> Result<PixelBuffer> {
    let preset = slice_preset(name)
        .ok_or_else(|| Error::invalid(format!("unknown slice preset '{name}'")))?;
    Ok(preset.to_map()?.apply(input))
}

/// `n` fully saturated colors sweeping the hue circle from red.
pub fn color_gradient(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| {
            let h6 = 6.0 * i as f64 / n as f64;
            let ramp = |v: f64| (255.0 * v) as u8;
            match h6 {
                h if h < 1.0 => [255, ramp(h), 0],
                h if h < 2.0 => [ramp(2.0 - h), 255, 0],
                h if h < 3.0 => [0, 255, ramp(h - 2.0)],
                h if h < 4.0 => [0, ramp(4.0 - h), 255],
                h if h < 5.0 => [ramp(h - 4.0), 0, 255],
                h => [255, 0, ramp(6.0 - h)],
            }
        })
        .collect()
}

// ============================================================================
// Channel Transform
// ============================================================================

/// Compute each output channel from the intensity.
///
/// Function results are clamped into 0-255 and truncated; NaN becomes 0.
pub fn channel_transform<R, G, B>(input: &PixelBuffer, red: R, green: G, blue: B) -> PixelBuffer
where
    R: Fn(f64) -> f64,
    G: Fn(f64) -> f64,
    B: Fn(f64) -> f64,
{
    tracing::debug!(width = input.width(), height = input.height(), "channel transform");

    // Evaluate once per intensity; the mapping only depends on the input level.
    let mut table = [[0u8; 3]; 256];
    for (v, entry) in table.iter_mut().enumerate() {
        let x = v as f64;
        *entry = [to_sample(red(x)), to_sample(green(x)), to_sample(blue(x))];
    }
    map_intensity(input, |v| table[v as usize])
}

#[inline]
fn to_sample(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.clamp(0.0, 255.0) as u8
    }
}

/// Named set of per-channel transfer functions.
#[derive(Debug, Clone, Copy)]
pub struct ChannelPreset {
    pub name: &'static str,
    pub red: fn(f64) -> f64,
    pub green: fn(f64) -> f64,
    pub blue: fn(f64) -> f64,
}

impl ChannelPreset {
    pub fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        channel_transform(input, self.red, self.green, self.blue)
    }
}

fn sine_wave(x: f64, cycles: f64) -> f64 {
    127.5 * (1.0 + ((x / 255.0 * cycles - cycles / 2.0) * PI).sin())
}

pub static CHANNEL_PRESETS: [ChannelPreset; 4] = [
    ChannelPreset {
        name: "hot_iron",
        red: |x| if x < 85.0 { 3.0 * x } else { 255.0 },
        green: |x| {
            if x < 85.0 {
                0.0
            } else if x < 170.0 {
                3.0 * (x - 85.0)
            } else {
                255.0
            }
        },
        blue: |x| if x < 170.0 { 0.0 } else { 3.0 * (x - 170.0) },
    },
    ChannelPreset {
        name: "spectrum",
        red: |x| if x > 128.0 { 255.0 } else { 0.0 },
        green: |x| if (64.0..=192.0).contains(&x) { 255.0 } else { 0.0 },
        blue: |x| if x < 128.0 { 255.0 } else { 0.0 },
    },
    ChannelPreset {
        name: "sinusoidal",
        red: |x| sine_wave(x, 2.0),
        green: |x| sine_wave(x, 4.0),
        blue: |x| sine_wave(x, 8.0),
    },
    ChannelPreset {
        name: "rgb_linear",
        red: |x| 255.0 - x,
        green: |x| x,
        blue: |x| 127.5 * (1.0 + (x / 255.0 * 4.0 * PI).sin()),
    },
];

pub fn channel_preset(name: &str) -> Option<&'static ChannelPreset> {
    CHANNEL_PRESETS.iter().find(|p| p.name == name)
}

/// Channel transform with a named preset.
///
/// # Errors
/// [`Error::InvalidParameter`] for an unknown name.
pub fn apply_channel_preset(input: &PixelBuffer, name: &str) -> Result<PixelBuffer> {
    let preset = channel_preset(name)
        .ok_or_else(|| Error::invalid(format!("unknown channel preset '{name}'")))?;
    Ok(preset.apply(input))
}

// ============================================================================
// Shared
// ============================================================================

fn map_intensity<F>(input: &PixelBuffer, color: F) -> PixelBuffer
where
    F: Fn(u8) -> Rgb + Send + Sync,
{
    let gray = input.to_intensity();
    let src = gray.view();
    let mut output = Array3::<u8>::zeros((input.height(), input.width(), 3));

    fill_rows(&mut output, PARALLEL_THRESHOLD, |y, mut row| {
        for (x, mut px) in row.outer_iter_mut().enumerate() {
            let rgb = color(src[[y, x, 0]]);
            px[0] = rgb[0];
            px[1] = rgb[1];
            px[2] = rgb[2];
        }
    });

    PixelBuffer::from_parts(ChannelMode::Rgb8, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb = [0, 0, 0];
    const WHITE: Rgb = [255, 255, 255];

    fn ramp() -> PixelBuffer {
        PixelBuffer::new(256, 1, ChannelMode::Gray8, (0..=255).collect()).unwrap()
    }

    #[test]
    fn test_binary_threshold_at_128() {
        let out = intensity_slicing(&ramp(), &[128], &[BLACK, WHITE]).unwrap();
        assert_eq!(out.mode(), ChannelMode::Rgb8);
        for x in 0..256 {
            let expected = if x < 128 { 0 } else { 255 };
            for c in 0..3 {
                assert_eq!(out.sample(x, 0, c), expected);
            }
        }
    }

    #[test]
    fn test_color_count_mismatch() {
        let err = intensity_slicing(&ramp(), &[64, 128], &[BLACK, WHITE]);
        assert!(matches!(err, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_unsorted_thresholds_are_sorted() {
        let red = [255, 0, 0];
        let map = SliceMap::new(&[192, 64], &[BLACK, red, WHITE]).unwrap();
        assert_eq!(map.thresholds(), &[64, 192]);
        assert_eq!(map.color_of(10), BLACK);
        assert_eq!(map.color_of(64), red);
        assert_eq!(map.color_of(191), red);
        assert_eq!(map.color_of(192), WHITE);
    }

    #[test]
    fn test_duplicate_threshold_drops_empty_slice() {
        let red = [255, 0, 0];
        let map = SliceMap::new(&[100, 100], &[BLACK, red, WHITE]).unwrap();
        assert_eq!(map.thresholds(), &[100]);
        assert_eq!(map.colors(), &[BLACK, WHITE]);
    }

    #[test]
    fn test_uniform_slices() {
        let map = SliceMap::uniform(&[BLACK, [1, 1, 1], [2, 2, 2], WHITE]).unwrap();
        assert_eq!(map.thresholds(), &[64, 128, 192]);
        assert!(SliceMap::uniform(&[]).is_err());
        assert_eq!(SliceMap::uniform(&[WHITE]).unwrap().color_of(0), WHITE);
    }

    #[test]
    fn test_slice_presets_are_valid() {
        for preset in SLICE_PRESETS.iter() {
            let map = preset.to_map().unwrap();
            assert_eq!(map.colors().len(), map.thresholds().len() + 1, "{}", preset.name);
        }
        assert!(slice_preset("rainbow").is_some());
        assert!(apply_slice_preset(&ramp(), "nope").is_err());
    }

    #[test]
    fn test_color_input_is_reduced_to_intensity() {
        let img = PixelBuffer::new(1, 1, ChannelMode::Rgba8, vec![255, 255, 255, 0]).unwrap();
        let out = apply_slice_preset(&img, "binary").unwrap();
        assert_eq!(out.to_bytes(), vec![255, 255, 255]);
    }

    #[test]
    fn test_color_gradient() {
        let colors = color_gradient(6);
        assert_eq!(colors[0], [255, 0, 0]);
        assert_eq!(colors[2], [0, 255, 0]);
        assert_eq!(colors[4], [0, 0, 255]);
        assert!(color_gradient(0).is_empty());
    }

    #[test]
    fn test_channel_transform_clamps() {
        let out = channel_transform(&ramp(), |x| x * 2.0, |x| x - 300.0, |_| f64::NAN);
        assert_eq!(out.sample(200, 0, 0), 255);
        assert_eq!(out.sample(100, 0, 0), 200);
        assert_eq!(out.sample(200, 0, 1), 0);
        assert_eq!(out.sample(200, 0, 2), 0);
    }

    #[test]
    fn test_hot_iron() {
        let out = apply_channel_preset(&ramp(), "hot_iron").unwrap();
        assert_eq!(&out.to_bytes()[..3], &[0, 0, 0]);
        assert_eq!(out.sample(84, 0, 0), 252);
        assert_eq!(out.sample(100, 0, 1), 45);
        assert_eq!(&out.to_bytes()[255 * 3..], &[255, 255, 255]);
    }

    #[test]
    fn test_spectrum_bands() {
        let out = apply_channel_preset(&ramp(), "spectrum").unwrap();
        assert_eq!(&out.to_bytes()[..3], &[0, 0, 255]);
        assert_eq!(&out.to_bytes()[128 * 3..129 * 3], &[0, 255, 0]);
        assert_eq!(&out.to_bytes()[255 * 3..], &[255, 0, 0]);
    }

    #[test]
    fn test_sinusoidal_midpoint() {
        let preset = channel_preset("sinusoidal").unwrap();
        // sin(-pi) ~ 0, so the start sits at mid-gray
        assert!(((preset.red)(0.0) - 127.5).abs() < 1e-9);
        assert!(((preset.red)(127.5) - 127.5).abs() < 1e-9);
        assert!(apply_channel_preset(&ramp(), "unknown").is_err());
    }
}
