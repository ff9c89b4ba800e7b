//! Intensity histograms and histogram equalization.
//!
//! Histograms are always computed on the single-channel intensity of a
//! buffer (see [`PixelBuffer::to_intensity`]). They are recomputed from
//! scratch on every call.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

use super::lut::Lut;
use super::PARALLEL_THRESHOLD;

/// 256-bin intensity histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; 256],
    total: u64,
}

/// Summary statistics of an intensity histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramStats {
    /// Lowest occupied intensity (0 for an empty histogram).
    pub min: u8,
    /// Highest occupied intensity (0 for an empty histogram).
    pub max: u8,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl Histogram {
    pub fn from_counts(counts: [u64; 256]) -> Self {
        let total = counts.iter().sum();
        Histogram { counts, total }
    }

    pub fn counts(&self) -> &[u64; 256] {
        &self.counts
    }

    /// Number of samples counted (width * height).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Probability of each intensity. All zeros for an empty image.
    pub fn normalized(&self) -> [f64; 256] {
        let mut out = [0.0f64; 256];
        if self.total == 0 {
            return out;
        }
        let total = self.total as f64;
        for (p, &count) in out.iter_mut().zip(self.counts.iter()) {
            *p = count as f64 / total;
        }
        out
    }

    /// Cumulative distribution of the normalized histogram.
    pub fn cdf(&self) -> [f64; 256] {
        let mut cdf = self.normalized();
        let mut acc = 0.0;
        for p in cdf.iter_mut() {
            acc += *p;
            *p = acc;
        }
        cdf
    }

    /// Mapping `lut[i] = round(255 * cdf[i])`.
    ///
    /// The CDF is non-decreasing, so the table is too.
    pub fn equalization_lut(&self) -> Lut {
        let cdf = self.cdf();
        Lut::from_fn(|i| 255.0 * cdf[i as usize])
    }

    pub fn stats(&self) -> HistogramStats {
        let min = self.counts.iter().position(|&c| c > 0).unwrap_or(0) as u8;
        let max = self.counts.iter().rposition(|&c| c > 0).unwrap_or(0) as u8;

        let normalized = self.normalized();
        let mean: f64 = normalized
            .iter()
            .enumerate()
            .map(|(i, p)| i as f64 * p)
            .sum();
        let variance: f64 = normalized
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64 - mean).powi(2) * p)
            .sum();

        HistogramStats {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Count how many samples of the intensity image fall in each bin.
pub fn compute_histogram(input: &PixelBuffer) -> Histogram {
    let gray = input.to_intensity();
    let samples = gray.to_bytes();
    let histogram = count_samples(&samples, PARALLEL_THRESHOLD);

    tracing::debug!(
        width = input.width(),
        height = input.height(),
        total = histogram.total,
        "histogram computed"
    );
    histogram
}

fn count_samples(samples: &[u8], threshold: usize) -> Histogram {
    let counts = if samples.len() >= threshold {
        samples
            .par_chunks(4096)
            .fold(
                || [0u64; 256],
                |mut acc, chunk| {
                    for &v in chunk {
                        acc[v as usize] += 1;
                    }
                    acc
                },
            )
            .reduce(
                || [0u64; 256],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b.iter()) {
                        *x += y;
                    }
                    a
                },
            )
    } else {
        let mut acc = [0u64; 256];
        for &v in samples {
            acc[v as usize] += 1;
        }
        acc
    };
    Histogram::from_counts(counts)
}

/// Result of [`equalize`].
#[derive(Debug, Clone)]
pub struct Equalization {
    pub image: PixelBuffer,
    /// Intensity histogram of the input.
    pub original: Histogram,
    /// Intensity histogram of the equalized image.
    pub equalized: Histogram,
    /// Mapping that was applied.
    pub lut: Lut,
}

/// Histogram equalization.
///
/// The mapping is derived from the intensity histogram and applied to every
/// color sample of `input` exactly like a point transform; alpha is kept.
/// Gray inputs therefore get classic equalization, color inputs keep their
/// mode and get the same tone curve on every channel.
///
/// On color input the curve is applied to R, G and B independently, so
/// pixels whose channels sit on differently sloped parts of the curve change
/// hue and saturation. Pass `input.to_intensity()` to get the equalized
/// intensity image instead.
pub fn equalize(input: &PixelBuffer) -> Equalization {
    let original = compute_histogram(input);
    let lut = original.equalization_lut();
    let image = lut.apply(input);
    let equalized = compute_histogram(&image);

    tracing::debug!(width = input.width(), height = input.height(), "histogram equalized");

    Equalization {
        image,
        original,
        equalized,
        lut,
    }
}
