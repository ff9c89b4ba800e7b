//! 256-entry lookup tables.
//!
//! Every point transform in this crate is a [`Lut`]: the table is computed
//! once per call and then applied to each color sample. Alpha is never
//! remapped.

use std::ops::Index;

use crate::buffer::PixelBuffer;

use super::{fill_rows, PARALLEL_THRESHOLD};

/// One output intensity per possible 8-bit input intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lut([u8; 256]);

impl Lut {
    pub fn identity() -> Self {
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }
        Lut(table)
    }

    /// Build a table from a real-valued transfer function.
    ///
    /// Results are rounded to the nearest integer and clamped into 0-255.
    /// A non-finite result maps to 0.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u8) -> f64,
    {
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            let out = f(i as u8);
            *v = if out.is_finite() {
                out.round().clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
        Lut(table)
    }

    pub fn from_table(table: [u8; 256]) -> Self {
        Lut(table)
    }

    pub fn as_table(&self) -> &[u8; 256] {
        &self.0
    }

    /// True when `lut[i] <= lut[i + 1]` for every i.
    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }

    /// Apply the table to every color sample of `input`.
    pub fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        self.apply_with_threshold(input, PARALLEL_THRESHOLD)
    }

    pub(crate) fn apply_with_threshold(&self, input: &PixelBuffer, threshold: usize) -> PixelBuffer {
        let color_channels = input.mode().color_channels();
        let mut output = input.as_array().clone();

        fill_rows(&mut output, threshold, |_, mut row| {
            for mut px in row.outer_iter_mut() {
                for c in 0..color_channels {
                    px[c] = self.0[px[c] as usize];
                }
            }
        });

        PixelBuffer::from_parts(input.mode(), output)
    }
}

impl Index<u8> for Lut {
    type Output = u8;

    fn index(&self, index: u8) -> &u8 {
        &self.0[index as usize]
    }
}

impl Default for Lut {
    fn default() -> Self {
        Self::identity()
    }
}
