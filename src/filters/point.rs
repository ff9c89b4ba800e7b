//! Point transforms: Negative, Zero Intensity, Power (gamma), Contrast Stretch.
//!
//! Each transform builds a [`Lut`] once and applies it to every color
//! sample. Shape and channel mode are preserved.
//!
//! ## Supported Formats
//!
//! - **Gray8**: remaps the single channel
//! - **Rgb8**: remaps all 3 channels independently
//! - **Rgba8**: remaps RGB, preserves alpha

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

use super::lut::Lut;

// ============================================================================
// Negative
// ============================================================================

/// Invert intensities: `s = 255 - r`.
pub fn negative(input: &PixelBuffer) -> PixelBuffer {
    tracing::debug!(width = input.width(), height = input.height(), "negative");
    negative_lut().apply(input)
}

pub fn negative_lut() -> Lut {
    let mut table = [0u8; 256];
    for (i, v) in table.iter_mut().enumerate() {
        *v = 255 - i as u8;
    }
    Lut::from_table(table)
}

// ============================================================================
// Zero Intensity
// ============================================================================

/// Set every color sample to zero, keeping shape, mode and alpha.
pub fn zero_intensity(input: &PixelBuffer) -> PixelBuffer {
    tracing::debug!(width = input.width(), height = input.height(), "zero intensity");
    Lut::from_table([0u8; 256]).apply(input)
}

// ============================================================================
// Power (Gamma)
// ============================================================================

/// Apply `s = c * (r / 255)^gamma * 255`, rounded and clamped.
///
/// # Arguments
/// * `gamma` - Exponent, must be positive. Below 1 brightens shadows,
///   above 1 darkens them, 1 is the identity.
/// * `c` - Multiplicative constant, typically 1.0
///
/// # Errors
/// [`Error::InvalidParameter`] when `gamma <= 0` or either value is not finite.
pub fn power_transform(input: &PixelBuffer, gamma: f64, c: f64) -> Result<PixelBuffer> {
    let lut = power_lut(gamma, c)?;
    tracing::debug!(width = input.width(), height = input.height(), gamma, c, "power transform");
    Ok(lut.apply(input))
}

pub fn power_lut(gamma: f64, c: f64) -> Result<Lut> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(Error::invalid(format!("gamma must be positive, got {gamma}")));
    }
    if !c.is_finite() {
        return Err(Error::invalid(format!("c must be finite, got {c}")));
    }
    Ok(Lut::from_fn(|r| c * (r as f64 / 255.0).powf(gamma) * 255.0))
}

// ============================================================================
// Contrast Stretch
// ============================================================================

/// Piecewise-linear stretch through (0,0), (r1,s1), (r2,s2), (255,255).
///
/// A segment whose input span is zero gets slope 0.
///
/// # Errors
/// [`Error::InvalidParameter`] unless `r1 < r2` and `s1 <= s2`.
pub fn contrast_stretch(input: &PixelBuffer, r1: u8, s1: u8, r2: u8, s2: u8) -> Result<PixelBuffer> {
    let lut = contrast_stretch_lut(r1, s1, r2, s2)?;
    tracing::debug!(
        width = input.width(),
        height = input.height(),
        r1, s1, r2, s2,
        "contrast stretch"
    );
    Ok(lut.apply(input))
}

pub fn contrast_stretch_lut(r1: u8, s1: u8, r2: u8, s2: u8) -> Result<Lut> {
    if r1 >= r2 {
        return Err(Error::invalid(format!(
            "contrast stretch requires 0 <= r1 < r2 <= 255, got r1={r1} r2={r2}"
        )));
    }
    if s1 > s2 {
        return Err(Error::invalid(format!(
            "contrast stretch requires 0 <= s1 <= s2 <= 255, got s1={s1} s2={s2}"
        )));
    }

    let (r1, s1, r2, s2) = (r1 as f64, s1 as f64, r2 as f64, s2 as f64);
    let slope = |ds: f64, dr: f64| if dr == 0.0 { 0.0 } else { ds / dr };

    let a1 = slope(s1, r1);
    let a2 = slope(s2 - s1, r2 - r1);
    let a3 = slope(255.0 - s2, 255.0 - r2);

    Ok(Lut::from_fn(|r| {
        let r = r as f64;
        if r <= r1 {
            a1 * r
        } else if r <= r2 {
            s1 + a2 * (r - r1)
        } else {
            s2 + a3 * (r - r2)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ChannelMode;

    fn ramp_rgba() -> PixelBuffer {
        let mut bytes = Vec::new();
        for v in 0..=255u8 {
            bytes.extend_from_slice(&[v, v.wrapping_mul(3), 255 - v, 200]);
        }
        PixelBuffer::new(16, 16, ChannelMode::Rgba8, bytes).unwrap()
    }

    #[test]
    fn test_negative_twice_is_identity() {
        let img = ramp_rgba();
        assert_eq!(negative(&negative(&img)), img);
    }

    #[test]
    fn test_negative_values() {
        let img = PixelBuffer::new(3, 1, ChannelMode::Gray8, vec![0, 100, 255]).unwrap();
        assert_eq!(negative(&img).to_bytes(), vec![255, 155, 0]);
    }

    #[test]
    fn test_zero_intensity_keeps_alpha() {
        let img = ramp_rgba();
        let out = zero_intensity(&img);
        assert_eq!(out.mode(), ChannelMode::Rgba8);
        for px in out.to_bytes().chunks(4) {
            assert_eq!(px, &[0, 0, 0, 200]);
        }
    }

    #[test]
    fn test_power_identity() {
        let img = ramp_rgba();
        assert_eq!(power_transform(&img, 1.0, 1.0).unwrap(), img);
    }

    #[test]
    fn test_power_gamma_half_brightens() {
        let img = PixelBuffer::new(1, 1, ChannelMode::Gray8, vec![64]).unwrap();
        let out = power_transform(&img, 0.5, 1.0).unwrap();
        // sqrt(64/255) * 255 = 127.75
        assert_eq!(out.sample(0, 0, 0), 128);
    }

    #[test]
    fn test_power_rejects_non_positive_gamma() {
        let img = ramp_rgba();
        assert!(matches!(power_transform(&img, 0.0, 1.0), Err(Error::InvalidParameter(_))));
        assert!(power_transform(&img, -1.0, 1.0).is_err());
        assert!(power_transform(&img, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_power_constant_clamps() {
        let lut = power_lut(1.0, 2.0).unwrap();
        assert_eq!(lut[200], 255);
        assert_eq!(lut[50], 100);
    }

    #[test]
    fn test_contrast_stretch_identity_through_corners() {
        let img = ramp_rgba();
        assert_eq!(contrast_stretch(&img, 0, 0, 255, 255).unwrap(), img);
    }

    #[test]
    fn test_contrast_stretch_segments() {
        let lut = contrast_stretch_lut(64, 32, 192, 224).unwrap();
        assert_eq!(lut[0], 0);
        assert_eq!(lut[64], 32);
        assert_eq!(lut[128], 128);
        assert_eq!(lut[192], 224);
        assert_eq!(lut[255], 255);
        assert!(lut.is_monotonic());
    }

    #[test]
    fn test_contrast_stretch_threshold_shape() {
        // r1 = 0 makes the first segment flat
        let lut = contrast_stretch_lut(0, 0, 1, 255).unwrap();
        assert_eq!(lut[0], 0);
        assert_eq!(lut[1], 255);
    }

    #[test]
    fn test_contrast_stretch_rejects_bad_points() {
        let img = ramp_rgba();
        assert!(contrast_stretch(&img, 100, 0, 100, 255).is_err());
        assert!(contrast_stretch(&img, 10, 200, 100, 100).is_err());
    }
}
