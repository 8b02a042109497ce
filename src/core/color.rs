//! Color transfer functions for cubemap decoding.
//!
//! Lighting is projected in **linear RGB**. Low-dynamic-range face images
//! (JPEG/PNG) store encoded values and must be decoded first; floating
//! point faces (HDR/EXR) are already linear.
//!
//! Two decodings are supported, selected with [`TransferFunction`]:
//!
//! ### Gamma 2.2 (default)
//!
//! - linear = value ^ 2.2
//!
//! ### Standard sRGB Transfer Function
//!
//! - if sRGB <= 0.04045: linear = sRGB / 12.92
//! - if sRGB > 0.04045: linear = ((sRGB + 0.055) / 1.055) ^ 2.4
//!
//! This is NOT the same as simple gamma 2.2 (`x^2.2`).

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Exponent of the plain gamma decoding.
pub const LDR_GAMMA: f32 = 2.2;

/// How 8/16-bit face values are mapped to linear radiance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFunction {
    /// `x^2.2`
    #[default]
    Gamma,
    /// Piecewise sRGB curve
    Srgb,
}

impl TransferFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gamma => "gamma",
            Self::Srgb => "srgb",
        }
    }

    /// Decode one normalized value.
    pub fn to_linear(&self, value: f32) -> f32 {
        match self {
            Self::Gamma => gamma_to_linear(value),
            Self::Srgb => srgb_to_linear(value),
        }
    }

    /// Decode a buffer of normalized values, in place.
    pub fn decode_in_place(&self, values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = self.to_linear(*v);
        }
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gamma" => Ok(Self::Gamma),
            "srgb" => Ok(Self::Srgb),
            other => Err(format!("unknown transfer function '{other}'")),
        }
    }
}

/// Convert a gamma-2.2 encoded value in [0, 1] to linear.
pub fn gamma_to_linear(value: f32) -> f32 {
    value.clamp(0.0, 1.0).powf(LDR_GAMMA)
}

/// Convert an sRGB-encoded value in [0, 1] to linear.
///
/// # Example
/// ```
/// use prt_rs::core::color::srgb_to_linear;
///
/// // Middle gray in sRGB (128/255) is about 0.21 in linear space
/// let linear = srgb_to_linear(128.0 / 255.0);
/// assert!((linear - 0.2158).abs() < 0.01);
/// ```
pub fn srgb_to_linear(cs: f32) -> f32 {
    let cs = cs.clamp(0.0, 1.0);
    if cs <= 0.04045 {
        cs / 12.92
    } else {
        ((cs + 0.055) / 1.055).powf(2.4)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_segment() {
        // Below the breakpoint the curve is a straight line
        assert!((srgb_to_linear(0.02) - 0.02 / 12.92).abs() < 1e-9);
    }

    #[test]
    fn test_not_simple_gamma_2_2() {
        let val = 0.5f32;
        let gamma_2_2 = val.powf(2.2);
        assert!((srgb_to_linear(val) - gamma_2_2).abs() > 0.001);
    }

    #[test]
    fn test_decode_in_place_is_monotonic() {
        for transfer in [TransferFunction::Gamma, TransferFunction::Srgb] {
            let mut values = [0.0, 0.25, 0.5, 0.75, 1.0];
            transfer.decode_in_place(&mut values);
            assert!(values.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_gamma_is_the_default() {
        assert_eq!(TransferFunction::default(), TransferFunction::Gamma);
        assert_eq!("srgb".parse::<TransferFunction>(), Ok(TransferFunction::Srgb));
        assert!("linear".parse::<TransferFunction>().is_err());
    }

    #[test]
    fn test_dark_8bit_values_use_plain_gamma() {
        // 8-bit 5 and 20 decode to (x/255)^2.2, far darker than the sRGB curve
        let dark = TransferFunction::Gamma.to_linear(5.0 / 255.0);
        assert!((dark - 0.000_175).abs() < 2e-6, "got {dark}");
        let dim = TransferFunction::Gamma.to_linear(20.0 / 255.0);
        assert!((dim - 0.003_697).abs() < 2e-5, "got {dim}");
        assert!(TransferFunction::Srgb.to_linear(5.0 / 255.0) > 8.0 * dark);
    }
}
