//! Rotation of SH lighting coefficients.
//!
//! Rotating an environment does not require re-projecting the cubemap: each
//! SH band transforms independently by a small matrix. The matrix for band
//! `l` is recovered from `2l+1` reference normals `n_j`:
//!
//! ```text
//! A[i][j] = Y_l^i(n_j)        (basis evaluated at the reference normals)
//! S[i][j] = Y_l^i(R · n_j)    (basis evaluated at the rotated normals)
//! M       = S · A⁻¹
//! ```
//!
//! Band 0 is rotation invariant and is copied through.

use crate::core::coeffs::LightCoeffs;
use crate::core::sh::{eval_sh, SH_ORDER};
use nalgebra::{DMatrix, Matrix3, Vector3};
use std::f64::consts::FRAC_1_SQRT_2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotationError {
    #[error("reference normals for SH band {band} give a singular basis matrix")]
    SingularBand { band: usize },

    #[error("no rotation for SH band {band}: only bands 0 to {} are stored", SH_ORDER)]
    UnsupportedBand { band: usize },
}

/// Reference normals for band 1.
fn band1_normals() -> Vec<Vector3<f64>> {
    vec![
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 1.0, 0.0),
    ]
}

/// Reference normals for band 2.
fn band2_normals() -> Vec<Vector3<f64>> {
    let k = FRAC_1_SQRT_2;
    vec![
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(k, k, 0.0),
        Vector3::new(k, 0.0, k),
        Vector3::new(0.0, k, k),
    ]
}

fn band_basis_matrix(band: usize, normals: &[Vector3<f64>]) -> DMatrix<f64> {
    let size = 2 * band + 1;
    let l = band as i32;
    DMatrix::from_fn(size, normals.len(), |i, j| {
        eval_sh(band, i as i32 - l, &normals[j])
    })
}

/// Rotation matrix for the coefficients of one SH band.
///
/// Band 0 gives the 1×1 identity. Bands above [`SH_ORDER`] are an error.
pub fn band_rotation(band: usize, rotation: &Matrix3<f64>) -> Result<DMatrix<f64>, RotationError> {
    let normals = match band {
        0 => return Ok(DMatrix::identity(1, 1)),
        1 => band1_normals(),
        2 => band2_normals(),
        _ => return Err(RotationError::UnsupportedBand { band }),
    };

    let a = band_basis_matrix(band, &normals);
    let rotated: Vec<Vector3<f64>> = normals.iter().map(|n| rotation * n).collect();
    let s = band_basis_matrix(band, &rotated);

    let a_inv = a
        .try_inverse()
        .ok_or(RotationError::SingularBand { band })?;
    Ok(s * a_inv)
}

/// Rotate lighting so that light arriving from `d` now arrives from `R · d`.
pub fn rotate_light(
    light: &LightCoeffs,
    rotation: &Matrix3<f32>,
) -> Result<LightCoeffs, RotationError> {
    let rotation = rotation.cast::<f64>();
    let mut rotated = *light;

    for band in 1..=SH_ORDER {
        let m = band_rotation(band, &rotation)?;
        let offset = band * band;
        let size = 2 * band + 1;

        for channel in 0..3 {
            let coeffs = light.channel(channel).cast::<f64>();
            let band_coeffs = coeffs.rows(offset, size).into_owned();
            let out = &m * band_coeffs;
            for i in 0..size {
                let mut rgb = rotated.coefficient(offset + i);
                rgb[channel] = out[i] as f32;
                rotated.set_coefficient(offset + i, rgb);
            }
        }
    }

    Ok(rotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sh::{sh_basis, to_vector, SH_COEFF_LENGTH};
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    fn reconstruct(light: &LightCoeffs, channel: usize, dir: &Vector3<f64>) -> f64 {
        let basis = sh_basis(dir);
        let coeffs = light.channel(channel);
        (0..SH_COEFF_LENGTH).map(|i| basis[i] * f64::from(coeffs[i])).sum()
    }

    fn sample_light() -> LightCoeffs {
        let mut light = LightCoeffs::zeros();
        for i in 0..SH_COEFF_LENGTH {
            let x = i as f32;
            light.set_coefficient(i, Vector3::new(1.0 - 0.1 * x, 0.05 * x, (x * 0.7).sin()));
        }
        light
    }

    #[test]
    fn test_identity_rotation_is_noop() {
        let light = sample_light();
        let rotated = rotate_light(&light, &Matrix3::identity()).unwrap();
        assert_relative_eq!(*rotated.matrix(), *light.matrix(), epsilon = 1e-5);
    }

    #[test]
    fn test_rotated_light_follows_the_rotation() {
        let light = sample_light();
        let rotation = Rotation3::from_euler_angles(0.3, -0.8, 1.9);
        let rotated = rotate_light(&light, rotation.matrix()).unwrap();

        let r64 = rotation.matrix().cast::<f64>();
        for &(phi, theta) in &[(0.2, 0.4), (3.0, 1.2), (5.5, 2.6)] {
            let d = to_vector(phi, theta);
            for channel in 0..3 {
                let before = reconstruct(&light, channel, &d);
                let after = reconstruct(&rotated, channel, &(r64 * d));
                assert_relative_eq!(before, after, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_dc_term_is_preserved() {
        let light = sample_light();
        let rotation = Rotation3::from_euler_angles(1.0, 0.5, -0.25);
        let rotated = rotate_light(&light, rotation.matrix()).unwrap();
        assert_eq!(rotated.coefficient(0), light.coefficient(0));
    }

    #[test]
    fn test_band_zero_is_identity_and_higher_bands_are_errors() {
        let rotation = Rotation3::from_euler_angles(0.4, 0.2, 0.9).matrix().cast::<f64>();
        assert_eq!(band_rotation(0, &rotation).unwrap(), DMatrix::identity(1, 1));
        assert!(matches!(
            band_rotation(SH_ORDER + 1, &rotation),
            Err(RotationError::UnsupportedBand { band: 3 })
        ));
    }

    #[test]
    fn test_band_matrices_are_orthogonal() {
        let rotation = Rotation3::from_euler_angles(0.7, 0.1, -1.3).matrix().cast::<f64>();
        for band in 1..=SH_ORDER {
            let m = band_rotation(band, &rotation).unwrap();
            let product = &m * m.transpose();
            let identity = DMatrix::<f64>::identity(m.nrows(), m.ncols());
            assert_relative_eq!(product, identity, epsilon = 1e-9);
        }
    }
}
