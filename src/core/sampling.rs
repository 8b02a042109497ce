//! Stratified Monte Carlo projection onto the SH basis.
//!
//! Samples come from a `side × side` jittered grid over the unit square,
//! mapped to the sphere with
//! `phi = 2π·beta`, `theta = acos(2·alpha − 1)`, which is uniform in solid
//! angle. Every sample therefore carries the same estimator weight
//! `4π / side²`.

use crate::core::sh::{eval_sh, sh_index, to_vector, SH_COEFF_LENGTH, SH_ORDER};
use nalgebra::{SVector, Vector3};
use rand::Rng;
use std::f64::consts::PI;
use thiserror::Error;

/// Coefficient vector over the stored SH basis.
pub type ShVector = SVector<f64, SH_COEFF_LENGTH>;

/// Errors from sample-count validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplingError {
    #[error("sample count {sample_count} yields no stratified samples (need at least 1)")]
    TooFewSamples { sample_count: u32 },
}

/// One stratified sample on the unit sphere.
#[derive(Debug, Clone, Copy)]
pub struct SphereSample {
    pub phi: f64,
    pub theta: f64,
    pub direction: Vector3<f64>,
}

/// Jittered grid sampler over the sphere.
///
/// Only `floor(sqrt(sample_count))^2` samples are drawn.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedSphere {
    side: u32,
}

impl StratifiedSphere {
    /// Build a sampler for a requested sample count.
    pub fn new(sample_count: u32) -> Result<Self, SamplingError> {
        let side = f64::from(sample_count).sqrt().floor() as u32;
        if side == 0 {
            return Err(SamplingError::TooFewSamples { sample_count });
        }
        Ok(Self { side })
    }

    /// Samples per grid axis.
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Number of samples actually drawn.
    pub fn len(&self) -> usize {
        (self.side * self.side) as usize
    }

    /// Always false; a sampler with zero samples cannot be built.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Monte Carlo weight applied to every sample.
    pub fn weight(&self) -> f64 {
        4.0 * PI / f64::from(self.side * self.side)
    }

    /// Visit every jittered sample in grid order.
    pub fn for_each<R: Rng + ?Sized, F: FnMut(SphereSample)>(&self, rng: &mut R, mut f: F) {
        let side = f64::from(self.side);
        for t in 0..self.side {
            for p in 0..self.side {
                let alpha = (f64::from(t) + rng.gen::<f64>()) / side;
                let beta = (f64::from(p) + rng.gen::<f64>()) / side;
                let phi = 2.0 * PI * beta;
                let theta = (2.0 * alpha - 1.0).clamp(-1.0, 1.0).acos();
                f(SphereSample {
                    phi,
                    theta,
                    direction: to_vector(phi, theta),
                });
            }
        }
    }
}

/// Project a scalar function of (phi, theta) onto the SH basis.
///
/// Draws from a fresh thread-local generator on every call.
pub fn project_function<F>(func: F, sample_count: u32) -> Result<ShVector, SamplingError>
where
    F: Fn(f64, f64) -> f64,
{
    project_function_with_rng(func, sample_count, &mut rand::thread_rng())
}

/// [`project_function`] with a caller-supplied generator.
pub fn project_function_with_rng<F, R>(
    func: F,
    sample_count: u32,
    rng: &mut R,
) -> Result<ShVector, SamplingError>
where
    F: Fn(f64, f64) -> f64,
    R: Rng + ?Sized,
{
    let sampler = StratifiedSphere::new(sample_count)?;
    let mut coeffs = ShVector::zeros();

    sampler.for_each(rng, |sample| {
        let value = func(sample.phi, sample.theta);
        for l in 0..=SH_ORDER {
            let l_i = l as i32;
            for m in -l_i..=l_i {
                coeffs[sh_index(l, m)] += value * eval_sh(l, m, &sample.direction);
            }
        }
    });

    Ok(coeffs * sampler.weight())
}

/// Integrate a vector-valued function over the sphere without basis weighting.
///
/// Used when each sample already yields SH coefficients (gathered transport),
/// so the estimator only needs the uniform solid-angle weight.
pub fn integrate_vector_with_rng<F, R>(
    func: F,
    sample_count: u32,
    rng: &mut R,
) -> Result<ShVector, SamplingError>
where
    F: Fn(&SphereSample) -> ShVector,
    R: Rng + ?Sized,
{
    let sampler = StratifiedSphere::new(sample_count)?;
    let mut acc = ShVector::zeros();
    sampler.for_each(rng, |sample| acc += func(&sample));
    Ok(acc * sampler.weight())
}
