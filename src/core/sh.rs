//! Real spherical harmonics basis.
//!
//! Both the environment lighting and the per-vertex transport are stored as
//! coefficients over this basis, so the convention used here is the only one
//! in the crate. Basis functions carry the Condon–Shortley phase and are
//! orthonormal over the unit sphere.
//!
//! We use degree-2 SH, which requires 9 coefficients per function.
//!
//! The flat coefficient order is:
//! - Degree 0 (1 function): Y_0^0
//! - Degree 1 (3 functions): Y_1^{-1}, Y_1^0, Y_1^1
//! - Degree 2 (5 functions): Y_2^{-2}, Y_2^{-1}, Y_2^0, Y_2^1, Y_2^2

use nalgebra::Vector3;
use std::f64::consts::PI;

/// Highest SH degree stored for lighting and transport.
pub const SH_ORDER: usize = 2;

/// Number of coefficients per SH function: (SH_ORDER + 1)^2.
pub const SH_COEFF_LENGTH: usize = (SH_ORDER + 1) * (SH_ORDER + 1);

/// Flat coefficient index of the (degree, order) pair: `l*l + l + m`.
///
/// # Panics
/// If `|m| > l`.
pub fn sh_index(l: usize, m: i32) -> usize {
    assert!(
        m.unsigned_abs() as usize <= l,
        "SH order {m} out of range for degree {l}"
    );
    (l * l + l).wrapping_add_signed(m as isize)
}

/// Convert spherical angles to a unit direction.
///
/// `phi` is the azimuth around +Z measured from +X, `theta` the polar angle
/// from +Z.
pub fn to_vector(phi: f64, theta: f64) -> Vector3<f64> {
    let r = theta.sin();
    Vector3::new(r * phi.cos(), r * phi.sin(), theta.cos())
}

/// Convert a unit direction back to (phi, theta), with phi in [0, 2π).
pub fn to_spherical(dir: &Vector3<f64>) -> (f64, f64) {
    let theta = dir.z.clamp(-1.0, 1.0).acos();
    let mut phi = dir.y.atan2(dir.x);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    (phi, theta)
}

/// Evaluate `Y_l^m` at a unit direction.
///
/// Degrees up to 2 use the closed-form polynomials; higher degrees fall back
/// to the associated Legendre recurrence. The direction must already be
/// normalized.
///
/// # Panics
/// If `|m| > l`.
pub fn eval_sh(l: usize, m: i32, dir: &Vector3<f64>) -> f64 {
    assert!(
        m.unsigned_abs() as usize <= l,
        "SH order {m} out of range for degree {l}"
    );
    debug_assert!(
        (dir.norm_squared() - 1.0).abs() < 1e-6,
        "SH basis evaluated at non-unit direction {dir:?}"
    );

    let (x, y, z) = (dir.x, dir.y, dir.z);
    match (l, m) {
        (0, 0) => 0.282_094_791_773_878_14,
        (1, -1) => -0.488_602_511_902_919_9 * y,
        (1, 0) => 0.488_602_511_902_919_9 * z,
        (1, 1) => -0.488_602_511_902_919_9 * x,
        (2, -2) => 1.092_548_430_592_079_2 * x * y,
        (2, -1) => -1.092_548_430_592_079_2 * y * z,
        (2, 0) => 0.315_391_565_252_520_05 * (-x * x - y * y + 2.0 * z * z),
        (2, 1) => -1.092_548_430_592_079_2 * x * z,
        (2, 2) => 0.546_274_215_296_039_6 * (x * x - y * y),
        _ => {
            let (phi, theta) = to_spherical(dir);
            eval_sh_angles(l, m, phi, theta)
        }
    }
}

/// Evaluate `Y_l^m` from spherical angles using the Legendre recurrence.
///
/// Valid for any degree. Slower than [`eval_sh`] for the stored degrees.
pub fn eval_sh_angles(l: usize, m: i32, phi: f64, theta: f64) -> f64 {
    let abs_m = m.unsigned_abs() as usize;
    let kml = normalization(l, abs_m);
    let legendre = associated_legendre(l, abs_m, theta.cos());
    if m > 0 {
        std::f64::consts::SQRT_2 * kml * (m as f64 * phi).cos() * legendre
    } else if m < 0 {
        std::f64::consts::SQRT_2 * kml * (-m as f64 * phi).sin() * legendre
    } else {
        kml * legendre
    }
}

/// Evaluate every stored basis function at once, in flat index order.
pub fn sh_basis(dir: &Vector3<f64>) -> [f64; SH_COEFF_LENGTH] {
    let mut basis = [0.0; SH_COEFF_LENGTH];
    for l in 0..=SH_ORDER {
        let l_i = l as i32;
        for m in -l_i..=l_i {
            basis[sh_index(l, m)] = eval_sh(l, m, dir);
        }
    }
    basis
}

fn normalization(l: usize, abs_m: usize) -> f64 {
    let ratio = factorial(l - abs_m) / factorial(l + abs_m);
    ((2 * l + 1) as f64 * ratio / (4.0 * PI)).sqrt()
}

fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// P_l^m(x) with the Condon–Shortley phase, for m >= 0.
fn associated_legendre(l: usize, m: usize, x: f64) -> f64 {
    let mut pmm = 1.0;
    if m > 0 {
        let somx2 = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();
        let mut fact = 1.0;
        for _ in 0..m {
            pmm *= -fact * somx2;
            fact += 2.0;
        }
    }
    if l == m {
        return pmm;
    }

    let mut pmm1 = x * (2 * m + 1) as f64 * pmm;
    if l == m + 1 {
        return pmm1;
    }

    for n in (m + 2)..=l {
        let pmn = (x * (2 * n - 1) as f64 * pmm1 - (n + m - 1) as f64 * pmm) / (n - m) as f64;
        pmm = pmm1;
        pmm1 = pmn;
    }
    pmm1
}
