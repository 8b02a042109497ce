//! One-bounce inter-reflection.
//!
//! Only vertices whose direct transport is exactly zero (no upper-hemisphere
//! direction reaches the environment) are revisited. For those, each sampled
//! direction is traced into the scene and the hit point's *direct* transport,
//! interpolated across the hit triangle and weighted by `ω·N`, is gathered:
//!
//! ```text
//! T_bounce = ∫ max(0, ω·N) · T_direct(hit(P, ω)) dω
//! ```
//!
//! The direct matrix is only read here and the gathered columns go into a
//! separate accumulator, so results do not depend on vertex order.

use crate::core::sampling::{integrate_vector_with_rng, SamplingError, ShVector, StratifiedSphere};
use crate::core::{Mesh, Ray, Scene, TransportCoeffs};
use nalgebra::Vector3;
use rand::Rng;
use rayon::prelude::*;

/// Gather one bounce of transport at a surface point.
pub fn gather_bounce<S, R>(
    scene: &S,
    direct: &TransportCoeffs,
    position: &Vector3<f32>,
    normal: &Vector3<f32>,
    sample_count: u32,
    rng: &mut R,
) -> Result<ShVector, SamplingError>
where
    S: Scene + ?Sized,
    R: Rng + ?Sized,
{
    integrate_vector_with_rng(
        |sample| {
            let wi = sample.direction.cast::<f32>();
            let h = wi.dot(normal);
            if h < 0.0 {
                return ShVector::zeros();
            }
            match scene.intersect(&Ray::new(*position, wi)) {
                None => ShVector::zeros(),
                Some(hit) => {
                    let gathered = direct.interpolate(hit.vertices, &hit.barycentric);
                    gathered.cast::<f64>() * f64::from(h)
                }
            }
        },
        sample_count,
        rng,
    )
}

/// Result of the inter-reflection pass, kept apart from the direct matrix.
#[derive(Debug, Clone)]
pub struct BounceTransport {
    /// Vertices whose direct transport was all zero
    pub vertices: Vec<usize>,

    /// Gathered transport, one entry per element of `vertices`
    pub columns: Vec<ShVector>,
}

impl BounceTransport {
    /// Add the gathered transport into `transport`.
    ///
    /// Columns of vertices that were not revisited are left untouched.
    pub fn apply(&self, transport: &mut TransportCoeffs) {
        for (&v, column) in self.vertices.iter().zip(&self.columns) {
            transport.add_to_column(v, &column.cast::<f32>());
        }
    }
}

/// Compute one bounce for every fully shadowed vertex.
pub fn interreflection_pass<S: Scene + ?Sized>(
    scene: &S,
    mesh: &Mesh,
    direct: &TransportCoeffs,
    sample_count: u32,
) -> Result<BounceTransport, SamplingError> {
    StratifiedSphere::new(sample_count)?;

    let vertices: Vec<usize> = (0..direct.vertex_count())
        .filter(|&v| direct.is_zero(v))
        .collect();
    log::info!(
        "Inter-reflection: {} of {} vertices are fully shadowed",
        vertices.len(),
        direct.vertex_count()
    );

    let columns = vertices
        .par_iter()
        .map(|&v| {
            gather_bounce(
                scene,
                direct,
                &mesh.position(v),
                &mesh.normal(v),
                sample_count,
                &mut rand::thread_rng(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BounceTransport { vertices, columns })
}
