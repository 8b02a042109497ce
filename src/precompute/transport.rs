//! Direct transport projection.
//!
//! For a vertex at `P` with normal `N` the transport function is
//! `T(ω) = max(0, ω·N) · V(ω)`, with `V` either 1 (unshadowed) or the
//! visibility of the environment along a ray from `P` (shadowed). Each
//! vertex's `T` is projected onto SH independently.

use crate::config::TransportType;
use crate::core::sampling::{project_function_with_rng, SamplingError, ShVector, StratifiedSphere};
use crate::core::sh::to_vector;
use crate::core::{Mesh, Ray, Scene, TransportCoeffs};
use nalgebra::Vector3;
use rand::Rng;
use rayon::prelude::*;

/// Project the transport function of one surface point.
///
/// Directions below the horizon contribute zero before any ray is cast.
pub fn vertex_transport<S, R>(
    scene: &S,
    position: &Vector3<f32>,
    normal: &Vector3<f32>,
    transport: TransportType,
    sample_count: u32,
    rng: &mut R,
) -> Result<ShVector, SamplingError>
where
    S: Scene + ?Sized,
    R: Rng + ?Sized,
{
    let shadowed = transport.is_shadowed();
    let func = |phi: f64, theta: f64| -> f64 {
        let wi = to_vector(phi, theta).cast::<f32>();
        let h = wi.dot(normal);
        if h < 0.0 {
            return 0.0;
        }
        if shadowed && scene.occluded(&Ray::new(*position, wi)) {
            return 0.0;
        }
        f64::from(h)
    };
    project_function_with_rng(func, sample_count, rng)
}

/// Direct transport for every vertex of the mesh.
///
/// Vertices are independent and processed in parallel; each projection
/// draws from its own thread-local generator.
pub fn direct_transport<S: Scene + ?Sized>(
    scene: &S,
    mesh: &Mesh,
    transport: TransportType,
    sample_count: u32,
) -> Result<TransportCoeffs, SamplingError> {
    // Fail before spawning any work.
    StratifiedSphere::new(sample_count)?;

    let columns = (0..mesh.vertex_count())
        .into_par_iter()
        .map(|v| {
            vertex_transport(
                scene,
                &mesh.position(v),
                &mesh.normal(v),
                transport,
                sample_count,
                &mut rand::thread_rng(),
            )
        })
        .collect::<Result<Vec<ShVector>, _>>()?;

    Ok(TransportCoeffs::from_columns(&columns))
}
