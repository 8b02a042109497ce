//! Runtime PRT shading.
//!
//! Shading a ray costs one scene intersection plus a 3×9 matrix-vector
//! product: the hit triangle's transport vectors are blended
//! barycentrically and dotted against each color channel of the lighting.

use crate::core::{LightCoeffs, Ray, Scene, SceneHit, TransportCoeffs};
use nalgebra::Vector3;

/// Evaluates outgoing radiance from precomputed coefficients.
pub struct PrtShader<'a, S: Scene + ?Sized> {
    scene: &'a S,
    light: &'a LightCoeffs,
    transport: &'a TransportCoeffs,
}

impl<'a, S: Scene + ?Sized> PrtShader<'a, S> {
    pub fn new(scene: &'a S, light: &'a LightCoeffs, transport: &'a TransportCoeffs) -> Self {
        Self {
            scene,
            light,
            transport,
        }
    }

    /// Radiance along a ray; black when nothing is hit.
    pub fn radiance(&self, ray: &Ray) -> Vector3<f32> {
        match self.scene.intersect(ray) {
            Some(hit) => self.shade_hit(&hit),
            None => Vector3::zeros(),
        }
    }

    /// Radiance at a known hit.
    pub fn shade_hit(&self, hit: &SceneHit) -> Vector3<f32> {
        let transport = self.transport.interpolate(hit.vertices, &hit.barycentric);
        self.light.shade(&transport)
    }
}
