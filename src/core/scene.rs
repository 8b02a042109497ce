//! Rays and scene intersection.
//!
//! The precompute and the runtime evaluator only need two queries from a
//! scene: "is anything hit" for shadow rays, and "what was hit" (triangle
//! corners plus barycentric weights) for gathering and shading. Anything that
//! answers them can implement [`Scene`]; [`TriangleScene`] is a brute-force
//! implementation over a single [`Mesh`].

use crate::core::mesh::Mesh;
use nalgebra::Vector3;

/// Offset applied to ray starts so a ray leaving a surface point does not
/// immediately re-hit the triangles that share it.
pub const RAY_EPSILON: f32 = 1e-4;

/// A half-open ray segment `origin + t * direction`, `t` in `[t_min, t_max]`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    /// Ray starting just past `origin` and extending to infinity.
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction,
            t_min: RAY_EPSILON,
            t_max: f32::INFINITY,
        }
    }

    pub fn at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Closest intersection of a ray with the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    /// Distance along the ray
    pub t: f32,

    /// Index of the hit triangle
    pub triangle: usize,

    /// Vertex indices of the hit triangle's corners
    pub vertices: [usize; 3],

    /// Barycentric weights of the corners (non-negative, sum to 1)
    pub barycentric: Vector3<f32>,
}

/// Scene intersection interface consumed by the precompute and the evaluator.
pub trait Scene: Send + Sync {
    /// Nearest hit along the ray, if any.
    fn intersect(&self, ray: &Ray) -> Option<SceneHit>;

    /// Whether the ray hits anything at all.
    fn occluded(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }
}

/// Brute-force intersection against every triangle of a mesh.
#[derive(Debug, Clone, Copy)]
pub struct TriangleScene<'a> {
    mesh: &'a Mesh,
}

impl<'a> TriangleScene<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self { mesh }
    }

    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }
}

impl Scene for TriangleScene<'_> {
    fn intersect(&self, ray: &Ray) -> Option<SceneHit> {
        let mut best: Option<SceneHit> = None;
        let mut t_max = ray.t_max;

        for tri in 0..self.mesh.triangle_count() {
            let [v0, v1, v2] = self.mesh.triangle_positions(tri);
            let Some((t, u, v)) = intersect_triangle(ray, v0, v1, v2) else {
                continue;
            };
            if t < ray.t_min || t > t_max {
                continue;
            }
            t_max = t;
            best = Some(SceneHit {
                t,
                triangle: tri,
                vertices: self.mesh.triangle(tri),
                barycentric: Vector3::new(1.0 - u - v, u, v),
            });
        }

        best
    }

    fn occluded(&self, ray: &Ray) -> bool {
        (0..self.mesh.triangle_count()).any(|tri| {
            let [v0, v1, v2] = self.mesh.triangle_positions(tri);
            matches!(
                intersect_triangle(ray, v0, v1, v2),
                Some((t, _, _)) if t >= ray.t_min && t <= ray.t_max
            )
        })
    }
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns `(t, u, v)` where `u` and `v` are the barycentric weights of `v1`
/// and `v2`. Both faces of the triangle are hit.
pub fn intersect_triangle(
    ray: &Ray,
    v0: Vector3<f32>,
    v1: Vector3<f32>,
    v2: Vector3<f32>,
) -> Option<(f32, f32, f32)> {
    const EPSILON: f32 = 1e-8;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    Some((t, u, v))
}
