//! Triangle mesh storage.
//!
//! The precompute only reads vertices by index, so a mesh is plain
//! position/normal arrays plus a triangle index table.

use nalgebra::Vector3;

/// An indexed triangle mesh with per-vertex shading normals.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<Vector3<f32>>,

    /// Per-vertex shading normals (unit length, or zero when degenerate)
    pub normals: Vec<Vector3<f32>>,

    /// Triangle corner indices, in the mesh's local winding order
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Build a mesh, normalizing every supplied normal.
    ///
    /// Zero-length normals are kept as zero vectors rather than producing NaNs.
    pub fn new(
        positions: Vec<Vector3<f32>>,
        normals: Vec<Vector3<f32>>,
        triangles: Vec<[u32; 3]>,
    ) -> Self {
        let normals = normals.into_iter().map(safe_normalize).collect();
        Self {
            positions,
            normals,
            triangles,
        }
    }

    /// Build a mesh whose normals are the area-weighted average of the
    /// adjacent face normals.
    pub fn with_face_normals(positions: Vec<Vector3<f32>>, triangles: Vec<[u32; 3]>) -> Self {
        let mut normals = vec![Vector3::zeros(); positions.len()];
        for tri in &triangles {
            let [a, b, c] = tri.map(|i| positions[i as usize]);
            // Cross product length is twice the area, which gives the weighting.
            let n = (b - a).cross(&(c - a));
            for &i in tri {
                normals[i as usize] += n;
            }
        }
        Self::new(positions, normals, triangles)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn position(&self, vertex: usize) -> Vector3<f32> {
        self.positions[vertex]
    }

    pub fn normal(&self, vertex: usize) -> Vector3<f32> {
        self.normals[vertex]
    }

    /// Corner vertex indices of a triangle.
    pub fn triangle(&self, tri: usize) -> [usize; 3] {
        self.triangles[tri].map(|i| i as usize)
    }

    /// Corner positions of a triangle.
    pub fn triangle_positions(&self, tri: usize) -> [Vector3<f32>; 3] {
        self.triangle(tri).map(|i| self.positions[i])
    }
}

fn safe_normalize(n: Vector3<f32>) -> Vector3<f32> {
    n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_face_normals_follow_winding() {
        let mesh = Mesh::with_face_normals(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        for v in 0..3 {
            assert_relative_eq!(mesh.normal(v), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_normal_stays_zero() {
        let mesh = Mesh::new(
            vec![Vector3::zeros()],
            vec![Vector3::zeros()],
            Vec::new(),
        );
        assert_eq!(mesh.normal(0), Vector3::zeros());
    }
}
