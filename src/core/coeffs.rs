//! Lighting and transport coefficient containers.
//!
//! Both sides of the PRT dot product use the same coefficient layout
//! (see [`crate::core::sh`]), which is what makes them multipliable per color
//! channel.

use crate::core::sampling::ShVector;
use crate::core::sh::SH_COEFF_LENGTH;
use nalgebra::{DMatrix, Matrix3, SMatrix, SVector, Vector3};

/// Per-vertex transport coefficients, stored single precision.
pub type TransportVector = SVector<f32, SH_COEFF_LENGTH>;

/// Environment lighting projected onto SH: one row per color channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightCoeffs {
    matrix: SMatrix<f32, 3, SH_COEFF_LENGTH>,
}

impl LightCoeffs {
    pub fn zeros() -> Self {
        Self {
            matrix: SMatrix::zeros(),
        }
    }

    /// Build from per-coefficient RGB values, in coefficient index order.
    pub fn from_rgb(coeffs: &[Vector3<f32>; SH_COEFF_LENGTH]) -> Self {
        let mut light = Self::zeros();
        for (i, c) in coeffs.iter().enumerate() {
            light.set_coefficient(i, *c);
        }
        light
    }

    pub fn from_matrix(matrix: SMatrix<f32, 3, SH_COEFF_LENGTH>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &SMatrix<f32, 3, SH_COEFF_LENGTH> {
        &self.matrix
    }

    /// RGB value of one coefficient.
    pub fn coefficient(&self, index: usize) -> Vector3<f32> {
        self.matrix.column(index).into_owned()
    }

    pub fn set_coefficient(&mut self, index: usize, rgb: Vector3<f32>) {
        self.matrix.set_column(index, &rgb);
    }

    /// All coefficients of one color channel (0 = R, 1 = G, 2 = B).
    pub fn channel(&self, channel: usize) -> TransportVector {
        self.matrix.row(channel).transpose()
    }

    /// Outgoing radiance for a transport vector: one dot product per channel.
    pub fn shade(&self, transport: &TransportVector) -> Vector3<f32> {
        self.matrix * transport
    }

    /// Pack each channel's nine coefficients into a column-major 3×3 matrix,
    /// the layout shaders receive as `mat3` uniforms.
    pub fn channel_matrices(&self) -> [Matrix3<f32>; 3] {
        [0, 1, 2].map(|c| Matrix3::from_column_slice(self.channel(c).as_slice()))
    }
}

/// Transport coefficients for every vertex: one column per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportCoeffs {
    matrix: DMatrix<f32>,
}

impl TransportCoeffs {
    pub fn zeros(vertex_count: usize) -> Self {
        Self {
            matrix: DMatrix::zeros(SH_COEFF_LENGTH, vertex_count),
        }
    }

    /// Assemble from per-vertex columns computed in double precision.
    pub fn from_columns(columns: &[ShVector]) -> Self {
        let mut coeffs = Self::zeros(columns.len());
        for (v, col) in columns.iter().enumerate() {
            coeffs.set_column(v, &col.cast::<f32>());
        }
        coeffs
    }

    pub fn vertex_count(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<f32> {
        &self.matrix
    }

    pub fn column(&self, vertex: usize) -> TransportVector {
        self.matrix.fixed_view::<SH_COEFF_LENGTH, 1>(0, vertex).into_owned()
    }

    pub fn set_column(&mut self, vertex: usize, column: &TransportVector) {
        self.matrix.set_column(vertex, column);
    }

    /// Add `delta` into a vertex's column.
    pub fn add_to_column(&mut self, vertex: usize, delta: &TransportVector) {
        let mut col = self.matrix.column_mut(vertex);
        col += delta;
    }

    /// True when every coefficient of the vertex is exactly zero.
    pub fn is_zero(&self, vertex: usize) -> bool {
        self.matrix.column(vertex).iter().all(|&c| c == 0.0)
    }

    /// Barycentric blend of three vertex columns.
    pub fn interpolate(&self, vertices: [usize; 3], barycentric: &Vector3<f32>) -> TransportVector {
        self.column(vertices[0]) * barycentric.x
            + self.column(vertices[1]) * barycentric.y
            + self.column(vertices[2]) * barycentric.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shade_is_per_channel_dot() {
        let mut light = LightCoeffs::zeros();
        light.set_coefficient(0, Vector3::new(1.0, 2.0, 3.0));
        light.set_coefficient(4, Vector3::new(0.5, 0.0, -1.0));

        let mut t = TransportVector::zeros();
        t[0] = 2.0;
        t[4] = 4.0;

        assert_relative_eq!(light.shade(&t), Vector3::new(4.0, 4.0, 2.0));
        assert_relative_eq!(light.channel(2)[4], -1.0);
    }

    #[test]
    fn test_channel_matrices_are_column_major() {
        let mut light = LightCoeffs::zeros();
        for i in 0..SH_COEFF_LENGTH {
            light.set_coefficient(i, Vector3::new(i as f32, 10.0 + i as f32, 20.0 + i as f32));
        }
        let [r, g, _b] = light.channel_matrices();
        assert_eq!(r[(0, 0)], 0.0);
        assert_eq!(r[(1, 0)], 1.0);
        assert_eq!(r[(0, 1)], 3.0);
        assert_eq!(g[(2, 2)], 18.0);
    }

    #[test]
    fn test_interpolate_and_zero_detection() {
        let mut coeffs = TransportCoeffs::zeros(3);
        coeffs.set_column(0, &TransportVector::repeat(1.0));
        coeffs.set_column(1, &TransportVector::repeat(3.0));
        assert!(!coeffs.is_zero(0));
        assert!(coeffs.is_zero(2));

        let blended = coeffs.interpolate([0, 1, 2], &Vector3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(blended, TransportVector::repeat(2.0));

        coeffs.add_to_column(2, &TransportVector::repeat(0.25));
        assert_relative_eq!(coeffs.column(2), TransportVector::repeat(0.25));
    }
}
