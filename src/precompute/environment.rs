//! Environment lighting projection.
//!
//! Every cubemap texel is treated as a small patch of the sphere: its center
//! gives the direction, and its exact solid angle gives the integration
//! weight. Texels near face corners subtend much less solid angle than
//! texels at face centers, so a uniform weight would over-count the corners.
//!
//! Solid angle of a texel spanning `[x0, x1] × [y0, y1]` on the face plane at
//! distance 1:
//! ```text
//! A(x, y) = atan2(x·y, sqrt(x² + y² + 1))
//! Ω       = A(x0, y0) − A(x0, y1) − A(x1, y0) + A(x1, y1)
//! ```

use crate::core::sh::{eval_sh, sh_index, SH_COEFF_LENGTH, SH_ORDER};
use crate::core::LightCoeffs;
use crate::io::Cubemap;
use nalgebra::{SMatrix, Vector3};
use rayon::prelude::*;

/// Face basis `(dirX, dirY, dirZ)` for each face slot.
///
/// Slots follow the face load order of [`crate::io::FACE_NAMES`]; the table
/// pairs them as negx, posx, negy, posy, negz, posz, so the Y and Z faces
/// are swapped relative to the file names.
pub const FACE_BASES: [[[f64; 3]; 3]; 6] = [
    [[0.0, 0.0, 1.0], [0.0, -1.0, 0.0], [-1.0, 0.0, 0.0]],
    [[0.0, 0.0, 1.0], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
    [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
    [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
];

fn axis(a: [f64; 3]) -> Vector3<f64> {
    Vector3::new(a[0], a[1], a[2])
}

/// Texel-center coordinate in [-1, 1).
fn texel_coord(i: u32, size: u32) -> f64 {
    2.0 * ((f64::from(i) + 0.5) / f64::from(size)) - 1.0
}

/// Outward unit direction through the center of texel (x, y) of a face.
pub fn texel_direction(face: usize, x: u32, y: u32, width: u32, height: u32) -> Vector3<f64> {
    let [dx, dy, dz] = FACE_BASES[face].map(axis);
    let u = texel_coord(x, width);
    let v = texel_coord(y, height);
    // dz has unit length and is orthogonal to dx/dy, so this never vanishes
    (dx * u + dy * v + dz).normalize()
}

fn area_element(x: f64, y: f64) -> f64 {
    (x * y).atan2((x * x + y * y + 1.0).sqrt())
}

/// Exact solid angle subtended by texel (x, y) of a `width × height` face.
pub fn texel_solid_angle(x: u32, y: u32, width: u32, height: u32) -> f64 {
    let u = texel_coord(x, width);
    let v = texel_coord(y, height);
    let half_w = 1.0 / f64::from(width);
    let half_h = 1.0 / f64::from(height);

    let x0 = u - half_w;
    let y0 = v - half_h;
    let x1 = u + half_w;
    let y1 = v + half_h;

    area_element(x0, y0) - area_element(x0, y1) - area_element(x1, y0) + area_element(x1, y1)
}

type RgbCoeffs = SMatrix<f64, 3, SH_COEFF_LENGTH>;

fn project_face(cubemap: &Cubemap, face: usize) -> RgbCoeffs {
    let (width, height) = (cubemap.width(), cubemap.height());
    let mut acc = RgbCoeffs::zeros();

    for y in 0..height {
        for x in 0..width {
            let dir = texel_direction(face, x, y, width, height);
            let weight = texel_solid_angle(x, y, width, height);
            let [r, g, b] = cubemap.texel(face, x, y);
            let radiance = Vector3::new(f64::from(r), f64::from(g), f64::from(b));

            for l in 0..=SH_ORDER {
                let l_i = l as i32;
                for m in -l_i..=l_i {
                    let idx = sh_index(l, m);
                    let basis = eval_sh(l, m, &dir) * weight;
                    let mut column = acc.column_mut(idx);
                    column += radiance * basis;
                }
            }
        }
    }

    acc
}

/// Project cubemap radiance onto the SH basis.
///
/// Faces are integrated in parallel and their partial sums are added in
/// face order, so identical input always gives bit-identical output.
pub fn precompute_environment_sh(cubemap: &Cubemap) -> LightCoeffs {
    let partials: Vec<RgbCoeffs> = (0..6)
        .into_par_iter()
        .map(|face| project_face(cubemap, face))
        .collect();

    let total = partials
        .iter()
        .fold(RgbCoeffs::zeros(), |acc, partial| acc + partial);

    log::debug!(
        "Environment DC term: ({:.4}, {:.4}, {:.4})",
        total[(0, 0)],
        total[(1, 0)],
        total[(2, 0)]
    );

    LightCoeffs::from_matrix(total.cast::<f32>())
}
