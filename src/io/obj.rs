//! OBJ mesh import.
//!
//! All models in the file are merged into one [`Mesh`]. Faces are
//! triangulated on load and positions/normals share a single index buffer.
//! Files without `vn` records get area-weighted face normals.

use crate::core::Mesh;
use crate::io::LoadError;
use nalgebra::Vector3;
use std::path::Path;

/// Load an OBJ file into a single mesh.
pub fn load_obj_mesh(path: &Path) -> Result<Mesh, LoadError> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path, &options)?;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut triangles = Vec::new();
    let mut all_have_normals = true;

    for model in &models {
        let mesh = &model.mesh;
        let offset = positions.len() as u32;
        let count = mesh.positions.len() / 3;

        positions.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vector3::new(p[0], p[1], p[2])),
        );

        if mesh.normals.len() == mesh.positions.len() {
            normals.extend(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| Vector3::new(n[0], n[1], n[2])),
            );
        } else {
            all_have_normals = false;
            normals.extend(std::iter::repeat(Vector3::zeros()).take(count));
        }

        if mesh.indices.len() % 3 != 0 {
            return Err(LoadError::InvalidFormat(format!(
                "model '{}' has {} indices, not a multiple of 3",
                model.name,
                mesh.indices.len()
            )));
        }
        triangles.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
    }

    if triangles
        .iter()
        .flatten()
        .any(|&i| i as usize >= positions.len())
    {
        return Err(LoadError::InvalidFormat(format!(
            "{} references a vertex out of range",
            path.display()
        )));
    }

    log::info!(
        "Loaded mesh {}: {} vertices, {} triangles",
        path.display(),
        positions.len(),
        triangles.len()
    );

    if all_have_normals {
        Ok(Mesh::new(positions, normals, triangles))
    } else {
        log::debug!("{} has no vertex normals; using face normals", path.display());
        Ok(Mesh::with_face_normals(positions, triangles))
    }
}
