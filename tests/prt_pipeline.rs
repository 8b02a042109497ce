//! End-to-end precompute and shading scenarios
//!
//! - A lone triangle under a uniform white sky shades to a constant π
//! - A receiver sealed inside a box is black when shadowed, and picks up
//!   light from the box walls once inter-reflection is enabled

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use prt_rs::config::{PrtConfig, TransportType};
use prt_rs::core::{Mesh, Ray, Scene, TriangleScene, SH_COEFF_LENGTH};
use prt_rs::io::Cubemap;
use prt_rs::precompute::{direct_transport, interreflection_pass, precompute};
use prt_rs::render::PrtShader;
use std::f32::consts::PI;

fn lone_triangle() -> Mesh {
    Mesh::with_face_normals(
        vec![
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2]],
    )
}

/// Small upward-facing receiver (vertices 0..3) inside a closed [-1, 1]^3
/// box (vertices 3..11) with outward-facing walls.
fn receiver_in_box() -> Mesh {
    let mut positions = vec![
        Vector3::new(-0.2, -0.2, 0.0),
        Vector3::new(0.2, -0.2, 0.0),
        Vector3::new(0.0, 0.2, 0.0),
    ];
    let mut triangles = vec![[0u32, 1, 2]];

    let base = positions.len() as u32;
    for i in 0..8 {
        let coord = |bit: u32| if i & bit != 0 { 1.0 } else { -1.0 };
        positions.push(Vector3::new(coord(1), coord(2), coord(4)));
    }

    // Each wall as corner bit-masks in cyclic order, with its outward normal
    let walls: [([u32; 4], Vector3<f32>); 6] = [
        ([0, 2, 6, 4], Vector3::new(-1.0, 0.0, 0.0)),
        ([1, 3, 7, 5], Vector3::new(1.0, 0.0, 0.0)),
        ([0, 1, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
        ([2, 3, 7, 6], Vector3::new(0.0, 1.0, 0.0)),
        ([0, 1, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        ([4, 5, 7, 6], Vector3::new(0.0, 0.0, 1.0)),
    ];
    for (quad, outward) in walls {
        let [a, b, c, d] = quad.map(|q| base + q);
        let p = |v: u32| positions[v as usize];
        let n = (p(b) - p(a)).cross(&(p(c) - p(a)));
        if n.dot(&outward) > 0.0 {
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        } else {
            triangles.push([a, c, b]);
            triangles.push([a, d, c]);
        }
    }

    Mesh::with_face_normals(positions, triangles)
}

#[test]
fn test_lone_triangle_under_white_sky() {
    let mesh = lone_triangle();
    let scene = TriangleScene::new(&mesh);
    let cube = Cubemap::uniform(16, [1.0, 1.0, 1.0]).unwrap();
    let config = PrtConfig::new("unused").with_sample_count(10_000);

    let data = precompute(&scene, &mesh, &cube, &config).unwrap();

    // Lighting: DC only
    let dc = 2.0 * PI.sqrt();
    assert_abs_diff_eq!(data.light.coefficient(0).x, dc, epsilon = 1e-3);
    for i in 1..SH_COEFF_LENGTH {
        assert_abs_diff_eq!(data.light.coefficient(i).x, 0.0, epsilon = 1e-3);
    }

    // Transport: every vertex sees the same clamped cosine
    for v in 0..mesh.vertex_count() {
        let column = data.transport.column(v);
        assert_abs_diff_eq!(column[0], PI.sqrt() / 2.0, epsilon = 0.02);
    }

    // Irradiance of a white sky on an open plane is π everywhere
    let shader = PrtShader::new(&scene, &data.light, &data.transport);
    let samples = [(0.0, 0.0), (-0.5, -0.5), (0.5, -0.5), (0.0, 0.5)];
    for (x, y) in samples {
        let ray = Ray::new(Vector3::new(x, y, 2.0), Vector3::new(0.0, 0.0, -1.0));
        let c = shader.radiance(&ray);
        assert_abs_diff_eq!(c.x, PI, epsilon = 0.05);
        assert_abs_diff_eq!(c.y, c.x, epsilon = 1e-6);
        assert_abs_diff_eq!(c.z, c.x, epsilon = 1e-6);
    }

    // Away from the mesh there is nothing to shade
    let miss = Ray::new(Vector3::new(5.0, 5.0, 2.0), Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(shader.radiance(&miss), Vector3::zeros());
}

#[test]
fn test_sealed_receiver_is_black_when_shadowed() {
    let mesh = receiver_in_box();
    let scene = TriangleScene::new(&mesh);

    let direct = direct_transport(&scene, &mesh, TransportType::Shadowed, 100).unwrap();
    for v in 0..3 {
        assert!(direct.is_zero(v), "receiver vertex {v} should be fully occluded");
    }
    for v in 3..mesh.vertex_count() {
        assert!(!direct.is_zero(v), "box corner {v} faces the sky");
    }

    // Unshadowed transport ignores the box
    let open = direct_transport(&scene, &mesh, TransportType::Unshadowed, 100).unwrap();
    assert!(!open.is_zero(0));
}

#[test]
fn test_interreflection_lights_sealed_receiver() {
    let mesh = receiver_in_box();
    let scene = TriangleScene::new(&mesh);

    let direct = direct_transport(&scene, &mesh, TransportType::Interreflection, 400).unwrap();
    let bounce = interreflection_pass(&scene, &mesh, &direct, 400).unwrap();
    assert_eq!(bounce.vertices, vec![0, 1, 2]);

    let mut combined = direct.clone();
    bounce.apply(&mut combined);

    // Revisited vertices gain light from the walls
    for v in 0..3 {
        assert!(combined.column(v)[0] > 0.0, "receiver vertex {v} gathered nothing");
    }
    // Everything else is bit-identical
    for v in 3..mesh.vertex_count() {
        assert_eq!(combined.column(v), direct.column(v));
    }
}

#[test]
fn test_full_interreflection_precompute() {
    let mesh = receiver_in_box();
    let scene = TriangleScene::new(&mesh);
    let cube = Cubemap::uniform(8, [1.0, 1.0, 1.0]).unwrap();
    let config = PrtConfig::new("unused")
        .with_sample_count(100)
        .with_transport(TransportType::Interreflection)
        .with_bounce_count(3);

    let data = precompute(&scene, &mesh, &cube, &config).unwrap();
    assert_eq!(data.transport.vertex_count(), mesh.vertex_count());
    for v in 0..3 {
        assert!(!data.transport.is_zero(v));
    }

    // The receiver shades brighter than black from the inside
    let shader = PrtShader::new(&scene, &data.light, &data.transport);
    let ray = Ray::new(Vector3::new(0.0, 0.0, 0.5), Vector3::new(0.0, 0.0, -1.0));
    let hit = scene.intersect(&ray).unwrap();
    assert_eq!(hit.triangle, 0);
    assert!(shader.shade_hit(&hit).x > 0.0);
}

#[test]
fn test_precompute_rejects_zero_samples() {
    let mesh = lone_triangle();
    let scene = TriangleScene::new(&mesh);
    let cube = Cubemap::uniform(4, [1.0, 1.0, 1.0]).unwrap();
    let config = PrtConfig::new("unused").with_sample_count(0);

    assert!(precompute(&scene, &mesh, &cube, &config).is_err());
}
