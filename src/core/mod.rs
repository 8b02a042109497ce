//! Core data structures and mathematical operations.
//!
//! This module contains the fundamental types used throughout the system:
//! - `sh`: real spherical harmonics basis
//! - `sampling`: stratified sphere sampling and SH projection
//! - `coeffs`: lighting and transport coefficient containers
//! - `rotation`: SH rotation of lighting coefficients
//! - `Mesh`, `Scene`: geometry and ray queries
//!
//! All types here are "pure data" - no I/O, no scheduling.

pub mod coeffs;
pub mod color;
mod mesh;
pub mod rotation;
pub mod sampling;
mod scene;
pub mod sh;

// Re-export public types
pub use coeffs::{LightCoeffs, TransportCoeffs, TransportVector};
pub use mesh::Mesh;
pub use rotation::{rotate_light, RotationError};
pub use sampling::{project_function, SamplingError, ShVector, StratifiedSphere};
pub use scene::{intersect_triangle, Ray, Scene, SceneHit, TriangleScene, RAY_EPSILON};
pub use sh::{eval_sh, sh_basis, SH_COEFF_LENGTH, SH_ORDER};
