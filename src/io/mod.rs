//! I/O operations for loading inputs and saving coefficients.
//!
//! This module handles all file formats:
//! - Cubemap face images (JPEG/PNG/HDR/EXR)
//! - OBJ meshes
//! - Plain-text lighting and transport coefficients

mod coeffs;
mod cubemap;
mod obj;

// Re-export public types and functions
pub use coeffs::{
    read_light_coeffs, read_transport_coeffs, write_light_coeffs, write_transport_coeffs,
    TransportFile,
};
pub use cubemap::{load_cubemap, load_cubemap_with, Cubemap, LoadError, FACE_NAMES};
pub use obj::load_obj_mesh;
