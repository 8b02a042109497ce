//! # prt-rs: Precomputed Radiance Transfer in Rust
//!
//! This crate precomputes low-order spherical harmonic (SH) lighting and
//! per-vertex light transport so that a diffuse mesh can be shaded under an
//! environment map with a single dot product per color channel.
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - `core`: SH basis, sphere sampling, coefficient containers, meshes and ray queries
//! - `io`: File I/O (cubemap faces, OBJ meshes, coefficient text files)
//! - `config`: Precompute settings (sample count, transport type, paths)
//! - `precompute`: Environment projection, direct transport, inter-reflection
//! - `render`: Runtime evaluation of the stored coefficients
//!
//! ## Pipeline
//!
//! 1. Load a cubemap and project it onto SH (3 × 9 coefficients)
//! 2. For every mesh vertex project its transport function onto SH (9 × V)
//! 3. At render time, blend transport across the hit triangle and dot it
//!    with the lighting

// Core data structures and math
pub mod core;

// I/O operations (cubemaps, OBJ, coefficient files)
pub mod io;

// Precompute settings
pub mod config;

// Offline projection
pub mod precompute;

// Runtime shading
pub mod render;

// Re-export commonly used types at crate root for convenience
pub use config::{PrtConfig, TransportType};
pub use core::{LightCoeffs, Mesh, TransportCoeffs};
pub use io::LoadError;
pub use precompute::{PrecomputeError, PrtData};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
