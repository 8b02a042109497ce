//! Runtime evaluation of precomputed radiance transfer.
//!
//! No visibility or transport is computed here - see the `precompute`
//! module for that. Shading only reads the stored coefficients.

pub mod radiance;

// Re-export
pub use radiance::PrtShader;
