//! PRT precomputation.
//!
//! Stages, in order:
//! 1. Project the cubemap environment onto SH (`environment`)
//! 2. Project every vertex's direct transport onto SH (`transport`)
//! 3. For `interreflection`, gather one bounce for fully shadowed vertices
//!    (`interreflection`), strictly after stage 2 has finished
//!
//! Nothing is written to disk until every stage has succeeded.

pub mod environment;
pub mod interreflection;
pub mod transport;

pub use environment::{precompute_environment_sh, texel_direction, texel_solid_angle};
pub use interreflection::{gather_bounce, interreflection_pass, BounceTransport};
pub use transport::{direct_transport, vertex_transport};

use crate::config::{ConfigError, PrtConfig, TransportType};
use crate::core::sampling::SamplingError;
use crate::core::{LightCoeffs, Mesh, Scene, TransportCoeffs, TriangleScene};
use crate::io::{
    load_cubemap_with, write_light_coeffs, write_transport_coeffs, Cubemap, LoadError,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the lighting coefficients.
pub const LIGHT_FILE: &str = "light.txt";

/// File name of the transport coefficients.
pub const TRANSPORT_FILE: &str = "transport.txt";

/// Suffix of the staging files written before the final rename.
const STAGING_SUFFIX: &str = "partial";

#[derive(Debug, Error)]
pub enum PrecomputeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Both halves of the PRT product.
#[derive(Debug, Clone)]
pub struct PrtData {
    pub light: LightCoeffs,
    pub transport: TransportCoeffs,
}

/// Paths of the files written by [`run`].
#[derive(Debug, Clone)]
pub struct PrtOutputs {
    pub light_path: PathBuf,
    pub transport_path: PathBuf,
}

/// Compute lighting and transport coefficients in memory.
pub fn precompute<S: Scene + ?Sized>(
    scene: &S,
    mesh: &Mesh,
    cubemap: &Cubemap,
    config: &PrtConfig,
) -> Result<PrtData, PrecomputeError> {
    config.validate()?;
    if config.bounce_count > 1 {
        log::warn!(
            "bounce count {} requested; only a single bounce is computed",
            config.bounce_count
        );
    }

    log::info!(
        "Projecting {}x{} cubemap onto SH",
        cubemap.width(),
        cubemap.height()
    );
    let light = precompute_environment_sh(cubemap);

    log::info!(
        "Projecting {} transport for {} vertices ({} samples each)",
        config.transport,
        mesh.vertex_count(),
        config.sample_count
    );
    let mut transport = direct_transport(scene, mesh, config.transport, config.sample_count)?;

    if config.transport == TransportType::Interreflection {
        let bounce = interreflection_pass(scene, mesh, &transport, config.sample_count)?;
        bounce.apply(&mut transport);
    }

    Ok(PrtData { light, transport })
}

/// Load the configured cubemap, precompute against the mesh and write
/// `light.txt` and `transport.txt`.
///
/// Both files are staged under temporary names and only renamed into place
/// once both writes have succeeded. On error neither file is left behind.
pub fn run(mesh: &Mesh, config: &PrtConfig) -> Result<(PrtData, PrtOutputs), PrecomputeError> {
    config.validate()?;
    let cubemap = load_cubemap_with(&config.cubemap_path, config.ldr_transfer)?;
    let scene = TriangleScene::new(mesh);

    let data = precompute(&scene, mesh, &cubemap, config)?;

    let out_dir = config.output_dir();
    std::fs::create_dir_all(out_dir).map_err(LoadError::from)?;
    let outputs = PrtOutputs {
        light_path: out_dir.join(LIGHT_FILE),
        transport_path: out_dir.join(TRANSPORT_FILE),
    };
    let light_staged = outputs.light_path.with_extension(STAGING_SUFFIX);
    let transport_staged = outputs.transport_path.with_extension(STAGING_SUFFIX);

    let staged = write_light_coeffs(&data.light, &light_staged)
        .and_then(|()| write_transport_coeffs(mesh, &data.transport, &transport_staged));
    if let Err(e) = staged {
        discard(&[light_staged.as_path(), transport_staged.as_path()]);
        return Err(e.into());
    }

    if let Err(e) = std::fs::rename(&transport_staged, &outputs.transport_path) {
        discard(&[light_staged.as_path(), transport_staged.as_path()]);
        return Err(LoadError::from(e).into());
    }
    if let Err(e) = std::fs::rename(&light_staged, &outputs.light_path) {
        discard(&[light_staged.as_path(), outputs.transport_path.as_path()]);
        return Err(LoadError::from(e).into());
    }

    log::info!(
        "Computed light sh coeffs from {} to {}",
        config.cubemap_path.display(),
        outputs.light_path.display()
    );
    log::info!("Computed transport sh coeffs to {}", outputs.transport_path.display());

    Ok((data, outputs))
}

/// Best-effort removal of output files after a failed write.
fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
}
