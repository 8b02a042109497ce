//! prt-precompute: Project a cubemap and a mesh's transport onto SH
//!
//! Usage:
//!   prt-precompute --mesh scene.obj --cubemap cubemap/Indoor --type shadowed --samples 400
//!   prt-precompute --mesh scene.obj --config prt.json --out build/

use anyhow::{anyhow, bail, Context, Result};
use prt_rs::config::{PrtConfig, TransportType};
use prt_rs::core::color::TransferFunction;
use prt_rs::io::load_obj_mesh;
use prt_rs::precompute;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("prt-precompute v{}", prt_rs::VERSION);

    // Parse command-line arguments
    let mut args = std::env::args().skip(1);
    let mut mesh_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut cubemap_path: Option<PathBuf> = None;
    let mut sample_count: Option<u32> = None;
    let mut transport: Option<TransportType> = None;
    let mut bounce_count: Option<u32> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut ldr_transfer: Option<TransferFunction> = None;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| anyhow!("Missing {flag} argument"));
        match arg.as_str() {
            "--mesh" => mesh_path = Some(PathBuf::from(value("--mesh")?)),
            "--config" => config_path = Some(PathBuf::from(value("--config")?)),
            "--cubemap" => cubemap_path = Some(PathBuf::from(value("--cubemap")?)),
            "--samples" => {
                let raw = value("--samples")?;
                sample_count = Some(
                    raw.parse()
                        .with_context(|| format!("Invalid sample count '{raw}'"))?,
                );
            }
            "--type" => transport = Some(value("--type")?.parse()?),
            "--bounce" => {
                let raw = value("--bounce")?;
                bounce_count = Some(
                    raw.parse()
                        .with_context(|| format!("Invalid bounce count '{raw}'"))?,
                );
            }
            "--out" => out_dir = Some(PathBuf::from(value("--out")?)),
            "--ldr-transfer" => {
                let raw = value("--ldr-transfer")?;
                ldr_transfer = Some(raw.parse::<TransferFunction>().map_err(|e| anyhow!(e))?);
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                print_help();
                bail!("Unknown argument: {other}");
            }
        }
    }

    let mesh_path = mesh_path.ok_or_else(|| anyhow!("Missing --mesh argument"))?;

    // Config file first, then flags on top
    let mut config = match (&config_path, cubemap_path) {
        (Some(path), cubemap) => {
            let mut config = PrtConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            if let Some(cubemap) = cubemap {
                config.cubemap_path = cubemap;
            }
            config
        }
        (None, Some(cubemap)) => PrtConfig::new(cubemap),
        (None, None) => bail!("Must specify either --cubemap or --config"),
    };
    if let Some(n) = sample_count {
        config = config.with_sample_count(n);
    }
    if let Some(t) = transport {
        config = config.with_transport(t);
    }
    if let Some(b) = bounce_count {
        config = config.with_bounce_count(b);
    }
    if let Some(dir) = out_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(transfer) = ldr_transfer {
        config = config.with_ldr_transfer(transfer);
    }
    config.validate()?;

    let mesh = load_obj_mesh(&mesh_path)
        .with_context(|| format!("Failed to load mesh {}", mesh_path.display()))?;

    let start = Instant::now();
    let (_, outputs) = precompute::run(&mesh, &config)?;
    log::info!(
        "Done in {:.2}s: {} and {}",
        start.elapsed().as_secs_f64(),
        outputs.light_path.display(),
        outputs.transport_path.display()
    );

    Ok(())
}

fn print_help() {
    println!(
        r#"prt-precompute v{}

Precompute SH lighting and per-vertex transport.

USAGE:
  prt-precompute --mesh <OBJ> (--cubemap <DIR> | --config <JSON>) [OPTIONS]

OPTIONS:
  --mesh <PATH>       Triangle mesh (OBJ)
  --cubemap <DIR>     Directory with negx/posx/posy/negy/posz/negz faces
  --config <PATH>     JSON config (flags override its values)
  --samples <N>       SH projection samples per vertex (default: 100)
  --type <TYPE>       unshadowed | shadowed | interreflection (default: unshadowed)
  --bounce <N>        Bounce count (only 1 is computed)
  --out <DIR>         Output directory (default: the cubemap directory)
  --ldr-transfer <T>  gamma | srgb decoding of 8-bit faces (default: gamma)
  -h, --help          Print this help

Set RUST_LOG=debug for per-face cubemap details."#,
        prt_rs::VERSION
    );
}
