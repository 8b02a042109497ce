//! Plain-text persistence of PRT coefficients.
//!
//! Lighting (`light.txt`), one line per SH coefficient, in index order:
//! ```text
//! r g b
//! ```
//!
//! Transport (`transport.txt`): the vertex count, then three lines per
//! triangle (one per corner, in the triangle's own winding order), each
//! holding every SH coefficient of that corner's vertex:
//! ```text
//! <vertex count>
//! c0 c1 ... c8      # triangle 0, corner 0
//! c0 c1 ... c8      # triangle 0, corner 1
//! c0 c1 ... c8      # triangle 0, corner 2
//! ...
//! ```

use crate::core::{LightCoeffs, Mesh, TransportCoeffs, TransportVector, SH_COEFF_LENGTH};
use crate::io::LoadError;
use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Transport file contents: coefficients per triangle corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFile {
    /// Vertex count recorded in the header
    pub vertex_count: usize,

    /// One row per triangle corner, three consecutive rows per triangle
    pub corners: Vec<TransportVector>,
}

impl TransportFile {
    pub fn triangle_count(&self) -> usize {
        self.corners.len() / 3
    }

    /// The three corner rows of a triangle.
    pub fn triangle(&self, tri: usize) -> &[TransportVector] {
        &self.corners[tri * 3..tri * 3 + 3]
    }
}

/// Write lighting coefficients as `r g b` lines.
pub fn write_light_coeffs(light: &LightCoeffs, path: &Path) -> Result<(), LoadError> {
    let mut file = BufWriter::new(File::create(path)?);
    for i in 0..SH_COEFF_LENGTH {
        let c = light.coefficient(i);
        writeln!(file, "{} {} {}", c.x, c.y, c.z)?;
    }
    file.flush()?;
    Ok(())
}

/// Write transport coefficients expanded per triangle corner.
pub fn write_transport_coeffs(
    mesh: &Mesh,
    transport: &TransportCoeffs,
    path: &Path,
) -> Result<(), LoadError> {
    if transport.vertex_count() != mesh.vertex_count() {
        return Err(LoadError::InvalidFormat(format!(
            "transport has {} vertices but mesh has {}",
            transport.vertex_count(),
            mesh.vertex_count()
        )));
    }

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{}", mesh.vertex_count())?;
    for tri in 0..mesh.triangle_count() {
        for vertex in mesh.triangle(tri) {
            let column = transport.column(vertex);
            let line: Vec<String> = column.iter().map(|c| c.to_string()).collect();
            writeln!(file, "{}", line.join(" "))?;
        }
    }
    file.flush()?;
    Ok(())
}

/// Read a lighting file written by [`write_light_coeffs`].
pub fn read_light_coeffs(path: &Path) -> Result<LightCoeffs, LoadError> {
    let reader = BufReader::new(File::open(path)?);
    let mut light = LightCoeffs::zeros();
    let mut count = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if count == SH_COEFF_LENGTH {
            return Err(LoadError::InvalidFormat(format!(
                "{}: more than {SH_COEFF_LENGTH} coefficient lines",
                path.display()
            )));
        }
        let values = parse_floats(&line, 3)?;
        light.set_coefficient(count, Vector3::new(values[0], values[1], values[2]));
        count += 1;
    }

    if count != SH_COEFF_LENGTH {
        return Err(LoadError::InvalidFormat(format!(
            "{}: expected {SH_COEFF_LENGTH} coefficient lines, found {count}",
            path.display()
        )));
    }
    Ok(light)
}

/// Read a transport file written by [`write_transport_coeffs`].
pub fn read_transport_coeffs(path: &Path) -> Result<TransportFile, LoadError> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or_else(|| LoadError::InvalidFormat(format!("{}: empty file", path.display())))??;
    let vertex_count = header.trim().parse::<usize>().map_err(|e| {
        LoadError::InvalidFormat(format!("{}: bad vertex count '{header}': {e}", path.display()))
    })?;

    let mut corners = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let values = parse_floats(&line, SH_COEFF_LENGTH)?;
        corners.push(TransportVector::from_column_slice(&values));
    }

    if corners.len() % 3 != 0 {
        return Err(LoadError::InvalidFormat(format!(
            "{}: {} corner rows is not a whole number of triangles",
            path.display(),
            corners.len()
        )));
    }

    Ok(TransportFile {
        vertex_count,
        corners,
    })
}

fn parse_floats(line: &str, expected: usize) -> Result<Vec<f32>, LoadError> {
    let values = line
        .split_whitespace()
        .map(|s| {
            s.parse::<f32>()
                .map_err(|e| LoadError::InvalidFormat(format!("bad number '{s}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != expected {
        return Err(LoadError::InvalidFormat(format!(
            "expected {expected} values per line, found {}",
            values.len()
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_floats_rejects_wrong_arity() {
        assert!(parse_floats("1 2", 3).is_err());
        assert!(parse_floats("1 x 3", 3).is_err());
        assert_eq!(parse_floats(" 1  2 3 ", 3).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_light_file_needs_every_coefficient() {
        let path = std::env::temp_dir()
            .join(format!("prt_rs_short_light_{}.txt", std::process::id()));
        std::fs::write(&path, "1 2 3\n4 5 6\n").unwrap();
        assert!(matches!(read_light_coeffs(&path), Err(LoadError::InvalidFormat(_))));
        std::fs::remove_file(&path).ok();
    }
}
