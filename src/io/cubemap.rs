//! Cubemap face loading.
//!
//! A cubemap directory holds six images, one per face:
//! ```text
//! cubemap/
//!   negx.jpg
//!   posx.jpg
//!   posy.jpg
//!   negy.jpg
//!   posz.jpg
//!   negz.jpg
//! ```
//! Any format the `image` crate decodes is accepted (`.hdr`/`.exr` faces are
//! used as linear radiance, 8/16-bit faces are decoded with a
//! [`TransferFunction`], gamma 2.2 unless asked otherwise). All faces must
//! share the same resolution.

use crate::core::color::TransferFunction;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading input data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Missing cubemap face: {}", .0.display())]
    MissingFace(PathBuf),

    /// Face shape differs from the first face, as (width, height, channels)
    #[error(
        "Mismatched resolution for cubemap face {face}: expected {expected:?}, found {found:?}"
    )]
    FaceMismatch {
        face: &'static str,
        expected: (u32, u32, u8),
        found: (u32, u32, u8),
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Failed to load OBJ mesh: {0}")]
    Obj(#[from] tobj::LoadError),
}

/// File stems of the six faces, in load order.
pub const FACE_NAMES: [&str; 6] = ["negx", "posx", "posy", "negy", "posz", "negz"];

/// Extensions probed for each face, in preference order.
const FACE_EXTENSIONS: [&str; 5] = ["jpg", "png", "hdr", "exr", "jpeg"];

/// Six equally sized faces of linear RGB radiance.
#[derive(Debug, Clone)]
pub struct Cubemap {
    width: u32,
    height: u32,
    /// Row-major RGB triples, one buffer per face in [`FACE_NAMES`] order
    faces: [Vec<f32>; 6],
}

impl Cubemap {
    /// Build a cubemap from in-memory RGB buffers.
    pub fn from_faces(width: u32, height: u32, faces: [Vec<f32>; 6]) -> Result<Self, LoadError> {
        if width == 0 || height == 0 {
            return Err(LoadError::InvalidFormat(format!(
                "cubemap faces must be non-empty, got {width}x{height}"
            )));
        }
        let expected = (width as usize) * (height as usize) * 3;
        for (face, data) in FACE_NAMES.iter().zip(faces.iter()) {
            if data.len() != expected {
                return Err(LoadError::InvalidFormat(format!(
                    "face {face} holds {} floats, expected {expected}",
                    data.len()
                )));
            }
        }
        Ok(Self {
            width,
            height,
            faces,
        })
    }

    /// A cubemap where every texel has the same radiance.
    pub fn uniform(size: u32, rgb: [f32; 3]) -> Result<Self, LoadError> {
        let texels = (size as usize) * (size as usize);
        let face: Vec<f32> = std::iter::repeat(rgb).take(texels).flatten().collect();
        Self::from_faces(size, size, std::array::from_fn(|_| face.clone()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB buffer of one face.
    pub fn face(&self, face: usize) -> &[f32] {
        &self.faces[face]
    }

    /// Radiance of texel (x, y) on a face.
    pub fn texel(&self, face: usize, x: u32, y: u32) -> [f32; 3] {
        let idx = texel_index(self.width, x, y);
        let data = &self.faces[face];
        [data[idx], data[idx + 1], data[idx + 2]]
    }
}

/// Offset of texel (x, y) in a row-major RGB buffer.
fn texel_index(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 3
}

/// Load the six faces of a cubemap directory, gamma-decoding LDR faces.
pub fn load_cubemap(dir: &Path) -> Result<Cubemap, LoadError> {
    load_cubemap_with(dir, TransferFunction::default())
}

/// Load the six faces of a cubemap directory.
///
/// Fails on the first missing or undecodable face, or on any face whose
/// resolution or channel count differs from `negx`.
pub fn load_cubemap_with(dir: &Path, transfer: TransferFunction) -> Result<Cubemap, LoadError> {
    let mut faces: [Vec<f32>; 6] = Default::default();
    let mut shape: Option<(u32, u32, u8)> = None;

    for (i, name) in FACE_NAMES.iter().enumerate() {
        let path = find_face(dir, name)?;
        let img = image::open(&path).map_err(|source| LoadError::Image {
            path: path.clone(),
            source,
        })?;

        let found = (img.width(), img.height(), img.color().channel_count());
        match shape {
            None => shape = Some(found),
            Some(expected) if expected != found => {
                return Err(LoadError::FaceMismatch {
                    face: *name,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }

        log::debug!("Loaded cubemap face {} ({}x{})", path.display(), found.0, found.1);
        faces[i] = linear_rgb(img, transfer);
    }

    let (width, height, _) = shape.ok_or_else(|| LoadError::InvalidFormat("empty cubemap".into()))?;
    Cubemap::from_faces(width, height, faces)
}

fn find_face(dir: &Path, name: &str) -> Result<PathBuf, LoadError> {
    FACE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| LoadError::MissingFace(dir.join(format!("{name}.jpg"))))
}

fn linear_rgb(img: DynamicImage, transfer: TransferFunction) -> Vec<f32> {
    let is_float = matches!(
        img,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    );
    let mut data = img.into_rgb32f().into_raw();
    if !is_float {
        transfer.decode_in_place(&mut data);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_cubemap_texels() {
        let cube = Cubemap::uniform(4, [0.5, 1.0, 2.0]).unwrap();
        assert_eq!(cube.width(), 4);
        assert_eq!(cube.face(5).len(), 4 * 4 * 3);
        assert_eq!(cube.texel(3, 2, 1), [0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_uniform_rejects_empty_faces() {
        assert!(matches!(
            Cubemap::uniform(0, [1.0, 1.0, 1.0]),
            Err(LoadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_texel_index_does_not_wrap() {
        // Last texel of a 40000x40000 face lies past u32::MAX
        assert_eq!(texel_index(40_000, 39_999, 39_999), 4_799_999_997);
        assert_eq!(texel_index(4, 1, 2), 27);

        let cube = Cubemap::uniform(3, [0.25, 0.5, 0.75]).unwrap();
        assert_eq!(cube.texel(5, 2, 2), [0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_from_faces_rejects_wrong_size() {
        let mut faces: [Vec<f32>; 6] = std::array::from_fn(|_| vec![0.0; 2 * 2 * 3]);
        faces[4].pop();
        let err = Cubemap::from_faces(2, 2, faces).unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_directory_reports_face() {
        let dir = std::env::temp_dir().join("prt_rs_no_such_cubemap");
        let err = load_cubemap(&dir).unwrap_err();
        match err {
            LoadError::MissingFace(path) => assert!(path.ends_with("negx.jpg")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
