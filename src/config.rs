//! Precompute configuration.
//!
//! A [`PrtConfig`] is built once (from CLI flags, scene-description
//! properties or a JSON file) and passed by reference into the precompute.

use crate::core::color::TransferFunction;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Scene-description property names.
pub const PROP_SAMPLE_COUNT: &str = "PRTSampleCount";
pub const PROP_CUBEMAP: &str = "cubemap";
pub const PROP_TYPE: &str = "type";
pub const PROP_BOUNCE: &str = "bounce";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported type: {0}.")]
    UnsupportedType(String),

    #[error("Invalid sample count {0}: at least 1 sample is required")]
    InvalidSampleCount(i64),

    #[error("Missing required property '{0}'")]
    MissingProperty(&'static str),

    #[error("Invalid value '{value}' for property '{key}'")]
    InvalidProperty { key: &'static str, value: String },

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which transport function is projected per vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TransportType {
    /// Cosine lobe only
    #[default]
    Unshadowed,
    /// Cosine lobe masked by scene visibility
    Shadowed,
    /// Shadowed transport plus one bounce for fully shadowed vertices
    Interreflection,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unshadowed => "unshadowed",
            Self::Shadowed => "shadowed",
            Self::Interreflection => "interreflection",
        }
    }

    /// Whether visibility rays are cast for the direct term.
    pub fn is_shadowed(&self) -> bool {
        !matches!(self, Self::Unshadowed)
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unshadowed" => Ok(Self::Unshadowed),
            "shadowed" => Ok(Self::Shadowed),
            "interreflection" => Ok(Self::Interreflection),
            other => Err(ConfigError::UnsupportedType(other.to_string())),
        }
    }
}

impl TryFrom<String> for TransportType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn default_sample_count() -> u32 {
    100
}

fn default_bounce_count() -> u32 {
    1
}

/// Immutable precompute settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrtConfig {
    /// Total SH projection samples per vertex; `floor(sqrt(n))^2` are drawn
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,

    /// Directory holding the six cubemap faces
    pub cubemap_path: PathBuf,

    /// Transport variant
    #[serde(default, rename = "type")]
    pub transport: TransportType,

    /// Accepted for compatibility; exactly one bounce is computed
    #[serde(default = "default_bounce_count")]
    pub bounce_count: u32,

    /// Where `light.txt` and `transport.txt` go; defaults to the cubemap directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Decoding of 8/16-bit cubemap faces
    #[serde(default)]
    pub ldr_transfer: TransferFunction,
}

impl PrtConfig {
    /// Defaults for everything except the cubemap location.
    pub fn new(cubemap_path: impl Into<PathBuf>) -> Self {
        Self {
            sample_count: default_sample_count(),
            cubemap_path: cubemap_path.into(),
            transport: TransportType::default(),
            bounce_count: default_bounce_count(),
            output_dir: None,
            ldr_transfer: TransferFunction::default(),
        }
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_transport(mut self, transport: TransportType) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_bounce_count(mut self, bounce_count: u32) -> Self {
        self.bounce_count = bounce_count;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_ldr_transfer(mut self, transfer: TransferFunction) -> Self {
        self.ldr_transfer = transfer;
        self
    }

    /// Build from scene-description key/value properties.
    ///
    /// Keys: `PRTSampleCount` (default 100), `cubemap` (required),
    /// `type` (default "unshadowed"), `bounce` (default 1).
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let cubemap = props
            .get(PROP_CUBEMAP)
            .ok_or(ConfigError::MissingProperty(PROP_CUBEMAP))?;
        let mut config = Self::new(cubemap);

        if let Some(value) = props.get(PROP_SAMPLE_COUNT) {
            let n: i64 = parse_property(PROP_SAMPLE_COUNT, value)?;
            config.sample_count =
                u32::try_from(n).map_err(|_| ConfigError::InvalidSampleCount(n))?;
        }
        if let Some(value) = props.get(PROP_TYPE) {
            config.transport = value.parse()?;
        }
        if let Some(value) = props.get(PROP_BOUNCE) {
            config.bounce_count = parse_property(PROP_BOUNCE, value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file such as
    /// `{"cubemap_path": "cubemap/Indoor", "type": "shadowed", "sample_count": 400}`.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would leave the projector without samples.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::InvalidSampleCount(0));
        }
        Ok(())
    }

    /// Directory the coefficient files are written to.
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.cubemap_path)
    }
}

fn parse_property<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidProperty {
        key,
        value: value.to_string(),
    })
}
