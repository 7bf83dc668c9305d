//! Bake configuration and material fill types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::util::{Error, Result};

/// Default number of hemisphere samples per vertex.
pub const DEFAULT_SAMPLE_COUNT: u32 = 500;

/// Default index of refraction of the transparent material.
pub const DEFAULT_IOR: f64 = 1.45;

/// Tunables of the SH bake that may vary per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Hammersley directions per vertex.
    pub sample_count: u32,
    /// Index of refraction of the solid.
    pub ior: f64,
    /// Emit a progress event every this many vertices (0 disables).
    pub progress_interval: usize,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            ior: DEFAULT_IOR,
            progress_interval: 100,
        }
    }
}

impl BakeConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the tracer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 {
            return Err(Error::other("sample_count must be positive"));
        }
        if !(self.ior.is_finite() && self.ior > 0.0) {
            return Err(Error::other(format!("ior must be a positive number, got {}", self.ior)));
        }
        Ok(())
    }
}

/// Material classification selecting the refraction depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillType {
    /// Opaque-through solid: one refraction on the far wall.
    Solid,
    /// Double-walled shell: entry, internal and exit refraction.
    Hollow,
}

impl FillType {
    /// Number of refraction bounces traced for this material.
    #[inline]
    pub fn bounce_count(self) -> u32 {
        match self {
            FillType::Solid => 1,
            FillType::Hollow => 3,
        }
    }
}

impl fmt::Display for FillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillType::Solid => f.write_str("solid"),
            FillType::Hollow => f.write_str("hollow"),
        }
    }
}

impl FromStr for FillType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "solid" => Ok(FillType::Solid),
            "hollow" => Ok(FillType::Hollow),
            other => Err(Error::other(format!("unknown fill type: {other}"))),
        }
    }
}
