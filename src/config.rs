//! # Configuration
//!
//! Engine settings loaded once at startup from a JSON file. Every field has a default,
//! so a partial file (or none at all) is valid.
//!
//! ```json
//! {
//!     "generation": { "method": "perlin", "seed": 1337, "scale": 0.03 },
//!     "world_radius": 2,
//!     "world_height": 2,
//!     "mesh_workers": 0
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`EngineConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How new chunks are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    /// Perlin noise heightmap terrain.
    #[default]
    Perlin,
    /// Alternating solid and empty voxels.
    Checkerboard,
    /// Every voxel solid.
    Solid,
    /// Every voxel empty.
    Empty,
    /// Randomly placed voxels of random colors.
    Random,
}

/// Settings for the terrain generator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Which generator fills new chunks.
    pub method: GenerationMethod,
    /// Seed for every random source used by the generator.
    pub seed: u32,
    /// Scaling applied to world coordinates before sampling noise.
    pub scale: f64,
    /// Terrain height, in voxels, where the noise samples zero.
    pub base_height: f64,
    /// Terrain height variation, in voxels, at noise samples of +-1.
    pub amplitude: f64,
    /// Probability that a cell is left empty by the `random` method.
    pub sparseness: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            method: GenerationMethod::default(),
            seed: 0,
            scale: 0.02,
            base_height: 16.0,
            amplitude: 10.0,
            sparseness: 0.9,
        }
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Terrain generator settings.
    pub generation: GenerationConfig,
    /// Chunks generated in each direction from the origin along X and Z.
    pub world_radius: i32,
    /// Number of chunk layers generated upward from `y = 0`.
    pub world_height: i32,
    /// Threads used for batch remeshing; `0` uses all available cores.
    pub mesh_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            generation: GenerationConfig::default(),
            world_radius: 2,
            world_height: 2,
            mesh_workers: 0,
        }
    }
}

impl EngineConfig {
    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parses a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").expect("valid config");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let config = EngineConfig::from_json_str(
            r#"{ "generation": { "method": "checkerboard", "seed": 9 }, "mesh_workers": 3 }"#,
        )
        .expect("valid config");
        assert_eq!(config.generation.method, GenerationMethod::Checkerboard);
        assert_eq!(config.generation.seed, 9);
        assert_eq!(config.generation.scale, GenerationConfig::default().scale);
        assert_eq!(config.mesh_workers, 3);
        assert_eq!(config.world_radius, EngineConfig::default().world_radius);
    }

    #[test]
    fn unknown_method_is_a_parse_error() {
        let err = EngineConfig::from_json_str(r#"{ "generation": { "method": "caves" } }"#)
            .expect_err("unknown method");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/definitely/not/here.json").expect_err("missing file");
        match err {
            ConfigError::Io { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
