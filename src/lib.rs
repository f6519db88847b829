#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! Converts 16x16x16 chunks of voxel color identifiers into a minimal set of
//! axis-aligned quads, each packed into a single 32-bit word for upload to a renderer.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives
//! * `engine_state` - Voxel storage, the chunk registry and the meshing pipeline
//! * `config` - Startup configuration
//!
//! ## Pipeline
//!
//! 1. Chunks are filled (by hand or by the seeded terrain generator) and registered
//!    in a [`World`]
//! 2. Face visibility is decided per voxel, looking into adjacent chunks at borders
//! 3. The greedy mesher merges visible same-colored faces into maximal rectangles
//! 4. Each rectangle is emitted as a [`PackedQuad`]
//!
//! Meshes are cached on the chunk and only rebuilt after a write to it, a write on the
//! border of a neighbor, or a change in which neighbors are registered.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_mesher::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use cgmath::Point3;
use log::{info, warn};
use web_time::Instant;

pub mod config;
pub mod core;
pub mod engine_state;

pub use config::{ConfigError, EngineConfig};
pub use engine_state::meshing::PackedQuad;
pub use engine_state::voxels::world::World;

use engine_state::voxels::generation::TerrainGenerator;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "RUST_LOG";

/// Totals reported after meshing a generated world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSummary {
    /// Chunks registered in the world.
    pub chunks: usize,
    /// Solid voxels across all chunks.
    pub solid_voxels: usize,
    /// Packed quads across all chunk meshes.
    pub quads: usize,
    /// Size of all meshes as uploaded, in bytes.
    pub bytes: usize,
}

/// Native entry point: sets up logging, loads the config named by the first command
/// line argument (defaults if absent), then generates and meshes a world.
pub fn run() -> Result<MeshSummary, ConfigError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env(LOG_ENV)
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => {
            warn!("No config file given, using defaults");
            EngineConfig::default()
        }
    };

    Ok(run_with_config(&config))
}

/// Generates the world described by `config`, meshes every chunk and reports totals.
pub fn run_with_config(config: &EngineConfig) -> MeshSummary {
    let start = Instant::now();
    let generator = TerrainGenerator::new(config.generation.clone());
    let mut world = World::with_mesh_workers(config.mesh_workers);

    let radius = config.world_radius.max(0);
    for y in 0..config.world_height.max(0) {
        for z in -radius..=radius {
            for x in -radius..=radius {
                world.add_chunk_at(Point3::new(x, y, z), &generator);
            }
        }
    }
    info!(
        "Generated {} chunks ({:?}, seed {}) in {:?}",
        world.len(),
        config.generation.method,
        config.generation.seed,
        start.elapsed()
    );

    world.remesh_dirty();

    let mut summary = MeshSummary {
        chunks: world.len(),
        solid_voxels: 0,
        quads: 0,
        bytes: 0,
    };
    for position in world.chunk_positions() {
        let Some(chunk) = world.get_chunk_at(position) else {
            continue;
        };
        let mesh = chunk.cached_mesh();
        summary.solid_voxels += chunk.solid_count();
        summary.quads += mesh.len();
        summary.bytes += bytemuck::cast_slice::<PackedQuad, u8>(&mesh).len();
    }

    info!(
        "World meshed: {} chunks, {} solid voxels, {} quads ({} bytes) in {:?}",
        summary.chunks,
        summary.solid_voxels,
        summary.quads,
        summary.bytes,
        start.elapsed()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationConfig, GenerationMethod};

    fn config(method: GenerationMethod, radius: i32, height: i32) -> EngineConfig {
        EngineConfig {
            generation: GenerationConfig {
                method,
                seed: 5,
                ..Default::default()
            },
            world_radius: radius,
            world_height: height,
            mesh_workers: 2,
        }
    }

    #[test]
    fn solid_world_is_one_closed_box() {
        // 3x2x3 solid chunks: only the outer shell is drawn, one 16x16 quad per
        // chunk face on the surface
        let summary = run_with_config(&config(GenerationMethod::Solid, 1, 2));
        assert_eq!(summary.chunks, 18);
        let surface_faces = 2 * (3 * 3) + 4 * (3 * 2);
        assert_eq!(summary.quads, surface_faces);
        assert_eq!(summary.bytes, summary.quads * 4);
    }

    #[test]
    fn empty_world_has_no_quads() {
        let summary = run_with_config(&config(GenerationMethod::Empty, 1, 1));
        assert_eq!(summary.chunks, 9);
        assert_eq!(summary.solid_voxels, 0);
        assert_eq!(summary.quads, 0);
    }

    #[test]
    fn terrain_world_produces_geometry() {
        let summary = run_with_config(&config(GenerationMethod::Perlin, 1, 2));
        assert!(summary.solid_voxels > 0);
        assert!(summary.quads > 0);
        assert!(summary.quads < summary.solid_voxels * 6);
    }
}
