//! # Generation Module
//!
//! Fills chunks procedurally. The seed travels in [`GenerationConfig`], so two
//! generators built from equal configs produce identical chunks and nothing depends on
//! process-wide state.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use crate::config::{GenerationConfig, GenerationMethod};

use super::chunk::{
    chunk_creation::ChunkCreationIterator, Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH,
};
use super::voxel::{voxel_color::VoxelColor, ColorId, EMPTY};

/// Depth of the dirt layer below the surface voxel.
const DIRT_DEPTH: i32 = 3;

/// Generates chunk contents from a [`GenerationConfig`].
pub struct TerrainGenerator {
    config: GenerationConfig,
    perlin: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator; the Perlin source is seeded from `config.seed`.
    pub fn new(config: GenerationConfig) -> Self {
        let perlin = Perlin::new(config.seed);
        TerrainGenerator { config, perlin }
    }

    /// The configuration this generator was built from.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Produces the chunk at `position` with the configured method.
    pub fn generate(&self, position: &Point3<i32>) -> Chunk {
        match self.config.method {
            GenerationMethod::Perlin => self.perlin(position),
            GenerationMethod::Checkerboard => Chunk::checkerboard(position, VoxelColor::GRAY),
            GenerationMethod::Solid => Chunk::solid(position, VoxelColor::BROWN),
            GenerationMethod::Empty => Chunk::empty(position),
            GenerationMethod::Random => Chunk::random(
                position,
                chunk_seed(self.config.seed, position),
                self.config.sparseness,
            ),
        }
    }

    /// Generates a heightmap terrain chunk from 2D Perlin noise.
    ///
    /// Each column is solid up to its surface height; the top voxel is grass (sand in
    /// low areas, snow on peaks), followed by a few voxels of dirt, then stone. World
    /// `y = 0` is bedrock.
    pub fn perlin(&self, position: &Point3<i32>) -> Chunk {
        let mut surfaces = [[0i32; CHUNK_WIDTH as usize]; CHUNK_DEPTH as usize];
        for (k, row) in surfaces.iter_mut().enumerate() {
            for (i, surface) in row.iter_mut().enumerate() {
                let wx = i as i32 + CHUNK_WIDTH * position.x;
                let wz = k as i32 + CHUNK_DEPTH * position.z;
                *surface = self.surface_height(wx, wz);
            }
        }

        let mut cci = ChunkCreationIterator::new(*position);
        for k in 0..CHUNK_DEPTH {
            for j in 0..CHUNK_HEIGHT {
                for i in 0..CHUNK_WIDTH {
                    let wy = j + CHUNK_HEIGHT * position.y;
                    let surface = surfaces[k as usize][i as usize];
                    cci.push_color(self.terrain_color(wy, surface));
                }
            }
        }

        cci.return_chunk()
    }

    /// World height of the first empty voxel above the terrain column at `(wx, wz)`.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let sample = self
            .perlin
            .get([wx as f64 * self.config.scale, wz as f64 * self.config.scale]);
        (self.config.base_height + sample * self.config.amplitude).floor() as i32
    }

    fn terrain_color(&self, wy: i32, surface: i32) -> ColorId {
        if wy < 0 || wy >= surface {
            return EMPTY;
        }
        if wy == 0 {
            return VoxelColor::BLACK.id();
        }

        let color = if wy == surface - 1 {
            let relative = (surface as f64 - self.config.base_height) / self.config.amplitude;
            if relative > 0.6 {
                VoxelColor::WHITE
            } else if relative < -0.4 {
                VoxelColor::YELLOW
            } else {
                VoxelColor::GREEN
            }
        } else if wy >= surface - 1 - DIRT_DEPTH {
            VoxelColor::BROWN
        } else {
            VoxelColor::GRAY
        };
        color.id()
    }
}

/// Derives a per-chunk seed so random chunks differ between positions but stay
/// reproducible for a given world seed.
fn chunk_seed(seed: u32, position: &Point3<i32>) -> u64 {
    let mut hash = seed as u64 ^ 0x9E37_79B9_7F4A_7C15;
    for coord in [position.x, position.y, position.z] {
        hash ^= coord as u32 as u64;
        hash = hash.wrapping_mul(0x0100_0000_01B3);
        hash ^= hash >> 29;
    }
    hash
}
