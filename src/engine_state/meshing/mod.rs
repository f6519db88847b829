//! Chunk meshing: voxel colors in, packed quads out.
//!
//! # Architecture
//! - [`visibility`]: decides per voxel face whether it borders empty space, looking
//!   into adjacent chunks at chunk boundaries
//! - [`greedy`]: merges visible same-colored faces slice by slice into maximal
//!   rectangles
//! - [`packed_quad`]: the 32-bit quad format handed to the renderer
//!
//! # Usage
//! ```
//! use cgmath::Point3;
//! use voxel_mesher::engine_state::{
//!     meshing::{greedy_mesh, Neighbors},
//!     voxels::{chunk::Chunk, voxel::voxel_color::VoxelColor},
//! };
//!
//! let chunk = Chunk::solid(&Point3::new(0, 0, 0), VoxelColor::GRAY);
//! let quads = greedy_mesh(&chunk, &Neighbors::none());
//! assert_eq!(quads.len(), 6);
//! let bytes: &[u8] = bytemuck::cast_slice(&quads);
//! assert_eq!(bytes.len(), 24);
//! ```

pub mod greedy;
pub mod packed_quad;
pub mod visibility;

pub use greedy::greedy_mesh;
pub use packed_quad::PackedQuad;
pub use visibility::{FaceVisibility, Neighbors};
