//! # Voxel Engine Core
//!
//! This module contains the voxel data the mesher consumes.
//!
//! ## Architecture
//!
//! * **Voxel**: color identifiers, the named palette and the six face directions
//! * **Chunk**: fixed-size 3D arrays of voxels with a cached mesh
//! * **World**: the registry mapping chunk coordinates to chunks, used for
//!   cross-chunk face visibility
//! * **Generation**: seeded procedural filling of chunks
//!
//! ## Data Flow
//!
//! 1. World receives requests for voxel access or modification
//! 2. World delegates to the owning chunk, dirtying neighbors on boundary writes
//! 3. Mesh requests rebuild only dirty chunks, reading neighbors for boundary faces
//!
//! ## Thread Safety
//!
//! Chunks are registered behind reader-writer handles. Meshing takes read locks on a
//! chunk and its neighbors, and the result is stored under a short write lock on the
//! meshed chunk alone.

pub mod chunk;
pub mod generation;
pub mod voxel;
pub mod world;
