//! # Engine State Module
//!
//! ## Key Components
//!
//! * `voxels` - Voxel data, chunks, the chunk registry and world generation
//! * `meshing` - Face visibility, greedy meshing and the packed quad format
//!
//! Data flows one way: chunks (and, at their borders, their registered neighbors) are
//! read by the mesher, which produces a sequence of packed quads cached on the chunk.

pub mod meshing;
pub mod voxels;
