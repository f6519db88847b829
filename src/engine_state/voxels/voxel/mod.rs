//! # Voxel Module
//!
//! This module provides the per-voxel data used by chunks and the mesher.
//! A voxel is nothing more than a color identifier; the named palette and the six
//! face directions live in the submodules.

pub mod voxel_color;
pub mod voxel_face;

/// The underlying integer type used to store a voxel's color in a chunk.
///
/// `0` is reserved for empty space, every other value is a solid material.
pub type ColorId = u8;

/// The color identifier of an empty (air) voxel.
pub const EMPTY: ColorId = 0;

/// Returns `true` if the color identifier denotes a solid voxel.
#[inline]
pub fn is_solid(color: ColorId) -> bool {
    color != EMPTY
}
