//! # Chunk Iteration Module
//!
//! This module provides an iterator over the solid voxels of a chunk. It walks the
//! set bits of the chunk's solidity bit vector, so runs of empty cells are skipped
//! without reading the color array.

use bitvec::{order::Lsb0, slice::IterOnes};
use cgmath::Point3;

use crate::engine_state::voxels::voxel::ColorId;

use super::Chunk;

/// An iterator over all solid voxels in a chunk, yielding `(position, color)` in
/// storage order.
pub struct ChunkVoxelIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Indices of the set bits in the chunk's solid array
    solid_indices: IterOnes<'a, usize, Lsb0>,
}

impl<'a> ChunkVoxelIterator<'a> {
    /// Creates a new `ChunkVoxelIterator` positioned before the first solid voxel.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkVoxelIterator {
            chunk_ref,
            solid_indices: chunk_ref.solid_array.iter_ones(),
        }
    }
}

impl Iterator for ChunkVoxelIterator<'_> {
    type Item = (Point3<usize>, ColorId);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.solid_indices.next()?;
        Some((Chunk::position_of(index), self.chunk_ref.voxels[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_only_solid_voxels_in_storage_order() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set_voxel(15, 15, 15, 8);
        chunk.set_voxel(3, 0, 0, 2);
        chunk.set_voxel(0, 1, 0, 6);

        let voxels: Vec<_> = chunk.solid_voxels().collect();
        assert_eq!(
            voxels,
            vec![
                (Point3::new(3, 0, 0), 2),
                (Point3::new(0, 1, 0), 6),
                (Point3::new(15, 15, 15), 8),
            ]
        );
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let chunk = Chunk::new(Point3::new(0, 0, 0));
        assert_eq!(chunk.solid_voxels().count(), 0);
    }
}
