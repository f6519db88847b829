//! # Chunk Creation Module
//!
//! This module provides a builder that fills a chunk one voxel at a time in storage
//! order (x fastest, then y, then z), keeping the color array and the solidity bit
//! vector in sync as it goes.
//!
//! Generators that sweep the whole chunk use this instead of calling
//! [`Chunk::set_voxel`] per cell, which would bump the revision counter 4096 times.

use bitvec::vec::BitVec;
use cgmath::Point3;

use crate::engine_state::voxels::voxel::{is_solid, ColorId, EMPTY};

use super::{Chunk, CHUNK_SIZE};

/// A builder for populating a chunk sequentially.
pub struct ChunkCreationIterator {
    /// The chunk coordinates of the chunk being created
    position: Point3<i32>,
    /// Colors pushed so far; unpushed cells stay empty
    voxels: Box<[ColorId; CHUNK_SIZE]>,
    /// One bit per pushed cell, set when the pushed color is solid
    solid_array: BitVec,
    /// Storage index the next pushed color lands at
    cursor: usize,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    pub fn new(position: Point3<i32>) -> Self {
        ChunkCreationIterator {
            position,
            voxels: Box::new([EMPTY; CHUNK_SIZE]),
            solid_array: BitVec::with_capacity(CHUNK_SIZE),
            cursor: 0,
        }
    }

    /// Number of cells still to be pushed before the chunk is full.
    pub fn remaining(&self) -> usize {
        CHUNK_SIZE - self.cursor
    }

    /// Stores a color at the current position and advances to the next one.
    ///
    /// Pushes past the last cell are ignored.
    pub fn push_color(&mut self, color: ColorId) {
        if self.cursor >= CHUNK_SIZE {
            return;
        }
        self.voxels[self.cursor] = color;
        self.solid_array.push(is_solid(color));
        self.cursor += 1;
    }

    /// Finalizes the chunk. Cells that were never pushed are empty.
    ///
    /// The returned chunk is dirty, so its first mesh request runs the mesher.
    pub fn return_chunk(mut self) -> Chunk {
        self.solid_array.resize(CHUNK_SIZE, false);

        let mut chunk = Chunk::new(self.position);
        chunk.voxels = self.voxels;
        chunk.solid_array = self.solid_array;
        chunk
    }
}
