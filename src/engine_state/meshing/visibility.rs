//! Face visibility, including lookups across chunk boundaries.
//!
//! A face is visible when the cell directly in front of it is empty. Inside a chunk
//! that is a plain array read. When the cell in front lies past the chunk edge, the
//! adjacent chunk in that direction is consulted at the opposite edge:
//!
//! - stepping to `16` on an axis samples the neighbor's `0`
//! - stepping to `-1` on an axis samples the neighbor's `15`
//!
//! A missing neighbor counts as open space, so the outer shell of the loaded world is
//! always drawn while faces between two loaded chunks are not.

use cgmath::Point3;

use crate::engine_state::voxels::{
    chunk::{Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
    voxel::{is_solid, voxel_face::VoxelFace},
};

/// Borrowed views of the up to six chunks sharing a face with the chunk being meshed.
///
/// Indexed by [`VoxelFace`]: the entry for `RIGHT` is the chunk at `position + (1,0,0)`.
/// The view only lives for one meshing call; chunks never hold on to their neighbors.
#[derive(Clone, Copy, Default)]
pub struct Neighbors<'a> {
    chunks: [Option<&'a Chunk>; 6],
}

impl<'a> Neighbors<'a> {
    /// No neighbors: every chunk boundary faces open space.
    pub fn none() -> Self {
        Neighbors { chunks: [None; 6] }
    }

    /// Builds the view from an array indexed by [`VoxelFace`] discriminant.
    pub fn new(chunks: [Option<&'a Chunk>; 6]) -> Self {
        Neighbors { chunks }
    }

    /// Returns a copy with the neighbor behind `face` replaced.
    pub fn with(mut self, face: VoxelFace, chunk: &'a Chunk) -> Self {
        self.chunks[face as usize] = Some(chunk);
        self
    }

    /// The neighbor behind `face`, if it is loaded.
    #[inline]
    pub fn get(&self, face: VoxelFace) -> Option<&'a Chunk> {
        self.chunks[face as usize]
    }

    /// Number of loaded neighbors.
    pub fn count(&self) -> usize {
        self.chunks.iter().flatten().count()
    }

    /// One bit per loaded neighbor, bit `n` for the face with discriminant `n`.
    pub fn mask(&self) -> u8 {
        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.is_some())
            .fold(0, |mask, (face, _)| mask | (1 << face))
    }
}

/// Answers "should this face be drawn" for the voxels of one chunk.
pub struct FaceVisibility<'a> {
    chunk: &'a Chunk,
    neighbors: &'a Neighbors<'a>,
}

impl<'a> FaceVisibility<'a> {
    /// Tests faces of `chunk`, sampling `neighbors` past its edges.
    pub fn new(chunk: &'a Chunk, neighbors: &'a Neighbors<'a>) -> Self {
        FaceVisibility { chunk, neighbors }
    }

    /// The chunk whose faces are being tested.
    #[inline]
    pub fn chunk(&self) -> &'a Chunk {
        self.chunk
    }

    /// Whether the face of voxel `(x, y, z)` looking along `axis` in `direction`
    /// (`-1` or `+1`) should be emitted.
    ///
    /// Does not look at the voxel itself; the caller skips empty voxels. An `axis`
    /// outside `0..3` names no face and yields `false`.
    pub fn should_render_face(&self, x: i32, y: i32, z: i32, axis: usize, direction: i32) -> bool {
        VoxelFace::from_axis_direction(axis, direction)
            .is_some_and(|face| self.is_face_visible(Point3::new(x, y, z), face))
    }

    /// Whether the cell in front of `face` of the voxel at `position` is empty.
    pub fn is_face_visible(&self, position: Point3<i32>, face: VoxelFace) -> bool {
        let n = position + face.normal();
        if Chunk::in_bounds(n.x, n.y, n.z) {
            return !is_solid(self.chunk.get_voxel(n.x, n.y, n.z));
        }

        match self.neighbors.get(face) {
            Some(neighbor) => !is_solid(neighbor.get_voxel(
                n.x.rem_euclid(CHUNK_WIDTH),
                n.y.rem_euclid(CHUNK_HEIGHT),
                n.z.rem_euclid(CHUNK_DEPTH),
            )),
            None => true,
        }
    }
}
