//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x16x16 block of voxel color
//! identifiers, plus the cached mesh built from it.
//!
//! ## Storage
//!
//! - `voxels`: one [`ColorId`] per cell, stored x-fastest, then y, then z
//! - `solid_array`: a bit vector (1 bit per cell) mirroring which cells are solid,
//!   used to count and iterate solid voxels without touching the color array
//!
//! ## Mesh Caching
//!
//! Every in-range write marks the chunk dirty. [`Chunk::create_mesh_data`] only runs the
//! greedy mesher when the chunk is dirty and otherwise hands back the cached quads, so an
//! unmutated chunk is never meshed twice.
//!
//! Each write also bumps a revision counter. A mesh computed from an older revision is
//! still cached but leaves the chunk dirty, which keeps a write that races a background
//! remesh from being lost.

use std::sync::Arc;

use bitvec::prelude::BitVec;
use cgmath::Point3;

use crate::engine_state::meshing::{greedy_mesh, Neighbors, PackedQuad};

use super::voxel::{is_solid, voxel_color::VoxelColor, ColorId, EMPTY};
use chunk_creation::ChunkCreationIterator;
use chunk_iteration::ChunkVoxelIterator;

pub mod chunk_creation;
pub mod chunk_iteration;

/// Width of a chunk in voxels (X axis).
pub const CHUNK_WIDTH: i32 = 16;
/// Height of a chunk in voxels (Y axis).
pub const CHUNK_HEIGHT: i32 = 16;
/// Depth of a chunk in voxels (Z axis).
pub const CHUNK_DEPTH: i32 = 16;
/// The extents of a chunk indexed by axis.
pub const CHUNK_DIMENSIONS: [usize; 3] = [
    CHUNK_WIDTH as usize,
    CHUNK_HEIGHT as usize,
    CHUNK_DEPTH as usize,
];
/// The number of voxels in a single XY plane of a chunk.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_WIDTH * CHUNK_HEIGHT) as usize;
/// The total number of voxels in a chunk.
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_DEPTH as usize;

/// Represents a 16x16x16 collection of voxels in the world.
///
/// Chunks are the unit of storage and of meshing. Each chunk knows its position in
/// chunk coordinates, which is the key it is registered under in the
/// [`World`](super::world::World).
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not voxel coordinates).
    position: Point3<i32>,

    /// Color identifier of every cell, see [`Chunk::index`].
    voxels: Box<[ColorId; CHUNK_SIZE]>,

    /// One bit per cell, set when the cell is solid. Same indexing as `voxels`.
    solid_array: BitVec,

    /// Set by every write, cleared once a mesh for the current revision is cached.
    dirty: bool,

    /// Incremented by every write.
    revision: u64,

    /// The most recently computed mesh.
    mesh_data: Arc<[PackedQuad]>,

    /// [`Neighbors::mask`] of the neighbor set `mesh_data` was computed against.
    mesh_neighbors: u8,
}

impl Chunk {
    /// Creates a new, completely empty chunk.
    ///
    /// The chunk starts dirty so the first mesh request always runs the mesher.
    pub fn new(position: Point3<i32>) -> Self {
        let mut solid_array = BitVec::with_capacity(CHUNK_SIZE);
        solid_array.resize(CHUNK_SIZE, false);
        Chunk {
            position,
            voxels: Box::new([EMPTY; CHUNK_SIZE]),
            solid_array,
            dirty: true,
            revision: 0,
            mesh_data: Arc::from(Vec::new()),
            mesh_neighbors: 0,
        }
    }

    /// Creates a new, completely empty chunk.
    pub fn empty(position: &Point3<i32>) -> Self {
        Self::new(*position)
    }

    /// Creates a new chunk filled entirely with one color.
    pub fn solid(position: &Point3<i32>, color: VoxelColor) -> Self {
        let mut cci = ChunkCreationIterator::new(*position);

        for _ in 0..CHUNK_SIZE {
            cci.push_color(color.id());
        }

        cci.return_chunk()
    }

    /// Creates a new chunk with a 3D checkerboard pattern.
    ///
    /// A cell is solid when `x + y + z` is even, so no two solid cells share a face.
    pub fn checkerboard(position: &Point3<i32>, color: VoxelColor) -> Self {
        let mut cci = ChunkCreationIterator::new(*position);

        for z in 0..CHUNK_DEPTH {
            for y in 0..CHUNK_HEIGHT {
                for x in 0..CHUNK_WIDTH {
                    if (x + y + z) % 2 == 0 {
                        cci.push_color(color.id());
                    } else {
                        cci.push_color(EMPTY);
                    }
                }
            }
        }

        cci.return_chunk()
    }

    /// Creates a new chunk with randomly placed, randomly colored voxels.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `seed` - Seed for the random generator; equal seeds give equal chunks
    /// * `sparseness` - Probability in `[0, 1]` that a cell is left empty
    pub fn random(position: &Point3<i32>, seed: u64, sparseness: f64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut cci = ChunkCreationIterator::new(*position);

        for _ in 0..CHUNK_SIZE {
            if rng.f64() < sparseness {
                cci.push_color(EMPTY);
            } else {
                cci.push_color(VoxelColor::get_random_color(&mut rng).id());
            }
        }

        cci.return_chunk()
    }

    /// Whether the local coordinates address a cell of this chunk.
    #[inline]
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_DEPTH).contains(&z)
    }

    /// Linear storage index of an in-bounds cell.
    #[inline]
    pub(crate) fn index(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_WIDTH as usize * y + CHUNK_PLANE_SIZE * z
    }

    /// Inverse of [`Chunk::index`].
    #[inline]
    pub(crate) fn position_of(index: usize) -> Point3<usize> {
        let width = CHUNK_WIDTH as usize;
        Point3::new(
            index % width,
            (index / width) % CHUNK_HEIGHT as usize,
            index / CHUNK_PLANE_SIZE,
        )
    }

    /// Writes a voxel at the given local coordinates and marks the chunk dirty.
    ///
    /// Out-of-range coordinates are ignored; nothing is written and the chunk stays as
    /// it was.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, color: ColorId) {
        if !Self::in_bounds(x, y, z) {
            return;
        }
        let index = Self::index(x as usize, y as usize, z as usize);
        self.voxels[index] = color;
        self.solid_array.set(index, is_solid(color));
        self.mark_dirty();
    }

    /// Reads the voxel at the given local coordinates.
    ///
    /// # Returns
    /// The stored color, or [`EMPTY`] for out-of-range coordinates.
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> ColorId {
        if !Self::in_bounds(x, y, z) {
            return EMPTY;
        }
        self.voxels[Self::index(x as usize, y as usize, z as usize)]
    }

    /// Reads an in-bounds voxel by axis-indexed coordinates.
    ///
    /// # Panics
    /// Panics if any coordinate is outside the chunk.
    #[inline]
    pub(crate) fn voxel_at(&self, pos: [usize; 3]) -> ColorId {
        self.voxels[Self::index(pos[0], pos[1], pos[2])]
    }

    /// Checks if the voxel at the specified local coordinates is solid.
    ///
    /// # Panics
    /// Panics if any coordinate is outside the chunk.
    pub fn is_voxel_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.solid_array[Self::index(x, y, z)]
    }

    /// Number of solid voxels in the chunk.
    pub fn solid_count(&self) -> usize {
        self.solid_array.count_ones()
    }

    /// Whether the chunk contains no solid voxels at all.
    pub fn is_empty(&self) -> bool {
        self.solid_array.not_any()
    }

    /// Iterates over every solid voxel as `(position, color)`, in storage order.
    pub fn solid_voxels(&self) -> ChunkVoxelIterator<'_> {
        ChunkVoxelIterator::new(self)
    }

    /// The position of this chunk in chunk coordinates. Fixed for the chunk's lifetime.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// Whether the cached mesh is out of date.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the cached mesh is up to date and was computed against a neighbor set
    /// with the given [`Neighbors::mask`].
    ///
    /// A mesh built with a boundary open is not valid once a neighbor covers it, and
    /// the other way around.
    pub fn is_mesh_current(&self, neighbor_mask: u8) -> bool {
        !self.dirty && self.mesh_neighbors == neighbor_mask
    }

    /// Forces the next mesh request to rebuild, e.g. after a neighbor changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision = self.revision.wrapping_add(1);
    }

    /// The current write revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The most recently cached mesh, whether or not it is current.
    pub fn cached_mesh(&self) -> Arc<[PackedQuad]> {
        Arc::clone(&self.mesh_data)
    }

    /// Returns the packed quads for this chunk, treating every boundary as open space.
    ///
    /// Runs the greedy mesher only if the chunk changed since the last call; otherwise
    /// the returned `Arc` is the same allocation as last time.
    pub fn create_mesh_data(&mut self) -> Arc<[PackedQuad]> {
        self.create_mesh_data_with(&Neighbors::none())
    }

    /// Returns the packed quads for this chunk, hiding faces against the given
    /// neighbors.
    ///
    /// The cache is reused only if it was built against the same set of present
    /// neighbors.
    pub fn create_mesh_data_with(&mut self, neighbors: &Neighbors<'_>) -> Arc<[PackedQuad]> {
        if self.is_mesh_current(neighbors.mask()) {
            return self.cached_mesh();
        }
        let quads = greedy_mesh(self, neighbors);
        let revision = self.revision;
        self.store_mesh(quads, revision, neighbors.mask())
    }

    /// Caches a mesh computed from the chunk as it was at `revision`, against a
    /// neighbor set with mask `neighbor_mask`.
    ///
    /// The dirty flag is only cleared if no write happened since.
    pub(crate) fn store_mesh(
        &mut self,
        quads: Vec<PackedQuad>,
        revision: u64,
        neighbor_mask: u8,
    ) -> Arc<[PackedQuad]> {
        self.mesh_data = Arc::from(quads);
        self.mesh_neighbors = neighbor_mask;
        if revision == self.revision {
            self.dirty = false;
        }
        self.cached_mesh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::voxel::voxel_face::VoxelFace;

    fn origin() -> Point3<i32> {
        Point3::new(0, 0, 0)
    }

    #[test]
    fn new_chunk_is_empty_and_dirty() {
        let chunk = Chunk::new(origin());
        assert!(chunk.is_empty());
        assert!(chunk.is_dirty());
        assert_eq!(chunk.get_voxel(3, 4, 5), EMPTY);
    }

    #[test]
    fn set_and_get_voxel() {
        let mut chunk = Chunk::new(origin());
        chunk.set_voxel(1, 2, 3, VoxelColor::RED.id());
        assert_eq!(chunk.get_voxel(1, 2, 3), VoxelColor::RED.id());
        assert!(chunk.is_voxel_solid(1, 2, 3));
        assert_eq!(chunk.solid_count(), 1);

        chunk.set_voxel(1, 2, 3, EMPTY);
        assert!(!chunk.is_voxel_solid(1, 2, 3));
        assert!(chunk.is_empty());
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut chunk = Chunk::new(origin());
        chunk.create_mesh_data();
        let revision = chunk.revision();

        chunk.set_voxel(-1, 0, 0, 3);
        chunk.set_voxel(0, 16, 0, 3);
        chunk.set_voxel(0, 0, 99, 3);

        assert!(chunk.is_empty());
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.revision(), revision);
    }

    #[test]
    fn out_of_range_reads_are_empty() {
        let chunk = Chunk::solid(&origin(), VoxelColor::GRAY);
        assert_eq!(chunk.get_voxel(-1, 0, 0), EMPTY);
        assert_eq!(chunk.get_voxel(0, 0, CHUNK_DEPTH), EMPTY);
        assert_eq!(chunk.get_voxel(15, 15, 15), VoxelColor::GRAY.id());
    }

    #[test]
    fn index_and_position_of_agree() {
        for index in [0, 1, 15, 16, 255, 256, 4095] {
            let p = Chunk::position_of(index);
            assert_eq!(Chunk::index(p.x, p.y, p.z), index);
        }
        assert_eq!(Chunk::position_of(CHUNK_SIZE - 1), Point3::new(15, 15, 15));
    }

    #[test]
    fn mesh_is_cached_until_mutation() {
        let mut chunk = Chunk::solid(&origin(), VoxelColor::BLUE);
        let first = chunk.create_mesh_data();
        let second = chunk.create_mesh_data();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!chunk.is_dirty());

        chunk.set_voxel(0, 15, 0, EMPTY);
        assert!(chunk.is_dirty());
        let third = chunk.create_mesh_data();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_ne!(&first[..], &third[..]);
    }

    #[test]
    fn stale_store_keeps_chunk_dirty() {
        let mut chunk = Chunk::new(origin());
        let revision = chunk.revision();
        chunk.set_voxel(0, 0, 0, 1);
        chunk.store_mesh(Vec::new(), revision, 0);
        assert!(chunk.is_dirty());

        let quads = chunk.create_mesh_data();
        assert_eq!(quads.len(), 6);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn cache_is_rebuilt_when_the_neighbor_set_changes() {
        let mut chunk = Chunk::solid(&origin(), VoxelColor::GRAY);
        let right = Chunk::solid(&Point3::new(1, 0, 0), VoxelColor::GRAY);

        let open = chunk.create_mesh_data();
        assert_eq!(open.len(), 6);
        assert!(chunk.is_mesh_current(0));

        let neighbors = Neighbors::none().with(VoxelFace::RIGHT, &right);
        assert!(!chunk.is_mesh_current(neighbors.mask()));
        let covered = chunk.create_mesh_data_with(&neighbors);
        assert_eq!(covered.len(), 5);
        assert!(Arc::ptr_eq(&covered, &chunk.create_mesh_data_with(&neighbors)));

        let reopened = chunk.create_mesh_data();
        assert_eq!(reopened.len(), 6);
    }

    #[test]
    fn checkerboard_has_no_shared_faces() {
        let mut chunk = Chunk::checkerboard(&origin(), VoxelColor::WHITE);
        assert_eq!(chunk.solid_count(), CHUNK_SIZE / 2);
        let quads = chunk.create_mesh_data();
        assert_eq!(quads.len(), chunk.solid_count() * VoxelFace::all().len());
    }

    #[test]
    fn random_chunks_are_reproducible() {
        let a = Chunk::random(&origin(), 42, 0.7);
        let b = Chunk::random(&origin(), 42, 0.7);
        let a_voxels: Vec<_> = a.solid_voxels().collect();
        let b_voxels: Vec<_> = b.solid_voxels().collect();
        assert_eq!(a_voxels, b_voxels);
        assert!(!a_voxels.is_empty());
    }
}
