//! # World Module
//!
//! This module provides the `World` struct, the registry mapping chunk coordinates to
//! chunks. Besides storage it is what makes meshing seamless across chunk borders: when
//! a chunk is meshed the world hands the mesher read-only views of the six adjacent
//! chunks, so faces between two loaded chunks are culled while the outer surface of the
//! loaded region is still drawn.
//!
//! ## Invalidation
//!
//! A chunk's mesh depends on the boundary cells of its neighbors, so the world dirties
//! neighbors when needed:
//! - registering or removing a chunk dirties its six neighbors
//! - a voxel write on a chunk's edge dirties the chunk across that edge
//!
//! A cached mesh is also stale when the set of registered neighbors differs from the
//! one it was computed against; see [`Chunk::is_mesh_current`].
//!
//! ## Locking
//!
//! Chunks are stored as [`MtResource`] handles and only the world writes to them.
//! Computing a mesh takes read locks on the chunk and its neighbors, always in
//! ascending `(x, y, z)` chunk order, and holds them until the mesh is built. Every
//! write takes a single chunk's write lock and holds no other lock meanwhile. A chain
//! of threads waiting on each other therefore always climbs that order and ends.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, RwLockReadGuard};
use std::thread;

use cgmath::Point3;
use log::{debug, info, warn};
use web_time::Instant;

use crate::core::MtResource;
use crate::engine_state::meshing::{greedy_mesh, Neighbors, PackedQuad};

use super::chunk::{Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};
use super::generation::TerrainGenerator;
use super::voxel::{voxel_face::VoxelFace, ColorId, EMPTY};

/// A mesh computed off-lock, waiting to be stored into its chunk.
struct ComputedMesh {
    chunk: MtResource<Chunk>,
    quads: Vec<PackedQuad>,
    revision: u64,
    neighbor_mask: u8,
}

/// A voxel world composed of chunks.
///
/// The world is a sparse 3D grid of 16x16x16 chunks; only registered chunks exist,
/// everything else reads as empty space.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_mesher::engine_state::voxels::{chunk::Chunk, world::World};
///
/// let mut world = World::new();
/// assert!(world.add_chunk(Chunk::new(Point3::new(0, 0, 0))));
/// world.set_voxel(Point3::new(3, 4, 5), 2);
/// let quads = world.create_mesh_data(Point3::new(0, 0, 0)).unwrap();
/// assert_eq!(quads.len(), 6);
/// ```
pub struct World {
    /// Registered chunks by chunk coordinate. At most one chunk per coordinate.
    chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
    /// Threads used by [`World::remesh_dirty`]; `0` means all available cores.
    mesh_workers: usize,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
            mesh_workers: 0,
        }
    }

    /// Creates a new, empty world that remeshes with the given number of threads.
    pub fn with_mesh_workers(mesh_workers: usize) -> Self {
        World {
            chunks: HashMap::new(),
            mesh_workers,
        }
    }

    /// Number of registered chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is registered.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates of every registered chunk, in no particular order.
    pub fn chunk_positions(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        self.chunks.keys().copied()
    }

    /// Whether a chunk is registered at `position`.
    pub fn contains_chunk(&self, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Registers a chunk under its own `position`.
    ///
    /// # Returns
    /// `false` if another chunk already occupies that coordinate; the new chunk is
    /// dropped and the registered one is left untouched.
    pub fn add_chunk(&mut self, chunk: Chunk) -> bool {
        let position = chunk.position();
        if self.chunks.contains_key(&position) {
            warn!("Refusing to register a second chunk at {:?}", position);
            return false;
        }

        self.chunks.insert(position, MtResource::new(chunk));
        self.mark_neighbors_dirty(position);
        true
    }

    /// Generates and registers a chunk at `position` unless one already exists.
    pub fn add_chunk_at(&mut self, position: Point3<i32>, generator: &TerrainGenerator) {
        if self.chunks.contains_key(&position) {
            return;
        }
        self.add_chunk(generator.generate(&position));
    }

    /// Unregisters the chunk at `position`.
    ///
    /// # Returns
    /// The removed chunk's handle, if one was registered.
    pub fn remove_chunk(&mut self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        let removed = self.chunks.remove(&position)?;
        self.mark_neighbors_dirty(position);
        Some(removed)
    }

    /// Read access to the chunk at the specified chunk coordinates.
    ///
    /// Writes go through [`World::set_voxel`] so neighbors are invalidated. Do not
    /// call other `World` methods that write while holding the guard.
    pub fn get_chunk_at(&self, position: Point3<i32>) -> Option<RwLockReadGuard<'_, Chunk>> {
        self.chunks.get(&position).map(MtResource::get)
    }

    /// Splits a world voxel coordinate into chunk coordinate and local coordinate.
    pub fn world_to_chunk(world_position: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
        let chunk = Point3::new(
            world_position.x.div_euclid(CHUNK_WIDTH),
            world_position.y.div_euclid(CHUNK_HEIGHT),
            world_position.z.div_euclid(CHUNK_DEPTH),
        );
        let local = Point3::new(
            world_position.x.rem_euclid(CHUNK_WIDTH),
            world_position.y.rem_euclid(CHUNK_HEIGHT),
            world_position.z.rem_euclid(CHUNK_DEPTH),
        );
        (chunk, local)
    }

    /// Reads a voxel by world coordinate; unregistered space is [`EMPTY`].
    pub fn get_voxel(&self, world_position: Point3<i32>) -> ColorId {
        let (chunk_position, local) = Self::world_to_chunk(world_position);
        match self.chunks.get(&chunk_position) {
            Some(chunk) => chunk.get().get_voxel(local.x, local.y, local.z),
            None => EMPTY,
        }
    }

    /// Writes a voxel by world coordinate.
    ///
    /// Writes on a chunk edge also dirty the chunk across that edge, since its
    /// boundary faces may appear or disappear.
    ///
    /// # Returns
    /// `false` if no chunk is registered there; nothing is written.
    pub fn set_voxel(&self, world_position: Point3<i32>, color: ColorId) -> bool {
        let (chunk_position, local) = Self::world_to_chunk(world_position);
        let Some(chunk) = self.chunks.get(&chunk_position) else {
            return false;
        };
        chunk.get_mut().set_voxel(local.x, local.y, local.z, color);

        for face in VoxelFace::all() {
            let edge = if face.is_positive() {
                [CHUNK_WIDTH, CHUNK_HEIGHT, CHUNK_DEPTH][face.axis()] - 1
            } else {
                0
            };
            if local[face.axis()] == edge {
                if let Some(neighbor) = self.chunks.get(&(chunk_position + face.normal())) {
                    neighbor.get_mut().mark_dirty();
                }
            }
        }
        true
    }

    /// Returns the packed quads of the chunk at `position`, remeshing it against its
    /// registered neighbors if the cached mesh is stale.
    ///
    /// # Returns
    /// `None` if no chunk is registered there.
    pub fn create_mesh_data(&self, position: Point3<i32>) -> Option<Arc<[PackedQuad]>> {
        let chunk = self.chunks.get(&position)?;
        if let Some(mesh) = self.current_mesh(position, chunk) {
            return Some(mesh);
        }

        let computed = self.compute_mesh(position, chunk)?;
        let mesh = computed
            .chunk
            .get_mut()
            .store_mesh(computed.quads, computed.revision, computed.neighbor_mask);
        Some(mesh)
    }

    /// Remeshes every chunk whose cached mesh is stale.
    ///
    /// Meshes are computed in parallel on scoped threads; the world is only read during
    /// that phase. The results are then stored one chunk at a time.
    ///
    /// # Returns
    /// The number of chunks remeshed.
    pub fn remesh_dirty(&self) -> usize {
        let dirty: Vec<(Point3<i32>, &MtResource<Chunk>)> = self
            .chunks
            .iter()
            .filter(|(position, chunk)| self.current_mesh(**position, chunk).is_none())
            .map(|(position, chunk)| (*position, chunk))
            .collect();
        if dirty.is_empty() {
            return 0;
        }

        let start = Instant::now();
        let workers = self.worker_count().min(dirty.len());
        let batch_size = dirty.len().div_ceil(workers);

        let computed: Vec<ComputedMesh> = thread::scope(|scope| {
            let handles: Vec<_> = dirty
                .chunks(batch_size)
                .map(|batch| {
                    scope.spawn(move || {
                        batch
                            .iter()
                            .filter_map(|(position, chunk)| self.compute_mesh(*position, chunk))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        let mut total_quads = 0;
        for mesh in computed {
            total_quads += mesh.quads.len();
            mesh.chunk
                .get_mut()
                .store_mesh(mesh.quads, mesh.revision, mesh.neighbor_mask);
        }

        info!(
            "Remeshed {} chunks into {} quads on {} threads in {:?}",
            dirty.len(),
            total_quads,
            workers,
            start.elapsed()
        );
        dirty.len()
    }

    /// [`Neighbors::mask`] of the chunks currently registered around `position`.
    fn neighbor_mask(&self, position: Point3<i32>) -> u8 {
        VoxelFace::all()
            .into_iter()
            .filter(|face| self.chunks.contains_key(&(position + face.normal())))
            .fold(0, |mask, face| mask | (1 << face as u8))
    }

    /// The cached mesh of `chunk`, if it is still valid for the registered neighbors.
    fn current_mesh(
        &self,
        position: Point3<i32>,
        chunk: &MtResource<Chunk>,
    ) -> Option<Arc<[PackedQuad]>> {
        let guard = chunk.get();
        let mesh = guard
            .is_mesh_current(self.neighbor_mask(position))
            .then(|| guard.cached_mesh());
        mesh
    }

    /// Meshes one chunk under read locks on it and its neighbors.
    ///
    /// The locks are taken in ascending `(x, y, z)` order of chunk position.
    fn compute_mesh(
        &self,
        position: Point3<i32>,
        chunk: &MtResource<Chunk>,
    ) -> Option<ComputedMesh> {
        let mut handles: Vec<(Point3<i32>, &MtResource<Chunk>)> = VoxelFace::all()
            .into_iter()
            .filter_map(|face| {
                let neighbor_position = position + face.normal();
                self.chunks
                    .get(&neighbor_position)
                    .map(|neighbor| (neighbor_position, neighbor))
            })
            .collect();
        handles.push((position, chunk));
        handles.sort_unstable_by_key(|(p, _)| (p.x, p.y, p.z));

        let guards: Vec<(Point3<i32>, RwLockReadGuard<'_, Chunk>)> = handles
            .into_iter()
            .map(|(p, handle)| (p, handle.get()))
            .collect();
        let locked = |target: Point3<i32>| {
            guards
                .iter()
                .find(|(p, _)| *p == target)
                .map(|(_, guard)| &**guard)
        };

        let center = locked(position)?;
        let neighbors =
            Neighbors::new(VoxelFace::all().map(|face| locked(position + face.normal())));
        let computed = ComputedMesh {
            chunk: chunk.clone(),
            quads: greedy_mesh(center, &neighbors),
            revision: center.revision(),
            neighbor_mask: neighbors.mask(),
        };
        Some(computed)
    }

    fn mark_neighbors_dirty(&self, position: Point3<i32>) {
        for face in VoxelFace::all() {
            let neighbor_position = position + face.normal();
            if let Some(neighbor) = self.chunks.get(&neighbor_position) {
                debug!("Chunk {:?} invalidated by change at {:?}", neighbor_position, position);
                neighbor.get_mut().mark_dirty();
            }
        }
    }

    fn worker_count(&self) -> usize {
        if self.mesh_workers > 0 {
            return self.mesh_workers;
        }
        let available = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        debug!("Using {} mesh workers (available parallelism)", available);
        available
    }
}
