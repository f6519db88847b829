//! Greedy meshing implementation for voxel chunks.
//!
//! This module implements the greedy meshing algorithm which merges adjacent coplanar
//! faces of the same color into larger quads. For each of the six face directions the
//! chunk is cut into slices along the face's axis; each slice becomes a 16x16 mask of
//! visible face colors, and the mask is swept in raster order, growing every unvisited
//! cell into the largest rectangle it anchors (first along the row, then row by row).

use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{
    chunk::{Chunk, CHUNK_DIMENSIONS},
    voxel::{is_solid, voxel_face::VoxelFace, ColorId, EMPTY},
};

use super::{
    packed_quad::PackedQuad,
    visibility::{FaceVisibility, Neighbors},
};

/// Side length of the square slice mask. All chunk axes share it.
const MASK_DIMENSION: usize = CHUNK_DIMENSIONS[0];

/// One slice worth of visible face colors, indexed `u + v * MASK_DIMENSION`.
struct SliceMask {
    cells: [ColorId; MASK_DIMENSION * MASK_DIMENSION],
    /// Number of non-empty cells written since the last clear.
    filled: usize,
}

impl SliceMask {
    fn new() -> Self {
        SliceMask {
            cells: [EMPTY; MASK_DIMENSION * MASK_DIMENSION],
            filled: 0,
        }
    }

    #[inline]
    fn get(&self, u: usize, v: usize) -> ColorId {
        self.cells[u + v * MASK_DIMENSION]
    }

    #[inline]
    fn set(&mut self, u: usize, v: usize, color: ColorId) {
        self.cells[u + v * MASK_DIMENSION] = color;
        self.filled += 1;
    }

    fn clear(&mut self) {
        self.cells.fill(EMPTY);
        self.filled = 0;
    }

    fn clear_rect(&mut self, u: usize, v: usize, width: usize, height: usize) {
        for row in v..v + height {
            let start = u + row * MASK_DIMENSION;
            self.cells[start..start + width].fill(EMPTY);
        }
    }
}

/// Maps a slice depth and in-plane offsets back to axis-indexed chunk coordinates.
#[inline]
fn to_chunk_coords(face: VoxelFace, depth: usize, u: usize, v: usize) -> [usize; 3] {
    let (u_axis, v_axis) = face.plane_axes();
    let mut pos = [0; 3];
    pos[face.axis()] = depth;
    pos[u_axis] = u;
    pos[v_axis] = v;
    pos
}

/// Fills `mask` with the colors of the voxels in slice `depth` whose `face` is visible.
fn build_mask(visibility: &FaceVisibility<'_>, face: VoxelFace, depth: usize, mask: &mut SliceMask) {
    mask.clear();
    let chunk = visibility.chunk();

    for v in 0..MASK_DIMENSION {
        for u in 0..MASK_DIMENSION {
            let pos = to_chunk_coords(face, depth, u, v);
            let color = chunk.voxel_at(pos);
            if !is_solid(color) {
                continue;
            }
            if visibility.should_render_face(
                pos[0] as i32,
                pos[1] as i32,
                pos[2] as i32,
                face.axis(),
                face.direction(),
            ) {
                mask.set(u, v, color);
            }
        }
    }
}

/// Sweeps a built mask, emitting one quad per maximal same-color rectangle.
///
/// Consumed cells are cleared, so the mask is empty afterwards.
fn merge_mask(face: VoxelFace, depth: usize, mask: &mut SliceMask, quads: &mut Vec<PackedQuad>) {
    for v in 0..MASK_DIMENSION {
        let mut u = 0;
        while u < MASK_DIMENSION {
            let color = mask.get(u, v);
            if color == EMPTY {
                u += 1;
                continue;
            }

            let mut width = 1;
            while u + width < MASK_DIMENSION && mask.get(u + width, v) == color {
                width += 1;
            }

            let mut height = 1;
            'grow: while v + height < MASK_DIMENSION {
                for k in 0..width {
                    if mask.get(u + k, v + height) != color {
                        break 'grow;
                    }
                }
                height += 1;
            }

            let pos = to_chunk_coords(face, depth, u, v);
            quads.push(PackedQuad::pack(
                pos[0] as u32,
                pos[1] as u32,
                pos[2] as u32,
                width as u32,
                height as u32,
                color,
                face,
            ));

            mask.clear_rect(u, v, width, height);
            u += width;
        }
    }
}

/// Greedy-meshes every slice of `chunk` for a single face direction.
///
/// # Returns
/// The number of visible voxel faces found, before merging.
pub fn greedy_mesh_face(
    visibility: &FaceVisibility<'_>,
    face: VoxelFace,
    quads: &mut Vec<PackedQuad>,
) -> usize {
    let mut mask = SliceMask::new();
    let mut visible_faces = 0;

    for depth in 0..CHUNK_DIMENSIONS[face.axis()] {
        build_mask(visibility, face, depth, &mut mask);
        if mask.filled == 0 {
            continue;
        }
        visible_faces += mask.filled;
        merge_mask(face, depth, &mut mask, quads);
    }

    visible_faces
}

/// Generates the packed quads for all six faces of a chunk.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `neighbors` - Loaded adjacent chunks; boundaries without one face open space
///
/// # Returns
/// Quads grouped by face in [`VoxelFace::all`] order, each group ordered by slice and
/// then by raster position within the slice.
///
/// # Performance
/// Every voxel is visited once per face direction, and each mask cell is consumed by
/// exactly one quad, so the work is linear in the chunk size.
pub fn greedy_mesh(chunk: &Chunk, neighbors: &Neighbors<'_>) -> Vec<PackedQuad> {
    let start = Instant::now();
    let visibility = FaceVisibility::new(chunk, neighbors);
    let mut quads = Vec::new();

    if chunk.is_empty() {
        return quads;
    }

    let mut visible_faces = 0;
    for face in VoxelFace::all() {
        visible_faces += greedy_mesh_face(&visibility, face, &mut quads);
    }

    let potential_faces = chunk.solid_count() * VoxelFace::all().len();
    let culled = potential_faces - visible_faces;
    debug!(
        "Chunk {:?} meshed in {:?}: {} quads from {}/{} visible faces ({:.1}% culled, {} neighbors)",
        chunk.position(),
        start.elapsed(),
        quads.len(),
        visible_faces,
        potential_faces,
        culled as f32 * 100.0 / potential_faces as f32,
        neighbors.count(),
    );

    quads
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::voxels::voxel::voxel_color::VoxelColor;

    fn origin() -> Point3<i32> {
        Point3::new(0, 0, 0)
    }

    fn quads_facing(quads: &[PackedQuad], face: VoxelFace) -> Vec<PackedQuad> {
        quads
            .iter()
            .copied()
            .filter(|q| q.facing() == Some(face))
            .collect()
    }

    #[test]
    fn empty_chunk_has_no_quads() {
        let chunk = Chunk::new(origin());
        assert!(greedy_mesh(&chunk, &Neighbors::none()).is_empty());
    }

    #[test]
    fn solid_chunk_is_six_full_quads() {
        let chunk = Chunk::solid(&origin(), VoxelColor::GREEN);
        let quads = greedy_mesh(&chunk, &Neighbors::none());
        assert_eq!(quads.len(), 6);

        for (quad, face) in quads.iter().zip(VoxelFace::all()) {
            assert_eq!(quad.facing(), Some(face));
            assert_eq!(quad.width(), 16);
            assert_eq!(quad.height(), 16);
            assert_eq!(quad.color(), VoxelColor::GREEN.id());
            let depth = quad.position()[face.axis()];
            assert_eq!(depth, if face.is_positive() { 15 } else { 0 });
        }
    }

    #[test]
    fn single_voxel_has_one_quad_per_face() {
        let mut chunk = Chunk::new(origin());
        chunk.set_voxel(3, 9, 12, VoxelColor::RED.id());
        let quads = greedy_mesh(&chunk, &Neighbors::none());
        assert_eq!(quads.len(), 6);
        for quad in &quads {
            assert_eq!(quad.position(), Point3::new(3, 9, 12));
            assert_eq!((quad.width(), quad.height()), (1, 1));
        }
    }

    #[test]
    fn two_voxel_bar_merges_along_its_length() {
        let mut chunk = Chunk::new(origin());
        chunk.set_voxel(4, 4, 4, VoxelColor::GREEN.id());
        chunk.set_voxel(5, 4, 4, VoxelColor::GREEN.id());
        let quads = greedy_mesh(&chunk, &Neighbors::none());

        // end caps plus one merged quad for each long side
        assert_eq!(quads.len(), 6);
        for face in [VoxelFace::TOP, VoxelFace::BOTTOM, VoxelFace::FRONT, VoxelFace::BACK] {
            let facing = quads_facing(&quads, face);
            assert_eq!(facing.len(), 1, "{face:?}");
            // X is the first in-plane axis for Y and Z faces
            assert_eq!(facing[0].width(), 2, "{face:?}");
            assert_eq!(facing[0].height(), 1, "{face:?}");
            assert_eq!(facing[0].x(), 4);
        }
        for face in [VoxelFace::LEFT, VoxelFace::RIGHT] {
            let facing = quads_facing(&quads, face);
            assert_eq!(facing.len(), 1);
            assert_eq!((facing[0].width(), facing[0].height()), (1, 1));
        }
        assert_eq!(quads_facing(&quads, VoxelFace::LEFT)[0].x(), 4);
        assert_eq!(quads_facing(&quads, VoxelFace::RIGHT)[0].x(), 5);
    }

    #[test]
    fn different_colors_never_merge() {
        let mut chunk = Chunk::new(origin());
        chunk.set_voxel(4, 4, 4, VoxelColor::GREEN.id());
        chunk.set_voxel(5, 4, 4, VoxelColor::BLUE.id());
        let quads = greedy_mesh(&chunk, &Neighbors::none());

        assert_eq!(quads_facing(&quads, VoxelFace::TOP).len(), 2);
        assert_eq!(quads.len(), 10);
        assert!(quads.iter().all(|q| q.width() == 1 && q.height() == 1));
    }

    #[test]
    fn l_shape_splits_into_width_first_rectangles() {
        // Top view of a flat slab at y = 0:
        //   z=1  X .
        //   z=0  X X
        let mut chunk = Chunk::new(origin());
        chunk.set_voxel(0, 0, 0, 1);
        chunk.set_voxel(1, 0, 0, 1);
        chunk.set_voxel(0, 0, 1, 1);

        let top = quads_facing(&greedy_mesh(&chunk, &Neighbors::none()), VoxelFace::TOP);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].x(), top[0].z(), top[0].width(), top[0].height()), (0, 0, 2, 1));
        assert_eq!((top[1].x(), top[1].z(), top[1].width(), top[1].height()), (0, 1, 1, 1));
    }

    #[test]
    fn rectangle_grows_across_rows() {
        let mut chunk = Chunk::new(origin());
        for x in 2..5 {
            for z in 6..10 {
                chunk.set_voxel(x, 7, z, VoxelColor::YELLOW.id());
            }
        }
        let quads = greedy_mesh(&chunk, &Neighbors::none());
        let top = quads_facing(&quads, VoxelFace::TOP);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].position(), Point3::new(2, 7, 6));
        assert_eq!((top[0].width(), top[0].height()), (3, 4));
        assert_eq!(quads.len(), 6);
    }

    #[test]
    fn hidden_interior_faces_are_not_emitted() {
        let mut chunk = Chunk::new(origin());
        for y in 0..3 {
            chunk.set_voxel(8, y, 8, VoxelColor::GRAY.id());
        }
        let quads = greedy_mesh(&chunk, &Neighbors::none());
        assert_eq!(quads_facing(&quads, VoxelFace::TOP).len(), 1);
        assert_eq!(quads_facing(&quads, VoxelFace::TOP)[0].y(), 2);
        assert_eq!(quads_facing(&quads, VoxelFace::BOTTOM)[0].y(), 0);
        // side columns merge along Y, the second in-plane axis of X and Z faces
        let left = quads_facing(&quads, VoxelFace::LEFT);
        assert_eq!(left.len(), 1);
        assert_eq!((left[0].width(), left[0].height()), (3, 1));
        let back = quads_facing(&quads, VoxelFace::BACK);
        assert_eq!((back[0].width(), back[0].height()), (1, 3));
    }

    #[test]
    fn loaded_neighbor_hides_the_shared_boundary() {
        let chunk = Chunk::solid(&origin(), VoxelColor::GRAY);
        let above = Chunk::solid(&Point3::new(0, 1, 0), VoxelColor::WHITE);
        let neighbors = Neighbors::none().with(VoxelFace::TOP, &above);

        let quads = greedy_mesh(&chunk, &neighbors);
        assert_eq!(quads.len(), 5);
        assert!(quads_facing(&quads, VoxelFace::TOP).is_empty());
    }
}
