//! Bit-packed quad encoding.
//!
//! Every quad the mesher emits is a single 32-bit word handed verbatim to the renderer.
//! The layout is bit-exact, least significant bits first:
//!
//! | bits   | field      |
//! |--------|------------|
//! | 0..4   | x          |
//! | 4..8   | y          |
//! | 8..12  | z          |
//! | 12..16 | width - 1  |
//! | 16..20 | height - 1 |
//! | 20..28 | color      |
//! | 28..31 | facing     |
//! | 31     | reserved   |

use cgmath::Point3;

use crate::engine_state::voxels::voxel::{voxel_face::VoxelFace, ColorId};

const X_SHIFT: u32 = 0;
const Y_SHIFT: u32 = 4;
const Z_SHIFT: u32 = 8;
const WIDTH_SHIFT: u32 = 12;
const HEIGHT_SHIFT: u32 = 16;
const COLOR_SHIFT: u32 = 20;
const FACING_SHIFT: u32 = 28;

const NIBBLE_MASK: u32 = 0xF;
const COLOR_MASK: u32 = 0xFF;
const FACING_MASK: u32 = 0x7;

/// One maximal, uniformly colored face rectangle packed into 32 bits.
///
/// The x/y/z fields hold the local coordinate of the voxel the quad starts at. The
/// rectangle spans `width` voxels along the face's first in-plane axis and `height`
/// voxels along the second (see [`VoxelFace::plane_axes`]).
///
/// # Memory Layout
/// `#[repr(transparent)]` over `u32`, so a `&[PackedQuad]` can be cast to bytes with
/// `bytemuck::cast_slice` and uploaded as is.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedQuad(pub u32);

impl PackedQuad {
    /// Packs a quad into its 32-bit representation.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Local voxel coordinate, 0..16
    /// * `width`, `height` - Extents, 1..=16, stored biased by -1
    /// * `color` - The color identifier of the face
    /// * `facing` - Which way the face looks
    ///
    /// No range checking is done; out-of-range inputs are truncated to their field.
    #[inline]
    pub fn pack(
        x: u32,
        y: u32,
        z: u32,
        width: u32,
        height: u32,
        color: ColorId,
        facing: VoxelFace,
    ) -> Self {
        PackedQuad(
            ((x & NIBBLE_MASK) << X_SHIFT)
                | ((y & NIBBLE_MASK) << Y_SHIFT)
                | ((z & NIBBLE_MASK) << Z_SHIFT)
                | ((width.wrapping_sub(1) & NIBBLE_MASK) << WIDTH_SHIFT)
                | ((height.wrapping_sub(1) & NIBBLE_MASK) << HEIGHT_SHIFT)
                | ((color as u32 & COLOR_MASK) << COLOR_SHIFT)
                | ((facing as u32 & FACING_MASK) << FACING_SHIFT),
        )
    }

    /// The raw packed word.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Local X coordinate of the anchor voxel, 0..16.
    #[inline]
    pub fn x(self) -> u32 {
        (self.0 >> X_SHIFT) & NIBBLE_MASK
    }

    /// Local Y coordinate of the anchor voxel, 0..16.
    #[inline]
    pub fn y(self) -> u32 {
        (self.0 >> Y_SHIFT) & NIBBLE_MASK
    }

    /// Local Z coordinate of the anchor voxel, 0..16.
    #[inline]
    pub fn z(self) -> u32 {
        (self.0 >> Z_SHIFT) & NIBBLE_MASK
    }

    /// Extent along the first in-plane axis, 1..=16.
    #[inline]
    pub fn width(self) -> u32 {
        ((self.0 >> WIDTH_SHIFT) & NIBBLE_MASK) + 1
    }

    /// Extent along the second in-plane axis, 1..=16.
    #[inline]
    pub fn height(self) -> u32 {
        ((self.0 >> HEIGHT_SHIFT) & NIBBLE_MASK) + 1
    }

    /// The color identifier shared by every face the quad covers.
    #[inline]
    pub fn color(self) -> ColorId {
        ((self.0 >> COLOR_SHIFT) & COLOR_MASK) as ColorId
    }

    /// The facing direction.
    ///
    /// # Returns
    /// `None` only for words that were not produced by [`PackedQuad::pack`].
    #[inline]
    pub fn facing(self) -> Option<VoxelFace> {
        VoxelFace::from_bits(((self.0 >> FACING_SHIFT) & FACING_MASK) as u8)
    }

    /// The local voxel coordinate the quad is anchored at.
    pub fn position(self) -> Point3<u32> {
        Point3::new(self.x(), self.y(), self.z())
    }

    /// The corner of the quad on the boundary plane between solid and empty space.
    ///
    /// Positive-facing quads sit one unit further along their axis than the voxel
    /// coordinate, since the face lies on the far side of the voxel.
    pub fn plane_origin(self) -> Option<Point3<u32>> {
        let facing = self.facing()?;
        let mut origin = self.position();
        if facing.is_positive() {
            origin[facing.axis()] += 1;
        }
        Some(origin)
    }

    /// The four corners of the quad plane in local space, counter-clockwise when seen
    /// from the side the face looks at.
    pub fn corners(self) -> Option<[Point3<u32>; 4]> {
        let facing = self.facing()?;
        let origin = self.plane_origin()?;
        let (u, v) = facing.plane_axes();

        let mut du = origin;
        du[u] += self.width();
        let mut dv = origin;
        dv[v] += self.height();
        let mut duv = du;
        duv[v] += self.height();

        // (u, v, axis) is right-handed for X and Z but left-handed for Y
        let flip = facing.is_positive() == (facing.axis() == 1);
        Some(if flip {
            [origin, dv, duv, du]
        } else {
            [origin, du, duv, dv]
        })
    }
}

impl std::fmt::Debug for PackedQuad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedQuad")
            .field("x", &self.x())
            .field("y", &self.y())
            .field("z", &self.z())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("color", &self.color())
            .field("facing", &self.facing())
            .finish()
    }
}

impl From<PackedQuad> for u32 {
    fn from(quad: PackedQuad) -> Self {
        quad.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_land_at_their_documented_offsets() {
        let quad = PackedQuad::pack(1, 2, 3, 4, 5, 6, VoxelFace::TOP);
        assert_eq!(
            quad.bits(),
            1 | (2 << 4) | (3 << 8) | (3 << 12) | (4 << 16) | (6 << 20) | (3 << 28)
        );
    }

    #[test]
    fn extremes_use_every_bit_but_the_reserved_one() {
        let quad = PackedQuad::pack(15, 15, 15, 16, 16, 255, VoxelFace::FRONT);
        assert_eq!(quad.bits(), 0x5FFF_FFFF);
        assert_eq!(quad.bits() >> 31, 0);
        assert_eq!(quad.width(), 16);
        assert_eq!(quad.height(), 16);
        assert_eq!(quad.color(), 255);
        assert_eq!(quad.facing(), Some(VoxelFace::FRONT));
    }

    #[test]
    fn positive_faces_sit_one_unit_further_out() {
        let neg = PackedQuad::pack(4, 7, 9, 1, 1, 1, VoxelFace::LEFT);
        let pos = PackedQuad::pack(4, 7, 9, 1, 1, 1, VoxelFace::RIGHT);
        assert_eq!(neg.plane_origin(), Some(Point3::new(4, 7, 9)));
        assert_eq!(pos.plane_origin(), Some(Point3::new(5, 7, 9)));

        let top = PackedQuad::pack(15, 15, 15, 1, 1, 1, VoxelFace::TOP);
        assert_eq!(top.plane_origin(), Some(Point3::new(15, 16, 15)));
    }

    #[test]
    fn corners_span_width_and_height_on_the_plane_axes() {
        // TOP: u = X, v = Z
        let quad = PackedQuad::pack(2, 3, 4, 3, 2, 1, VoxelFace::TOP);
        let corners = quad.corners().expect("valid facing");
        for corner in corners {
            assert_eq!(corner.y, 4);
        }
        let xs: Vec<u32> = corners.iter().map(|c| c.x).collect();
        let zs: Vec<u32> = corners.iter().map(|c| c.z).collect();
        assert_eq!(xs.iter().min(), Some(&2));
        assert_eq!(xs.iter().max(), Some(&5));
        assert_eq!(zs.iter().min(), Some(&4));
        assert_eq!(zs.iter().max(), Some(&6));
    }

    #[test]
    fn corners_wind_counter_clockwise_toward_the_normal() {
        for face in VoxelFace::all() {
            let quad = PackedQuad::pack(3, 3, 3, 2, 3, 1, face);
            let c = quad.corners().expect("valid facing");
            let p = |i: usize| [c[i].x as i64, c[i].y as i64, c[i].z as i64];
            let (a, b, d) = (p(0), p(1), p(3));
            let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let e2 = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
            let cross = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let normal = face.normal();
            let dot = cross[0] * normal.x as i64
                + cross[1] * normal.y as i64
                + cross[2] * normal.z as i64;
            assert!(dot > 0, "{face:?} winds the wrong way");
        }
    }
}
