//! # Voxel Face Module
//!
//! This module defines the six axis-aligned faces of a voxel.
//! The discriminants are bit-exact: they are written into the 3-bit facing field of a
//! packed quad and read back by the renderer.

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// Index of the X axis.
pub const AXIS_X: usize = 0;
/// Index of the Y axis.
pub const AXIS_Y: usize = 1;
/// Index of the Z axis.
pub const AXIS_Z: usize = 2;

/// Represents the six possible faces of a voxel.
///
/// The order is: [LEFT, RIGHT, BOTTOM, TOP, BACK, FRONT], i.e. negative then positive
/// direction for X, Y and Z in turn.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum VoxelFace {
    /// The left face (facing negative X)
    LEFT = 0,

    /// The right face (facing positive X)
    RIGHT = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The back face (facing negative Z)
    BACK = 4,

    /// The front face (facing positive Z)
    FRONT = 5,
}

impl VoxelFace {
    /// Returns an array containing all six faces in discriminant order.
    pub fn all() -> [VoxelFace; 6] {
        [
            VoxelFace::LEFT,
            VoxelFace::RIGHT,
            VoxelFace::BOTTOM,
            VoxelFace::TOP,
            VoxelFace::BACK,
            VoxelFace::FRONT,
        ]
    }

    /// Returns the face looking along `axis` in `direction`.
    ///
    /// # Arguments
    /// * `axis` - One of [`AXIS_X`], [`AXIS_Y`], [`AXIS_Z`]
    /// * `direction` - `-1` or `+1`; any non-negative value counts as positive
    ///
    /// # Returns
    /// `None` if `axis` is not a valid axis index.
    pub fn from_axis_direction(axis: usize, direction: i32) -> Option<Self> {
        let positive = direction >= 0;
        match (axis, positive) {
            (AXIS_X, false) => Some(VoxelFace::LEFT),
            (AXIS_X, true) => Some(VoxelFace::RIGHT),
            (AXIS_Y, false) => Some(VoxelFace::BOTTOM),
            (AXIS_Y, true) => Some(VoxelFace::TOP),
            (AXIS_Z, false) => Some(VoxelFace::BACK),
            (AXIS_Z, true) => Some(VoxelFace::FRONT),
            _ => None,
        }
    }

    /// Decodes a face from the 3-bit facing field of a packed quad.
    pub fn from_bits(bits: u8) -> Option<Self> {
        num::FromPrimitive::from_u8(bits)
    }

    /// The axis this face is perpendicular to.
    #[inline]
    pub fn axis(self) -> usize {
        self as usize / 2
    }

    /// `+1` for faces looking along the positive axis, `-1` otherwise.
    #[inline]
    pub fn direction(self) -> i32 {
        if self.is_positive() {
            1
        } else {
            -1
        }
    }

    /// Whether this face looks along the positive axis.
    #[inline]
    pub fn is_positive(self) -> bool {
        self as usize % 2 == 1
    }

    /// The face on the other side of the voxel.
    pub fn opposite(self) -> Self {
        match self {
            VoxelFace::LEFT => VoxelFace::RIGHT,
            VoxelFace::RIGHT => VoxelFace::LEFT,
            VoxelFace::BOTTOM => VoxelFace::TOP,
            VoxelFace::TOP => VoxelFace::BOTTOM,
            VoxelFace::BACK => VoxelFace::FRONT,
            VoxelFace::FRONT => VoxelFace::BACK,
        }
    }

    /// Integer unit normal; also the chunk-coordinate offset of the neighbor behind
    /// this face.
    pub fn normal(self) -> Vector3<i32> {
        let mut normal = Vector3::new(0, 0, 0);
        normal[self.axis()] = self.direction();
        normal
    }

    /// The two in-plane axes `(u, v)` swept by the mesher for this face's axis.
    ///
    /// `X → (Y, Z)`, `Y → (X, Z)`, `Z → (X, Y)`.
    pub fn plane_axes(self) -> (usize, usize) {
        match self.axis() {
            AXIS_X => (AXIS_Y, AXIS_Z),
            AXIS_Y => (AXIS_X, AXIS_Z),
            _ => (AXIS_X, AXIS_Y),
        }
    }
}
