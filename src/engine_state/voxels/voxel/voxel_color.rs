//! # Voxel Color Module
//!
//! This module defines the enumerated palette of voxel colors.
//! Chunks store raw [`ColorId`] values, so any non-zero identifier is a valid material;
//! the palette only names the ones the generator and tests reach for.

use num_derive::FromPrimitive;

use super::ColorId;

/// Enumerates the named voxel colors.
///
/// The discriminants are the values stored in chunks and in the color field of a
/// packed quad. `AIR` is the empty sentinel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum VoxelColor {
    /// Empty space.
    #[default]
    AIR = 0,
    /// Bright red.
    RED = 1,
    /// Grass green.
    GREEN = 2,
    /// Water blue.
    BLUE = 3,
    /// Sand yellow.
    YELLOW = 4,
    /// Dirt brown.
    BROWN = 5,
    /// Stone gray.
    GRAY = 6,
    /// Snow white.
    WHITE = 7,
    /// Bedrock black.
    BLACK = 8,
}

/// Number of named solid colors (excludes `AIR`).
pub const PALETTE_SIZE: ColorId = 8;

impl VoxelColor {
    /// Converts a raw color identifier into a named color.
    ///
    /// # Returns
    /// `None` if the identifier is outside the named palette.
    pub fn from_id(id: ColorId) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// Returns the raw identifier stored in chunks for this color.
    #[inline]
    pub fn id(self) -> ColorId {
        self as ColorId
    }

    /// Picks a random solid color (never `AIR`) from the given generator.
    pub fn get_random_color(rng: &mut fastrand::Rng) -> Self {
        // 1..=PALETTE_SIZE is always a named variant
        Self::from_id(rng.u8(1..=PALETTE_SIZE)).unwrap_or(VoxelColor::GRAY)
    }
}

impl From<VoxelColor> for ColorId {
    fn from(color: VoxelColor) -> Self {
        color.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_the_palette() {
        for id in 0..=PALETTE_SIZE {
            let color = VoxelColor::from_id(id).expect("palette id");
            assert_eq!(color.id(), id);
        }
        assert_eq!(VoxelColor::from_id(PALETTE_SIZE + 1), None);
    }

    #[test]
    fn default_color_is_empty() {
        assert_eq!(VoxelColor::default(), VoxelColor::AIR);
        assert_eq!(ColorId::from(VoxelColor::default()), crate::engine_state::voxels::voxel::EMPTY);
    }

    #[test]
    fn random_color_is_never_air() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..256 {
            assert_ne!(VoxelColor::get_random_color(&mut rng), VoxelColor::AIR);
        }
    }
}
