//! # Packed Spatial Index
//!
//! Per-location metadata (buildings, constructions, vegetation) is keyed by
//! a single `u32` packing the three source coordinates:
//!
//! ```text
//! bit  31..22   21..11   10..0
//!      z (9)    x (11)   y (11)
//! ```
//!
//! Coordinates beyond the field widths would silently alias, so
//! [`PackedIndex::checked`] refuses them.

use serde::{Deserialize, Serialize};

/// Largest representable x or y coordinate.
pub const MAX_XY: u32 = 0x7ff;

/// Largest representable z coordinate.
pub const MAX_Z: u32 = 0x1ff;

/// Packed `(x, y, z)` source location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackedIndex(u32);

impl PackedIndex {
    /// Packs a location, masking each axis to its field width.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self(((z & MAX_Z) << 22) | ((x & MAX_XY) << 11) | (y & MAX_XY))
    }

    /// Packs a location, or `None` if any axis overflows its field.
    #[inline]
    #[must_use]
    pub const fn checked(x: u32, y: u32, z: u32) -> Option<Self> {
        if x > MAX_XY || y > MAX_XY || z > MAX_Z {
            None
        } else {
            Some(Self::new(x, y, z))
        }
    }

    /// Packs a signed location (neighbour probes step outside the map).
    #[inline]
    #[must_use]
    pub fn from_signed(x: i32, y: i32, z: i32) -> Option<Self> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        let z = u32::try_from(z).ok()?;
        Self::checked(x, y, z)
    }

    /// Source x.
    #[inline]
    #[must_use]
    pub const fn x(self) -> u32 {
        (self.0 >> 11) & MAX_XY
    }

    /// Source y.
    #[inline]
    #[must_use]
    pub const fn y(self) -> u32 {
        self.0 & MAX_XY
    }

    /// Source z.
    #[inline]
    #[must_use]
    pub const fn z(self) -> u32 {
        (self.0 >> 22) & MAX_Z
    }

    /// Raw packed value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
