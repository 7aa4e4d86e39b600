//! # Output Voxel Grid
//!
//! Four byte channels over the same `x * y * z` box: material, data, sky
//! light and block light. Cells are laid out with `x` fastest, then `y`,
//! then `z`: `index = x + (z * y_size + y) * x_size`.
//!
//! The grid is the only large allocation of a run. Allocation failure is
//! reported as [`CoreError::OutOfMemory`] instead of aborting.

use crate::error::{CoreError, CoreResult};
use crate::source::CELLS_PER_BLOCK;

/// Output heights are capped to the chunk height.
pub const GRID_HEIGHT: usize = 128;

fn try_channel(len: usize) -> CoreResult<Vec<u8>> {
    let mut channel = Vec::new();
    channel
        .try_reserve_exact(len)
        .map_err(|_| CoreError::OutOfMemory { bytes: len })?;
    channel.resize(len, 0);
    Ok(channel)
}

/// Dense output voxel grid.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    x_size: usize,
    y_size: usize,
    z_size: usize,
    materials: Vec<u8>,
    data: Vec<u8>,
    sky: Vec<u8>,
    block: Vec<u8>,
}

/// Split borrows used by the lighting pass.
#[derive(Debug)]
pub struct LightChannels<'a> {
    /// Material per cell.
    pub materials: &'a [u8],
    /// Sky light per cell.
    pub sky: &'a mut [u8],
    /// Block light per cell.
    pub block: &'a mut [u8],
}

impl VoxelGrid {
    /// Allocates an all-air, unlit grid.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfMemory`] if any channel cannot be allocated.
    pub fn try_new(x_size: usize, y_size: usize, z_size: usize) -> CoreResult<Self> {
        let len = x_size
            .checked_mul(y_size)
            .and_then(|n| n.checked_mul(z_size))
            .ok_or(CoreError::OutOfMemory { bytes: usize::MAX })?;
        Ok(Self {
            x_size,
            y_size,
            z_size,
            materials: try_channel(len)?,
            data: try_channel(len)?,
            sky: try_channel(len)?,
            block: try_channel(len)?,
        })
    }

    /// Extent along x.
    #[inline]
    #[must_use]
    pub const fn x_size(&self) -> usize {
        self.x_size
    }

    /// Extent along y.
    #[inline]
    #[must_use]
    pub const fn y_size(&self) -> usize {
        self.y_size
    }

    /// Extent along z.
    #[inline]
    #[must_use]
    pub const fn z_size(&self) -> usize {
        self.z_size
    }

    /// Linear index of a cell. The caller guarantees it is in bounds.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + (z * self.y_size + y) * self.x_size
    }

    /// True if the cell lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.x_size && y < self.y_size && z < self.z_size
    }

    /// Material at a cell, air outside the grid.
    #[inline]
    #[must_use]
    pub fn material(&self, x: usize, y: usize, z: usize) -> u8 {
        if self.contains(x, y, z) {
            self.materials[self.index(x, y, z)]
        } else {
            0
        }
    }

    /// Data nibble at a cell, 0 outside the grid.
    #[inline]
    #[must_use]
    pub fn data(&self, x: usize, y: usize, z: usize) -> u8 {
        if self.contains(x, y, z) {
            self.data[self.index(x, y, z)]
        } else {
            0
        }
    }

    /// Sky light at a cell, 0 outside the grid.
    #[inline]
    #[must_use]
    pub fn sky_light(&self, x: usize, y: usize, z: usize) -> u8 {
        if self.contains(x, y, z) {
            self.sky[self.index(x, y, z)]
        } else {
            0
        }
    }

    /// Block light at a cell, 0 outside the grid.
    #[inline]
    #[must_use]
    pub fn block_light(&self, x: usize, y: usize, z: usize) -> u8 {
        if self.contains(x, y, z) {
            self.block[self.index(x, y, z)]
        } else {
            0
        }
    }

    /// Writes material and data at a cell. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, material: u8, data: u8) {
        if self.contains(x, y, z) {
            let i = self.index(x, y, z);
            self.materials[i] = material;
            self.data[i] = data;
        }
    }

    /// Fills the `z = 0` plane with one material.
    pub fn fill_floor(&mut self, material: u8) {
        for x in 0..self.x_size {
            for y in 0..self.y_size {
                self.set(x, y, 0, material, 0);
            }
        }
    }

    /// Borrows the channels the lighting pass needs.
    pub fn light_channels(&mut self) -> LightChannels<'_> {
        LightChannels {
            materials: &self.materials,
            sky: &mut self.sky,
            block: &mut self.block,
        }
    }
}

/// Maps source cells plus template offsets to output cells.
///
/// Source x runs along output `-y` and source y along output `x`, so a map
/// viewed from above keeps its handedness in the output world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTransform {
    /// Template side length.
    pub cube_size: usize,
    /// First source block along x.
    pub x_offset_blocks: u32,
    /// First source block along y.
    pub y_offset_blocks: u32,
    /// Output extent along y.
    pub y_size: usize,
}

impl GridTransform {
    /// Output cell for template cell `(ox, oy, oz)` of source cell
    /// `(src_x, src_y)` on the `zcount`-th kept level. `oz = 0` is the top
    /// template layer. Returns `None` for cells left of the clip window.
    #[must_use]
    pub fn to_output(
        &self,
        src_x: u32,
        src_y: u32,
        zcount: usize,
        (ox, oy, oz): (usize, usize, usize),
    ) -> Option<(usize, usize, usize)> {
        let s = self.cube_size;
        let local_x = src_x.checked_sub(self.x_offset_blocks * CELLS_PER_BLOCK)? as usize;
        let local_y = src_y.checked_sub(self.y_offset_blocks * CELLS_PER_BLOCK)? as usize;
        let out_x = local_y * s + oy;
        let out_y = self.y_size.checked_sub(1 + local_x * s + ox)?;
        let out_z = (zcount * s + s).checked_sub(oz)?;
        Some((out_x, out_y, out_z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_air() {
        let grid = VoxelGrid::try_new(4, 3, 8).unwrap();
        assert_eq!(grid.material(3, 2, 7), 0);
        assert_eq!(grid.material(9, 9, 9), 0);
        assert_eq!(grid.index(1, 0, 0), 1);
        assert_eq!(grid.index(0, 1, 0), 4);
        assert_eq!(grid.index(0, 0, 1), 12);
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut grid = VoxelGrid::try_new(2, 2, 2).unwrap();
        grid.set(1, 1, 1, 5, 3);
        grid.set(2, 0, 0, 5, 3);
        assert_eq!(grid.material(1, 1, 1), 5);
        assert_eq!(grid.data(1, 1, 1), 3);
        assert_eq!(grid.material(1, 1, 0), 0);
    }

    #[test]
    fn test_fill_floor() {
        let mut grid = VoxelGrid::try_new(3, 3, 4).unwrap();
        grid.fill_floor(7);
        assert!((0..3).all(|x| (0..3).all(|y| grid.material(x, y, 0) == 7)));
        assert_eq!(grid.material(1, 1, 1), 0);
    }

    #[test]
    fn test_huge_grid_reports_out_of_memory() {
        let err = VoxelGrid::try_new(usize::MAX / 2, 4, 1).unwrap_err();
        assert_eq!(err.code(), 10);
    }

    #[test]
    fn test_transform_unit_cube() {
        let t = GridTransform {
            cube_size: 1,
            x_offset_blocks: 0,
            y_offset_blocks: 0,
            y_size: 16,
        };
        assert_eq!(t.to_output(0, 0, 0, (0, 0, 0)), Some((0, 15, 1)));
        assert_eq!(t.to_output(15, 3, 2, (0, 0, 0)), Some((3, 0, 3)));
    }

    #[test]
    fn test_transform_cube_three_with_offsets() {
        let t = GridTransform {
            cube_size: 3,
            x_offset_blocks: 1,
            y_offset_blocks: 2,
            y_size: 48,
        };
        // Source (16, 32) is the first cell of the window.
        assert_eq!(t.to_output(16, 32, 0, (0, 0, 0)), Some((0, 47, 3)));
        assert_eq!(t.to_output(16, 32, 0, (2, 1, 2)), Some((1, 45, 1)));
        assert_eq!(t.to_output(17, 33, 1, (0, 0, 0)), Some((3, 44, 6)));
        assert_eq!(t.to_output(15, 32, 0, (0, 0, 0)), None);
    }
}
