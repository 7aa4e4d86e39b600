//! # Stamping
//!
//! Copies a resolved template into the output grid at the position of one
//! source cell. A template cell is written when overwriting or when the
//! destination is still air.
//!
//! Gravity-affected materials (sand) stamped over a non-supporting cell are
//! replaced by the configured safe-sand material so they do not collapse
//! when the world is loaded.

use crate::grid::{GridTransform, VoxelGrid};
use crate::template::VoxelTemplate;

/// Material ids that fall, and ids that cannot hold them up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GravityRules {
    sand: [bool; 256],
    non_support: [bool; 256],
}

impl Default for GravityRules {
    fn default() -> Self {
        Self {
            sand: [false; 256],
            non_support: [false; 256],
        }
    }
}

impl GravityRules {
    /// No falling materials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a material as affected by gravity.
    pub fn mark_sand(&mut self, id: u8) {
        self.sand[usize::from(id)] = true;
    }

    /// Marks a material as unable to support sand.
    pub fn mark_non_support(&mut self, id: u8) {
        self.non_support[usize::from(id)] = true;
    }

    /// True if the material falls.
    #[inline]
    #[must_use]
    pub const fn is_sand(&self, id: u8) -> bool {
        self.sand[id as usize]
    }

    /// True if the material cannot hold sand up.
    #[inline]
    #[must_use]
    pub const fn is_non_support(&self, id: u8) -> bool {
        self.non_support[id as usize]
    }
}

/// Writes templates into a grid.
#[derive(Clone, Copy, Debug)]
pub struct Stamper<'a> {
    transform: GridTransform,
    gravity: &'a GravityRules,
    safe_sand: u8,
}

impl<'a> Stamper<'a> {
    /// Creates a stamper. A `safe_sand` of 0 disables the replacement.
    #[must_use]
    pub const fn new(transform: GridTransform, gravity: &'a GravityRules, safe_sand: u8) -> Self {
        Self {
            transform,
            gravity,
            safe_sand,
        }
    }

    /// Coordinate mapping in use.
    #[must_use]
    pub const fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Stamps `template` for source cell `(src_x, src_y)` on the
    /// `zcount`-th kept level.
    pub fn stamp(
        &self,
        grid: &mut VoxelGrid,
        template: &VoxelTemplate,
        (src_x, src_y, zcount): (u32, u32, usize),
        overwrite: bool,
    ) {
        let size = template.size();
        let materials = template.materials();
        let data = template.data();
        for oz in 0..size {
            for oy in 0..size {
                for ox in 0..size {
                    let Some((x, y, z)) =
                        self.transform.to_output(src_x, src_y, zcount, (ox, oy, oz))
                    else {
                        continue;
                    };
                    if !grid.contains(x, y, z) {
                        continue;
                    }
                    if !overwrite && grid.material(x, y, z) != 0 {
                        continue;
                    }
                    let cell = template.cell_index(ox, oy, oz);
                    let mut material = materials[cell];
                    if self.safe_sand != 0
                        && self.gravity.is_sand(material)
                        && z > 0
                        && self.gravity.is_non_support(grid.material(x, y, z - 1))
                    {
                        material = self.safe_sand;
                    }
                    grid.set(x, y, z, material, data[cell]);
                }
            }
        }
    }
}
