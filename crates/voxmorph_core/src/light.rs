//! # Light Propagation
//!
//! Iterative relaxation of sky and block light over the output grid.
//!
//! ## Rules
//!
//! - Fifteen passes, each sweeping `z` from the top down, then `y`, then `x`
//! - Above the grid, sky light is 15 and block light is 0; everywhere else
//!   outside the grid both are 0
//! - Sky light keeps its vertical neighbour's value but loses one per
//!   horizontal step, then the material's sky opacity
//! - Block light loses one plus the material's block opacity per step;
//!   a negative block opacity makes the material a light source of that
//!   strength
//! - A final sweep recomputes partially lit materials (slabs, stairs) as if
//!   they were transparent, so they look lit without passing light on
//!
//! Each pass reads values already updated earlier in the same sweep, so
//! light travels down and towards `+x`/`+y` within one pass and one cell
//! per pass the other way. The result after the fifteenth pass is final.

use tracing::debug;

use crate::grid::VoxelGrid;
use crate::opacity::{OpacityTable, MAX_LIGHT};

/// Number of relaxation passes.
pub const LIGHT_PASSES: usize = 15;

/// Which light channel a lookup reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightChannel {
    /// Light from the sky.
    Sky,
    /// Light from emitting blocks.
    Block,
}

/// Grid extents in signed form, for neighbour arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dims {
    /// Extent along x.
    pub x: isize,
    /// Extent along y.
    pub y: isize,
    /// Extent along z.
    pub z: isize,
}

impl Dims {
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    const fn index(self, x: isize, y: isize, z: isize) -> usize {
        (x + (z * self.y + y) * self.x) as usize
    }
}

/// Light level at a signed location, following the out-of-grid rules.
#[inline]
#[must_use]
pub fn light_at(light: &[u8], dims: Dims, (x, y, z): (isize, isize, isize), channel: LightChannel) -> u8 {
    if x < 0 || y < 0 || z < 0 || x >= dims.x || y >= dims.y {
        return 0;
    }
    if z >= dims.z {
        return match channel {
            LightChannel::Sky => MAX_LIGHT,
            LightChannel::Block => 0,
        };
    }
    light[dims.index(x, y, z)]
}

#[inline]
fn neighbour_light(light: &[u8], dims: Dims, (x, y, z): (isize, isize, isize), channel: LightChannel) -> (u8, u8) {
    let vert = light_at(light, dims, (x, y, z + 1), channel).max(light_at(light, dims, (x, y, z - 1), channel));
    let horiz = light_at(light, dims, (x + 1, y, z), channel)
        .max(light_at(light, dims, (x - 1, y, z), channel))
        .max(light_at(light, dims, (x, y + 1, z), channel))
        .max(light_at(light, dims, (x, y - 1, z), channel));
    (vert, horiz)
}

#[inline]
fn relax_sky(sky: &mut [u8], dims: Dims, at: (isize, isize, isize), opacity: u8) {
    let (vert, horiz) = neighbour_light(sky, dims, at, LightChannel::Sky);
    let light = vert.max(horiz.saturating_sub(1)).saturating_sub(opacity);
    sky[dims.index(at.0, at.1, at.2)] = light;
}

#[inline]
fn relax_block(block: &mut [u8], dims: Dims, at: (isize, isize, isize), opacity: i8) {
    let (vert, horiz) = neighbour_light(block, dims, at, LightChannel::Block);
    let i = dims.index(at.0, at.1, at.2);
    let mut light = vert.max(horiz).max(block[i]);
    if let Ok(opacity) = u8::try_from(opacity) {
        light = light.saturating_sub(opacity.saturating_add(1));
    }
    block[i] = light;
}

/// Computes sky and block light for the whole grid.
#[allow(clippy::cast_possible_wrap)]
pub fn compute_lighting(grid: &mut VoxelGrid, opacity: &OpacityTable) {
    let dims = Dims {
        x: grid.x_size() as isize,
        y: grid.y_size() as isize,
        z: grid.z_size() as isize,
    };
    let channels = grid.light_channels();
    let materials = channels.materials;
    let sky = channels.sky;
    let block = channels.block;

    for pass in 0..LIGHT_PASSES {
        debug!(pass = pass + 1, total = LIGHT_PASSES, "lighting pass");
        for z in (0..dims.z).rev() {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    let i = dims.index(x, y, z);
                    let material = materials[i];

                    let sky_opacity = opacity.sky(material);
                    if sky_opacity < MAX_LIGHT {
                        relax_sky(sky, dims, (x, y, z), sky_opacity);
                    }

                    let block_opacity = opacity.block(material);
                    if block_opacity < 0 {
                        block[i] = block_opacity.unsigned_abs();
                    }
                    if block_opacity < 15 {
                        relax_block(block, dims, (x, y, z), block_opacity);
                    }
                }
            }
        }
    }

    for z in (0..dims.z).rev() {
        for y in 0..dims.y {
            for x in 0..dims.x {
                if opacity.partial_lit(materials[dims.index(x, y, z)]) {
                    relax_sky(sky, dims, (x, y, z), 0);
                    relax_block(block, dims, (x, y, z), 0);
                }
            }
        }
    }
}
