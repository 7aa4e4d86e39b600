//! # Spawn Placement
//!
//! The player spawns at the operator's cursor when it points at an
//! exported level inside the clip area and its stamped cube has two
//! stacked air cells. Otherwise the spawn goes on top of the centre column.

use tracing::info;
use voxmorph_core::source::{Cursor, CELLS_PER_BLOCK};
use voxmorph_core::VoxelGrid;
use voxmorph_export::SpawnPoint;

use crate::levels::LevelSelection;
use crate::pipeline::ClipArea;

/// Spawn cell in grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spawn {
    /// Grid x.
    pub x: usize,
    /// Grid y.
    pub y: usize,
    /// Grid height of the cell the player stands in.
    pub z: usize,
    /// Whether the cursor location was usable.
    pub from_cursor: bool,
}

impl Spawn {
    /// Spawn as recorded in the level descriptor: grid z is the vertical
    /// axis there, one above the standing cell.
    #[must_use]
    pub const fn level_point(&self) -> SpawnPoint {
        SpawnPoint {
            x: self.x as i32,
            height: self.z as i32 + 1,
            z: self.y as i32,
        }
    }
}

fn cursor_spawn(
    grid: &VoxelGrid,
    cursor: Cursor,
    levels: &LevelSelection,
    area: &ClipArea,
    cube_size: usize,
) -> Option<(usize, usize, usize)> {
    let cx = u32::try_from(cursor.x).ok()?;
    let cy = u32::try_from(cursor.y).ok()?;
    let cz = usize::try_from(cursor.z).ok()?;
    if !levels.is_kept(cz) {
        info!(level = cz, "cursor is on a level that is not exported");
        return None;
    }
    let in_x = (area.x_min * CELLS_PER_BLOCK..area.x_max * CELLS_PER_BLOCK).contains(&cx);
    let in_y = (area.y_min * CELLS_PER_BLOCK..area.y_max * CELLS_PER_BLOCK).contains(&cy);
    if !(in_x && in_y) {
        info!(x = cx, y = cy, "cursor is outside the exported area");
        return None;
    }

    let s = cube_size;
    let half = s / 2;
    let local_x = (cx - area.x_min * CELLS_PER_BLOCK) as usize;
    let local_y = (cy - area.y_min * CELLS_PER_BLOCK) as usize;
    let x = local_y * s + half;
    let y = grid.y_size().checked_sub(1 + local_x * s + half)?;
    let base = levels.kept_below(cz) * s;

    let z = (1..=s).map(|i| base + i).find(|&z| {
        grid.contains(x, y, z + 1) && grid.material(x, y, z) == 0 && grid.material(x, y, z + 1) == 0
    });
    if z.is_none() {
        info!("not enough room at the cursor for a spawn");
    }
    z.map(|z| (x, y, z))
}

/// Chooses the spawn cell.
#[must_use]
pub fn place_spawn(
    grid: &VoxelGrid,
    cursor: Option<Cursor>,
    levels: &LevelSelection,
    area: &ClipArea,
    cube_size: usize,
) -> Spawn {
    if let Some((x, y, z)) =
        cursor.and_then(|c| cursor_spawn(grid, c, levels, area, cube_size))
    {
        info!(x, y, z, "spawn placed at cursor");
        return Spawn {
            x,
            y,
            z,
            from_cursor: true,
        };
    }

    let x = grid.x_size() / 2;
    let y = grid.y_size() / 2;
    let z = (0..grid.z_size())
        .rev()
        .find(|&z| grid.material(x, y, z) != 0)
        .map_or(0, |top| top + 1);
    info!(x, y, z, "spawn placed on top of the centre column");
    Spawn {
        x,
        y,
        z,
        from_cursor: false,
    }
}
