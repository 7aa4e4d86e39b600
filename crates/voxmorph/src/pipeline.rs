//! # Conversion Pipeline
//!
//! One run, start to finish:
//!
//! 1. clip the requested window to the world and pick the exported levels
//! 2. allocate the grid
//! 3. convert every tile of every kept level, bottom up, logging match
//!    statistics after each level
//! 4. lay the bottom plane, persist unknown features, place the spawn,
//!    compute light
//! 5. write the chunk files, then `level.dat`
//!
//! Rendering and exporting are separate steps so the grid can be inspected
//! before anything touches the disk.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};
use voxmorph_core::grid::GRID_HEIGHT;
use voxmorph_core::source::{ShapeClass, WorldExtent, CELLS_PER_BLOCK};
use voxmorph_core::{
    compute_lighting, ClipWindow, Config, ConversionContext, GridTransform, Stamper, VoxelGrid,
    WorldSnapshot, WorldSource,
};
use voxmorph_export::{snow_flag, LevelInfo, WorldWriter};

use crate::error::{RunError, RunResult};
use crate::features::{TileConverter, TileSite};
use crate::levels::{select_levels, LevelProbe, LevelSelection};
use crate::spawn::{place_spawn, Spawn};

/// Clip window intersected with the world, in source blocks. Upper bounds
/// are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipArea {
    /// First block along x.
    pub x_min: u32,
    /// End block along x.
    pub x_max: u32,
    /// First block along y.
    pub y_min: u32,
    /// End block along y.
    pub y_max: u32,
}

impl ClipArea {
    /// Clips `window` to `extent`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArea` if the window starts past the end of the world.
    pub fn resolve(window: &ClipWindow, extent: WorldExtent) -> RunResult<Self> {
        let area = Self {
            x_min: window.x_min,
            x_max: window.x_max.min(extent.blocks_x),
            y_min: window.y_min,
            y_max: window.y_max.min(extent.blocks_y),
        };
        if area.x_min > area.x_max || area.y_min > area.y_max {
            return Err(RunError::InvalidArea {
                x_min: area.x_min,
                y_min: area.y_min,
                x_max: area.x_max,
                y_max: area.y_max,
            });
        }
        Ok(area)
    }

    /// Source cells covered along x.
    #[must_use]
    pub const fn cells_x(&self) -> u32 {
        (self.x_max - self.x_min) * CELLS_PER_BLOCK
    }

    /// Source cells covered along y.
    #[must_use]
    pub const fn cells_y(&self) -> u32 {
        (self.y_max - self.y_min) * CELLS_PER_BLOCK
    }

    fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let xs = self.x_min * CELLS_PER_BLOCK..self.x_max * CELLS_PER_BLOCK;
        xs.flat_map(move |x| {
            (self.y_min * CELLS_PER_BLOCK..self.y_max * CELLS_PER_BLOCK).map(move |y| (x, y))
        })
    }
}

const fn is_built(shape: ShapeClass) -> bool {
    matches!(
        shape,
        ShapeClass::Floor
            | ShapeClass::Pillar
            | ShapeClass::Fortification
            | ShapeClass::Ramp
            | ShapeClass::RampTop
    )
}

fn level_has<S: WorldSource + ?Sized>(source: &S, area: &ClipArea, z: usize, probe: LevelProbe) -> bool {
    let Ok(z) = i32::try_from(z) else {
        return false;
    };
    area.cells().any(|(x, y)| {
        source
            .tile(x as i32, y as i32, z)
            .is_some_and(|tile| match probe {
                LevelProbe::Solid => tile.shape != ShapeClass::Empty,
                LevelProbe::Built => is_built(tile.shape),
            })
    })
}

/// A converted, lit grid that has not been written yet.
#[derive(Debug)]
pub struct RenderedWorld {
    /// The lit voxel grid.
    pub grid: VoxelGrid,
    /// Exported source levels.
    pub levels: LevelSelection,
    /// Source area converted.
    pub area: ClipArea,
    /// Player spawn.
    pub spawn: Spawn,
    /// Whether any converted tile was ice.
    pub saw_ice: bool,
    /// Torches placed on dark floors.
    pub torches: usize,
}

/// Outcome of a written world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionReport {
    /// World directory.
    pub world_dir: PathBuf,
    /// Chunk files written.
    pub columns: usize,
    /// Total compressed chunk bytes.
    pub size_on_disk: u64,
    /// Exported levels.
    pub levels: usize,
    /// Player spawn.
    pub spawn: Spawn,
}

/// Converts `source` into a lit grid.
///
/// # Errors
///
/// Returns `InvalidArea` or `AreaTooSmall` before allocating, `Core` if
/// the grid cannot be allocated or the unknown-feature log cannot be saved.
pub fn render<S: WorldSource + ?Sized>(
    ctx: &mut ConversionContext,
    source: &S,
) -> RunResult<RenderedWorld> {
    let extent = source.extent();
    let area = ClipArea::resolve(&ctx.settings.clip, extent)?;
    let s = ctx.settings.cube_size;

    let levels = select_levels(
        &ctx.settings.vertical,
        s,
        extent.levels as usize,
        |z, probe| level_has(source, &area, z, probe),
    );

    let x_size = area.cells_y() as usize * s;
    let y_size = area.cells_x() as usize * s;
    if x_size == 0 || y_size == 0 || levels.kept_count() == 0 {
        return Err(RunError::AreaTooSmall {
            x: x_size,
            y: y_size,
            levels: levels.kept_count(),
        });
    }
    info!(x_size, y_size, z_size = GRID_HEIGHT, cube_size = s, "allocating grid");
    let mut grid = VoxelGrid::try_new(x_size, y_size, GRID_HEIGHT)?;

    let transform = GridTransform {
        cube_size: s,
        x_offset_blocks: area.x_min,
        y_offset_blocks: area.y_min,
        y_size,
    };
    let stamper = Stamper::new(transform, &ctx.gravity, ctx.settings.safe_sand);
    let mut converter = TileConverter::new(&mut ctx.resolver, &ctx.settings, stamper);

    for (z, zcount) in levels.iter() {
        let next_kept = levels.is_kept(z + 1);
        for (x, y) in area.cells() {
            let site = TileSite {
                x,
                y,
                z: z as u32,
                zcount,
                next_kept,
            };
            converter.convert_tile(source, &mut grid, site);
        }
        info!(level = z, output_level = zcount, "level converted");
        converter.resolver().stats().log_summary();
    }
    let saw_ice = converter.saw_ice();
    let torches = converter.torches();
    info!(torches, "tiles converted");

    // Laid after conversion so bottom-level sand still sees air below it.
    grid.fill_floor(ctx.settings.floor_material);
    ctx.save_unknown()?;

    let spawn = place_spawn(&grid, source.cursor(), &levels, &area, s);

    info!("computing light");
    compute_lighting(&mut grid, &ctx.opacity);

    Ok(RenderedWorld {
        grid,
        levels,
        area,
        spawn,
        saw_ice,
        torches,
    })
}

fn now_ms() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(_) => {
            warn!("system clock is before the unix epoch");
            0
        }
    }
}

/// Writes a rendered world under the configured output directory.
///
/// # Errors
///
/// Returns `Export` for directory, compression or write failures.
pub fn export(ctx: &ConversionContext, world: &RenderedWorld) -> RunResult<ConversionReport> {
    let settings = &ctx.settings;
    let mut writer = WorldWriter::create(&settings.output_dir, &settings.world_name)?;
    writer.write_columns(&world.grid)?;

    let info = LevelInfo {
        snow_covered: snow_flag(settings.snowy, world.saw_ice),
        last_played_ms: now_ms(),
        seed: settings.effective_seed(),
        spawn: world.spawn.level_point(),
        size_on_disk: i64::try_from(writer.size_on_disk()).unwrap_or(i64::MAX),
    };
    writer.write_level(&info)?;

    Ok(ConversionReport {
        world_dir: writer.root().to_path_buf(),
        columns: writer.columns_written(),
        size_on_disk: writer.size_on_disk(),
        levels: world.levels.kept_count(),
        spawn: world.spawn,
    })
}

/// Renders and writes `source` with an existing context.
///
/// # Errors
///
/// See [`render`] and [`export`].
pub fn convert<S: WorldSource + ?Sized>(
    ctx: &mut ConversionContext,
    source: &S,
) -> RunResult<ConversionReport> {
    let world = render(ctx, source)?;
    export(ctx, &world)
}

/// Loads the configuration and world snapshot, then converts.
///
/// # Errors
///
/// Returns `Load` if either file cannot be read, then anything
/// [`convert`] returns.
pub fn run(config_path: &Path, world_path: &Path) -> RunResult<ConversionReport> {
    let config = Config::from_path(config_path).map_err(|source| RunError::Load {
        what: "configuration",
        source,
    })?;
    let mut ctx = ConversionContext::from_config(&config).map_err(|source| RunError::Load {
        what: "unknown feature log",
        source,
    })?;
    let world = WorldSnapshot::from_path(world_path).map_err(|source| RunError::Load {
        what: "world snapshot",
        source,
    })?;
    let report = convert(&mut ctx, &world)?;
    info!(
        world = %report.world_dir.display(),
        columns = report.columns,
        bytes = report.size_on_disk,
        "conversion finished"
    );
    Ok(report)
}
