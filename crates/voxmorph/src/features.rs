//! # Per-Tile Feature Conversion
//!
//! Turns one source tile into stamped templates, in this order:
//!
//! 1. the tile itself: a plant (`<shape>.<plant>`), a ramp with its
//!    direction, a stair suffixed with `output level mod 4`, or any other
//!    shape, optionally directional
//! 2. a tree top (`treetop.<plant>`) one level up when that level is exported
//! 3. the building occupying the cell, turned towards its face-to type or
//!    away from walls
//! 4. liquid (`water.<n>` or `magma.<n>`)
//! 5. a torch on dark, clean floors, by chance
//!
//! Every stamp fills only empty cells, so earlier features win.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use voxmorph_core::direction::{building_direction, object_direction, ProbeKind};
use voxmorph_core::source::{
    ConstructionForm, ConstructionRecord, FeatureOverride, MaterialClass, ShapeClass, SourceTile,
};
use voxmorph_core::stats::{StatArea, StatKind};
use voxmorph_core::{
    normalize_key, Lookup, MaterialQuery, PackedIndex, Resolver, Settings, Stamper, VoxelGrid,
    VoxelTemplate, WorldSource,
};

/// Location of one tile in the source world and in the output stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSite {
    /// Source x.
    pub x: u32,
    /// Source y.
    pub y: u32,
    /// Source level.
    pub z: u32,
    /// Output level of `z`.
    pub zcount: usize,
    /// Whether source level `z + 1` is exported too.
    pub next_kept: bool,
}

impl TileSite {
    const fn signed(self) -> (i32, i32, i32) {
        (self.x as i32, self.y as i32, self.z as i32)
    }
}

/// Natural material of a tile: a feature override beats a vein, a vein
/// beats the geological layer.
fn natural_material(tile: &SourceTile) -> Option<String> {
    match &tile.feature {
        Some(FeatureOverride::Stone(name)) => Some(name.clone()),
        Some(FeatureOverride::NonStone) => None,
        None => tile.vein.clone().or_else(|| tile.layer_material.clone()),
    }
}

fn is_smooth(name: Option<&str>) -> bool {
    name.and_then(|n| n.get(..6))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("smooth"))
}

/// Converts tiles into stamped templates.
pub struct TileConverter<'a> {
    resolver: &'a mut Resolver,
    settings: &'a Settings,
    stamper: Stamper<'a>,
    rng: ChaCha8Rng,
    saw_ice: bool,
    torches: usize,
}

impl<'a> TileConverter<'a> {
    /// Creates a converter. Torch placement is seeded from the settings.
    #[must_use]
    pub fn new(resolver: &'a mut Resolver, settings: &'a Settings, stamper: Stamper<'a>) -> Self {
        Self {
            resolver,
            settings,
            stamper,
            rng: ChaCha8Rng::seed_from_u64(settings.effective_seed() as u64),
            saw_ice: false,
            torches: 0,
        }
    }

    /// Whether any converted tile was ice.
    #[must_use]
    pub const fn saw_ice(&self) -> bool {
        self.saw_ice
    }

    /// Torches placed so far.
    #[must_use]
    pub const fn torches(&self) -> usize {
        self.torches
    }

    /// Read access to the resolver, e.g. for statistics.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        self.resolver
    }

    fn stamp(&self, grid: &mut VoxelGrid, template: &VoxelTemplate, site: TileSite, zcount: usize) {
        self.stamper.stamp(grid, template, (site.x, site.y, zcount), false);
    }

    /// Converts the tile at `site` and stamps everything it produces.
    pub fn convert_tile<S: WorldSource + ?Sized>(
        &mut self,
        source: &S,
        grid: &mut VoxelGrid,
        site: TileSite,
    ) {
        let (x, y, z) = site.signed();
        let Some(tile) = source.tile(x, y, z) else {
            return;
        };
        let Some(at) = PackedIndex::checked(site.x, site.y, site.z) else {
            return;
        };

        let (smat, cmat) = if tile.material == MaterialClass::Constructed {
            match source.construction(at) {
                Some(record) => {
                    let (form, material) = source.names().construction_materials(record);
                    (Some(form), Some(material))
                }
                None => (Some("unknown".to_owned()), Some("unknown".to_owned())),
            }
        } else {
            (natural_material(tile), None)
        };

        let base = tile.material.name();
        let full = tile.name.as_deref();
        let mut variant = tile.variant;
        let plant = source.plant(at);

        if tile.material == MaterialClass::Ice {
            self.saw_ice = true;
        }
        if tile.name.is_none() && tile.shape != ShapeClass::Empty {
            debug!(x, y, z, shape = tile.shape.name(), "tile type has no description");
            self.resolver
                .stats_mut()
                .bump(StatArea::Terrain, StatKind::Unknown);
        }

        let template = if tile.shape.is_plant() {
            let classname = match plant {
                Some(p) => format!("{}.{p}", tile.shape.name()),
                None => {
                    debug!(x, y, z, "plant tile without vegetation record");
                    tile.shape.name().to_owned()
                }
            };
            let query = MaterialQuery {
                base,
                variant,
                full,
                smat: smat.as_deref(),
                cmat: None,
            };
            self.resolver.plant(&classname, &query)
        } else {
            let classname = match tile.shape {
                ShapeClass::Ramp => {
                    let dir =
                        object_direction(source, self.resolver, (x, y, z), "ramp", ProbeKind::Terrain);
                    format!("ramp{dir}")
                }
                shape if shape.is_stair() => format!("{}{}", shape.name(), site.zcount % 4),
                shape => {
                    if is_smooth(full) {
                        variant += 10;
                    }
                    if self.settings.directional_walls {
                        let dir = object_direction(
                            source,
                            self.resolver,
                            (x, y, z),
                            shape.name(),
                            ProbeKind::Terrain,
                        );
                        format!("{}{dir}", shape.name())
                    } else {
                        shape.name().to_owned()
                    }
                }
            };
            let query = MaterialQuery {
                base,
                variant,
                full,
                smat: smat.as_deref(),
                cmat: cmat.as_deref(),
            };
            self.resolver
                .terrain(&classname, &query, Lookup::Record)
                .unwrap_or_else(|| self.resolver.air())
        };
        self.stamp(grid, &template, site, site.zcount);

        if tile.shape == ShapeClass::Tree && site.next_kept {
            let classname = format!("treetop.{}", plant.unwrap_or_default());
            let query = MaterialQuery {
                base: "air",
                variant,
                full,
                smat: smat.as_deref(),
                cmat: None,
            };
            let top = self.resolver.plant(&classname, &query);
            self.stamp(grid, &top, site, site.zcount + 1);
        }

        if let Some(building) = source.building(at) {
            let record = ConstructionRecord {
                form: ConstructionForm::for_building(building.material),
                material: building.material,
            };
            let (mat, _) = source.names().construction_materials(&record);
            let classname = building.class_name();
            let face = self
                .resolver
                .library()
                .face_for(&normalize_key(&building.kind))
                .map(str::to_owned);
            let dir = building_direction(source, self.resolver, (x, y, z), &classname, face.as_deref());
            let template = self
                .resolver
                .building(&classname, dir, &mat, Some("building"), Lookup::Record)
                .unwrap_or_else(|| self.resolver.air());
            self.stamp(grid, &template, site, site.zcount);
        }

        if tile.flow_size > 0 {
            let classname = format!("{}.{}", tile.liquid.name(), tile.flow_size);
            let template = self.resolver.flow(&classname);
            self.stamp(grid, &template, site, site.zcount);
        }

        if tile.shape == ShapeClass::Floor && !tile.spattered {
            self.maybe_torch(source, grid, tile, site);
        }
    }

    fn torch_chance(&self, tile: &SourceTile) -> u32 {
        let mut percent = 0;
        if !tile.skyview {
            percent = percent.max(self.settings.torch_inside_percent);
        }
        if !tile.lit {
            percent = percent.max(self.settings.torch_dark_percent);
        }
        if tile.subterranean {
            percent = percent.max(self.settings.torch_subterranean_percent);
        }
        percent
    }

    fn maybe_torch<S: WorldSource + ?Sized>(
        &mut self,
        source: &S,
        grid: &mut VoxelGrid,
        tile: &SourceTile,
        site: TileSite,
    ) {
        if tile.lit && tile.skyview && !tile.subterranean {
            return;
        }
        let percent = self.torch_chance(tile);
        if self.rng.gen_range(0..100) >= percent {
            return;
        }
        let face = self.resolver.library().face_for("torch").map(str::to_owned);
        let dir = building_direction(source, self.resolver, site.signed(), "torch", face.as_deref());
        let template = self
            .resolver
            .building("torch", dir, "air", None, Lookup::Record)
            .unwrap_or_else(|| self.resolver.air());
        self.stamp(grid, &template, site, site.zcount);
        self.torches += 1;
    }
}
