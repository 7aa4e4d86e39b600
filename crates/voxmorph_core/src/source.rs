//! # World Source
//!
//! Read-only view of the source world. The converter only needs per-cell
//! tile descriptions plus the location-keyed building, construction and
//! vegetation records, so that is all [`WorldSource`] exposes.
//!
//! [`WorldSnapshot`] is the in-memory implementation, loadable from TOML:
//!
//! ```toml
//! [world]
//! blocks_x = 1
//! blocks_y = 1
//! levels = 4
//!
//! [[regions]]
//! from = [0, 0, 0]
//! to = [15, 15, 0]
//! shape = "wall"
//! material = "stone"
//! layer_material = "granite"
//!
//! [[tiles]]
//! x = 8
//! y = 8
//! z = 1
//! shape = "floor"
//! material = "stone"
//! name = "stone floor"
//! ```
//!
//! Cells not listed in a region or tile are empty air.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::index::PackedIndex;

/// Cells along each horizontal side of a source block.
pub const CELLS_PER_BLOCK: u32 = 16;

/// Shape of a source cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeClass {
    /// Open space.
    #[default]
    Empty,
    /// Solid wall.
    Wall,
    /// Free-standing pillar.
    Pillar,
    /// Bed of a brook.
    #[serde(rename = "brook_bed")]
    BrookBed,
    /// Fortification.
    Fortification,
    /// Up staircase.
    StairUp,
    /// Down staircase.
    StairDown,
    /// Up/down staircase.
    StairUpDown,
    /// Ramp.
    Ramp,
    /// Space above a ramp.
    RampTop,
    /// Floor.
    Floor,
    /// Surface of a brook.
    #[serde(rename = "brook_top")]
    BrookTop,
    /// Bed of a river.
    #[serde(rename = "river_bed")]
    RiverBed,
    /// Pool.
    Pool,
    /// Dead tree.
    TreeDead,
    /// Living tree.
    Tree,
    /// Dead sapling.
    SaplingDead,
    /// Living sapling.
    Sapling,
    /// Dead shrub.
    ShrubDead,
    /// Living shrub.
    Shrub,
    /// Boulder.
    Boulder,
    /// Pebbles.
    Pebbles,
    /// Bottomless pit.
    #[serde(rename = "endless_pit")]
    EndlessPit,
}

impl ShapeClass {
    /// Class name used in template keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Wall => "wall",
            Self::Pillar => "pillar",
            Self::BrookBed => "brook_bed",
            Self::Fortification => "fortification",
            Self::StairUp => "stairup",
            Self::StairDown => "stairdown",
            Self::StairUpDown => "stairupdown",
            Self::Ramp => "ramp",
            Self::RampTop => "ramptop",
            Self::Floor => "floor",
            Self::BrookTop => "brook_top",
            Self::RiverBed => "river_bed",
            Self::Pool => "pool",
            Self::TreeDead => "treedead",
            Self::Tree => "tree",
            Self::SaplingDead => "saplingdead",
            Self::Sapling => "sapling",
            Self::ShrubDead => "shrubdead",
            Self::Shrub => "shrub",
            Self::Boulder => "boulder",
            Self::Pebbles => "pebbles",
            Self::EndlessPit => "endless_pit",
        }
    }

    /// Trees, saplings and shrubs, dead or alive.
    #[must_use]
    pub const fn is_plant(self) -> bool {
        matches!(
            self,
            Self::TreeDead | Self::Tree | Self::SaplingDead | Self::Sapling | Self::ShrubDead | Self::Shrub
        )
    }

    /// Shapes a ramp or directional wall leans against.
    #[must_use]
    pub const fn is_wall_like(self) -> bool {
        matches!(self, Self::Wall | Self::Pillar | Self::Fortification)
    }

    /// Any staircase.
    #[must_use]
    pub const fn is_stair(self) -> bool {
        matches!(self, Self::StairUp | Self::StairDown | Self::StairUpDown)
    }
}

/// Broad material class of a source cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialClass {
    /// No material.
    #[default]
    Air,
    /// Soil.
    Soil,
    /// Layer stone.
    Stone,
    /// Feature stone.
    FeatStone,
    /// Obsidian.
    Obsidian,
    /// Mineral vein.
    Vein,
    /// Ice.
    Ice,
    /// Grass.
    Grass,
    /// Second grass kind.
    Grass2,
    /// Dead grass.
    GrassDead,
    /// Dry grass.
    GrassDry,
    /// Driftwood.
    Driftwood,
    /// Deep underworld material.
    Hfs,
    /// Magma.
    Magma,
    /// Campfire.
    Campfire,
    /// Fire.
    Fire,
    /// Ashes.
    Ashes,
    /// Player construction.
    Constructed,
    /// Glowing fungus.
    Cyanglow,
}

impl MaterialClass {
    /// Class name used as the base category of material lookups.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Soil => "soil",
            Self::Stone => "stone",
            Self::FeatStone => "featstone",
            Self::Obsidian => "obsidian",
            Self::Vein => "vein",
            Self::Ice => "ice",
            Self::Grass => "grass",
            Self::Grass2 => "grass2",
            Self::GrassDead => "grassdead",
            Self::GrassDry => "grassdry",
            Self::Driftwood => "driftwood",
            Self::Hfs => "hfs",
            Self::Magma => "magma",
            Self::Campfire => "campfire",
            Self::Fire => "fire",
            Self::Ashes => "ashes",
            Self::Constructed => "constructed",
            Self::Cyanglow => "cyanglow",
        }
    }
}

/// Feature-level material override for a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureOverride {
    /// The feature is made of the named stone.
    Stone(String),
    /// The feature is not stone; the cell has no specific material.
    NonStone,
}

/// Liquid occupying a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidKind {
    /// Water.
    #[default]
    Water,
    /// Magma.
    Magma,
}

impl LiquidKind {
    /// Name used in flow keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Magma => "magma",
        }
    }
}

/// Everything the converter reads about one source cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTile {
    /// Shape class.
    pub shape: ShapeClass,
    /// Material class.
    pub material: MaterialClass,
    /// Visual variant.
    pub variant: i32,
    /// Tile description, absent for undescribed tile types.
    pub name: Option<String>,
    /// Geological layer material.
    pub layer_material: Option<String>,
    /// Mineral vein replacing the layer material.
    pub vein: Option<String>,
    /// Feature override applied after veins.
    pub feature: Option<FeatureOverride>,
    /// Liquid depth, 0 to 7.
    pub flow_size: u8,
    /// Liquid kind when `flow_size > 0`.
    pub liquid: LiquidKind,
    /// Cell is lit.
    pub lit: bool,
    /// Cell sees the sky.
    pub skyview: bool,
    /// Cell is subterranean.
    pub subterranean: bool,
    /// Cell is covered in spatter (mud, blood and the like).
    pub spattered: bool,
}

/// Typed reference to a source material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRef {
    /// Material type code.
    pub kind: i32,
    /// Index into the type's name table, if any.
    #[serde(default)]
    pub index: Option<u32>,
}

/// Form of a constructed cell's material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructionForm {
    /// Bars.
    Bar,
    /// Blocks.
    #[default]
    Block,
    /// Raw boulders.
    Boulder,
    /// Logs.
    Logs,
    /// Anything else.
    #[serde(other)]
    Other,
}

impl ConstructionForm {
    /// Base material name for the form.
    #[must_use]
    pub const fn base_material(self) -> &'static str {
        match self {
            Self::Bar => "bars",
            Self::Block => "blocks",
            Self::Boulder => "stone",
            Self::Logs => "logs",
            Self::Other => "unknown",
        }
    }

    /// Form implied by a building's material type.
    #[must_use]
    pub const fn for_building(material: MaterialRef) -> Self {
        match material.kind {
            0 => Self::Boulder,
            420 => Self::Logs,
            _ => Self::Block,
        }
    }
}

/// A player construction at one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionRecord {
    /// Material form.
    pub form: ConstructionForm,
    /// Material used.
    pub material: MaterialRef,
}

/// Name tables for typed material references.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialNames {
    /// Inorganic materials (type 0).
    pub inorganic: Vec<String>,
    /// Organic materials (type 420).
    pub organic: Vec<String>,
    /// Plant materials (types 421 and 422).
    pub plant: Vec<String>,
}

impl MaterialNames {
    /// Name of a construction material.
    #[must_use]
    pub fn construction_material(&self, material: MaterialRef) -> String {
        let lookup = |table: &[String], fallback: &str| {
            material
                .index
                .and_then(|i| table.get(i as usize))
                .map_or_else(|| fallback.to_owned(), Clone::clone)
        };
        match material.kind {
            0 => lookup(&self.inorganic, "inorganic"),
            420 => lookup(&self.organic, "organic"),
            421 | 422 => lookup(&self.plant, "plant"),
            7 => "coal".to_owned(),
            9 => "ashes".to_owned(),
            3 | 13 => "greenglass".to_owned(),
            4 | 14 => "clearglass".to_owned(),
            5 | 15 => "crystalglass".to_owned(),
            18 => "charcoal".to_owned(),
            8 | 19 => "potash".to_owned(),
            20 => "ash".to_owned(),
            10 | 21 => "perlash".to_owned(),
            39 => "soap".to_owned(),
            kind => {
                let index = material.index.map_or(-1, i64::from);
                if kind > 0 {
                    debug!(kind, index, "unknown construction material");
                }
                format!("unknown_{kind}_{index}")
            }
        }
    }

    /// Base material and construction material of a constructed cell.
    #[must_use]
    pub fn construction_materials(&self, record: &ConstructionRecord) -> (String, String) {
        (
            record.form.base_material().to_owned(),
            self.construction_material(record.material),
        )
    }
}

/// A building rectangle on one level, as read from the source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingFootprint {
    /// Raw type name, e.g. `building_tablest`.
    #[serde(rename = "type")]
    pub kind: String,
    /// First x, inclusive.
    pub x1: u32,
    /// First y, inclusive.
    pub y1: u32,
    /// Last x, inclusive.
    pub x2: u32,
    /// Last y, inclusive.
    pub y2: u32,
    /// Level.
    pub z: u32,
    /// Building material.
    #[serde(default)]
    pub material: MaterialRef,
}

/// One cell of a building.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildingRecord {
    /// Cleaned type name, e.g. `table`.
    pub kind: String,
    /// Position within the footprint, e.g. `only` or `x1ymax`.
    pub position: String,
    /// Building material.
    pub material: MaterialRef,
}

impl BuildingRecord {
    /// Template class name: `type.position`.
    #[must_use]
    pub fn class_name(&self) -> String {
        format!("{}.{}", self.kind, self.position)
    }
}

/// Building cells keyed by location.
#[derive(Clone, Debug, Default)]
pub struct BuildingIndex {
    records: HashMap<PackedIndex, BuildingRecord>,
}

impl BuildingIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands a footprint into one record per covered cell. Stockpiles
    /// never replace an existing record; other buildings always do.
    pub fn insert_footprint(&mut self, footprint: &BuildingFootprint) {
        let kind = clean_building_type(&footprint.kind);
        let stockpile = kind == "stockpile";
        for x in footprint.x1..=footprint.x2 {
            for y in footprint.y1..=footprint.y2 {
                let Some(at) = PackedIndex::checked(x, y, footprint.z) else {
                    continue;
                };
                if stockpile && self.records.contains_key(&at) {
                    continue;
                }
                self.records.insert(
                    at,
                    BuildingRecord {
                        kind: kind.clone(),
                        position: position_descriptor(footprint, x, y),
                        material: footprint.material,
                    },
                );
            }
        }
    }

    /// Record at a location.
    #[must_use]
    pub fn get(&self, at: PackedIndex) -> Option<&BuildingRecord> {
        self.records.get(&at)
    }

    /// Number of building cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no buildings are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Strips a `building_` prefix and a trailing `st`.
fn clean_building_type(raw: &str) -> String {
    let name = raw.strip_prefix("building_").unwrap_or(raw);
    match name.strip_suffix("st") {
        Some(stem) if name.len() > 2 => stem.to_owned(),
        _ => name.to_owned(),
    }
}

fn position_descriptor(fp: &BuildingFootprint, x: u32, y: u32) -> String {
    let single_x = fp.x1 == fp.x2;
    let single_y = fp.y1 == fp.y2;
    let dx = x - fp.x1;
    let dy = y - fp.y1;
    match (single_x, single_y) {
        (true, true) => "only".to_owned(),
        (true, false) if y == fp.y2 => "xonlyymax".to_owned(),
        (true, false) => format!("xonlyy{dy}"),
        (false, true) if x == fp.x2 => "xmaxyonly".to_owned(),
        (false, true) => format!("x{dx}yonly"),
        (false, false) => match (x == fp.x2, y == fp.y2) {
            (true, true) => "xmaxymax".to_owned(),
            (true, false) => format!("xmaxy{dy}"),
            (false, true) => format!("x{dx}ymax"),
            (false, false) => format!("x{dx}y{dy}"),
        },
    }
}

/// World size: horizontal extent in blocks of 16 cells, plus levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldExtent {
    /// Blocks along x.
    pub blocks_x: u32,
    /// Blocks along y.
    pub blocks_y: u32,
    /// Number of levels.
    pub levels: u32,
}

impl WorldExtent {
    /// Cells along x.
    #[must_use]
    pub const fn cells_x(self) -> u32 {
        self.blocks_x * CELLS_PER_BLOCK
    }

    /// Cells along y.
    #[must_use]
    pub const fn cells_y(self) -> u32 {
        self.blocks_y * CELLS_PER_BLOCK
    }

    /// True if the signed location lies inside the world.
    #[must_use]
    pub fn contains(self, x: i32, y: i32, z: i32) -> bool {
        u32::try_from(x).is_ok_and(|x| x < self.cells_x())
            && u32::try_from(y).is_ok_and(|y| y < self.cells_y())
            && u32::try_from(z).is_ok_and(|z| z < self.levels)
    }
}

/// Operator cursor in source coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Source x.
    pub x: i32,
    /// Source y.
    pub y: i32,
    /// Source level.
    pub z: i32,
}

/// Read-only access to the source world.
pub trait WorldSource {
    /// World size.
    fn extent(&self) -> WorldExtent;

    /// Tile at a location, `None` outside the world.
    fn tile(&self, x: i32, y: i32, z: i32) -> Option<&SourceTile>;

    /// Building cell at a location.
    fn building(&self, at: PackedIndex) -> Option<&BuildingRecord>;

    /// Construction at a location.
    fn construction(&self, at: PackedIndex) -> Option<&ConstructionRecord>;

    /// Plant material name at a location.
    fn plant(&self, at: PackedIndex) -> Option<&str>;

    /// Material name tables.
    fn names(&self) -> &MaterialNames;

    /// Operator cursor, if placed.
    fn cursor(&self) -> Option<Cursor>;
}

#[derive(Deserialize)]
struct TileEntry {
    x: u32,
    y: u32,
    z: u32,
    #[serde(flatten)]
    tile: SourceTile,
}

#[derive(Deserialize)]
struct RegionEntry {
    from: [u32; 3],
    to: [u32; 3],
    #[serde(flatten)]
    tile: SourceTile,
}

#[derive(Deserialize)]
struct LocatedConstruction {
    x: u32,
    y: u32,
    z: u32,
    #[serde(flatten)]
    record: ConstructionRecord,
}

#[derive(Deserialize)]
struct LocatedPlant {
    x: u32,
    y: u32,
    z: u32,
    name: String,
}

#[derive(Deserialize)]
struct SnapshotFile {
    world: WorldExtent,
    #[serde(default)]
    names: MaterialNames,
    #[serde(default)]
    cursor: Option<Cursor>,
    #[serde(default)]
    regions: Vec<RegionEntry>,
    #[serde(default)]
    tiles: Vec<TileEntry>,
    #[serde(default)]
    buildings: Vec<BuildingFootprint>,
    #[serde(default)]
    constructions: Vec<LocatedConstruction>,
    #[serde(default)]
    plants: Vec<LocatedPlant>,
}

/// In-memory world snapshot.
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    extent: WorldExtent,
    empty: SourceTile,
    tiles: HashMap<PackedIndex, SourceTile>,
    buildings: BuildingIndex,
    constructions: HashMap<PackedIndex, ConstructionRecord>,
    plants: HashMap<PackedIndex, String>,
    names: MaterialNames,
    cursor: Option<Cursor>,
}

impl WorldSnapshot {
    /// Creates an all-empty world.
    #[must_use]
    pub fn new(extent: WorldExtent) -> Self {
        Self {
            extent,
            ..Self::default()
        }
    }

    /// Parses a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid snapshot TOML.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let file: SnapshotFile = toml::from_str(text).map_err(|source| CoreError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        Ok(Self::from_file(file))
    }

    /// Reads and parses a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: SnapshotFile = toml::from_str(&text).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: SnapshotFile) -> Self {
        let mut world = Self::new(file.world);
        world.names = file.names;
        world.cursor = file.cursor;
        for region in file.regions {
            let [x1, y1, z1] = region.from;
            let [x2, y2, z2] = region.to;
            for z in z1..=z2 {
                for x in x1..=x2 {
                    for y in y1..=y2 {
                        world.set_tile(x, y, z, region.tile.clone());
                    }
                }
            }
        }
        for entry in file.tiles {
            world.set_tile(entry.x, entry.y, entry.z, entry.tile);
        }
        for footprint in &file.buildings {
            world.buildings.insert_footprint(footprint);
        }
        for c in file.constructions {
            world.add_construction(c.x, c.y, c.z, c.record);
        }
        for p in file.plants {
            world.add_plant(p.x, p.y, p.z, p.name);
        }
        debug!(
            tiles = world.tiles.len(),
            buildings = world.buildings.len(),
            constructions = world.constructions.len(),
            plants = world.plants.len(),
            "world snapshot loaded"
        );
        world
    }

    /// Sets one tile.
    pub fn set_tile(&mut self, x: u32, y: u32, z: u32, tile: SourceTile) {
        if let Some(at) = PackedIndex::checked(x, y, z) {
            self.tiles.insert(at, tile);
        }
    }

    /// Adds a building footprint.
    pub fn add_building(&mut self, footprint: &BuildingFootprint) {
        self.buildings.insert_footprint(footprint);
    }

    /// Adds a construction.
    pub fn add_construction(&mut self, x: u32, y: u32, z: u32, record: ConstructionRecord) {
        if let Some(at) = PackedIndex::checked(x, y, z) {
            self.constructions.insert(at, record);
        }
    }

    /// Adds a plant.
    pub fn add_plant(&mut self, x: u32, y: u32, z: u32, name: impl Into<String>) {
        if let Some(at) = PackedIndex::checked(x, y, z) {
            self.plants.insert(at, name.into());
        }
    }

    /// Sets the operator cursor.
    pub fn set_cursor(&mut self, cursor: Option<Cursor>) {
        self.cursor = cursor;
    }

    /// Mutable name tables.
    pub fn names_mut(&mut self) -> &mut MaterialNames {
        &mut self.names
    }
}

impl WorldSource for WorldSnapshot {
    fn extent(&self) -> WorldExtent {
        self.extent
    }

    fn tile(&self, x: i32, y: i32, z: i32) -> Option<&SourceTile> {
        if !self.extent.contains(x, y, z) {
            return None;
        }
        let at = PackedIndex::from_signed(x, y, z)?;
        Some(self.tiles.get(&at).unwrap_or(&self.empty))
    }

    fn building(&self, at: PackedIndex) -> Option<&BuildingRecord> {
        self.buildings.get(at)
    }

    fn construction(&self, at: PackedIndex) -> Option<&ConstructionRecord> {
        self.constructions.get(&at)
    }

    fn plant(&self, at: PackedIndex) -> Option<&str> {
        self.plants.get(&at).map(String::as_str)
    }

    fn names(&self) -> &MaterialNames {
        &self.names
    }

    fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }
}
