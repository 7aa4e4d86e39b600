//! # Level Descriptor
//!
//! The `level.dat` document: world flags, spawn point and a starter player
//! with a fixed kit.

use voxmorph_nbt::{Compound, NamedTag, NbtResult, Tag, TagType};

/// Value of the root `GeneratedBy` string.
pub const GENERATED_BY: &str = concat!("voxmorph ", env!("CARGO_PKG_VERSION"));

/// Starter inventory: `(item id, count, slot)`.
const STARTER_KIT: [(i16, i8, i8); 15] = [
    (276, 1, 1),
    (277, 1, 2),
    (278, 1, 3),
    (279, 1, 4),
    (293, 1, 5),
    (261, 1, 6),
    (345, 1, 8),
    (280, 64, 18),
    (263, 64, 19),
    (282, 64, 20),
    (262, 64, 21),
    (310, 1, 27),
    (311, 1, 28),
    (312, 1, 29),
    (313, 1, 30),
];

/// Spawn point in output coordinates. `height` is the vertical axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnPoint {
    /// Output x.
    pub x: i32,
    /// Output height of the block the player stands in.
    pub height: i32,
    /// Output z.
    pub z: i32,
}

/// Everything `level.dat` records about a finished world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelInfo {
    /// `SnowCovered` flag.
    pub snow_covered: bool,
    /// `LastPlayed`, milliseconds since the epoch.
    pub last_played_ms: i64,
    /// `RandomSeed`.
    pub seed: i64,
    /// Spawn block.
    pub spawn: SpawnPoint,
    /// Sum of compressed chunk file sizes.
    pub size_on_disk: i64,
}

/// Resolves the snow flag from the `snowy` setting: zero follows whether
/// the world contains ice, positive forces snow, negative forbids it.
#[must_use]
pub const fn snow_flag(snowy: i32, has_ice: bool) -> bool {
    match snowy {
        0 => has_ice,
        s => s > 0,
    }
}

fn player(spawn: SpawnPoint) -> NbtResult<Compound> {
    let inventory = STARTER_KIT
        .iter()
        .map(|&(id, count, slot)| {
            Compound::new()
                .short("id", id)
                .byte("Count", count)
                .byte("Slot", slot)
                .short("Damage", 0)
                .into_tag()
        })
        .collect();

    let pos = vec![
        Tag::Double(f64::from(spawn.x) + 0.5),
        Tag::Double(f64::from(spawn.height) + 0.05),
        Tag::Double(f64::from(spawn.z) + 0.5),
    ];

    Compound::new()
        .short("Health", 20)
        .byte("OnGround", 1)
        .short("Air", 256)
        .short("Fire", -20)
        .short("HurtTime", 0)
        .short("DeathTime", 0)
        .short("AttackTime", 0)
        .int("Score", 0)
        .float("FallDistance", 0.0)
        .list("Inventory", TagType::Compound, inventory)?
        .list("Pos", TagType::Double, pos)?
        .list("Rotation", TagType::Float, vec![Tag::Float(0.0); 2])?
        .list("Motion", TagType::Double, vec![Tag::Double(0.0); 3])
}

/// Builds the `level.dat` document.
///
/// # Errors
///
/// Returns an error only if a list is built with mismatched element types.
pub fn level_document(info: &LevelInfo) -> NbtResult<NamedTag> {
    let data = Compound::new()
        .byte("SnowCovered", i8::from(info.snow_covered))
        .long("LastPlayed", info.last_played_ms)
        .long("Time", 0)
        .long("RandomSeed", info.seed)
        .compound("Player", player(info.spawn)?)
        .int("SpawnX", info.spawn.x)
        .int("SpawnY", info.spawn.height)
        .int("SpawnZ", info.spawn.z)
        .long("SizeOnDisk", info.size_on_disk);

    Ok(Compound::new()
        .compound("Data", data)
        .string("GeneratedBy", GENERATED_BY)
        .into_named(""))
}
