//! # Neighbour Directions
//!
//! Directional features are named after the neighbours they lean against.
//! Neighbours are numbered like a keypad seen from above, with the feature
//! itself at 5:
//!
//! ```text
//! 1 2 3
//! 4 5 6
//! 7 8 9
//! ```
//!
//! A direction is the concatenation of qualifying digits in ascending
//! order, so walls to the west, south-west and south give `478`. The full
//! eight-neighbour name is tried first, then the cardinal-only name
//! (`48`), then no direction at all.

use crate::cascade::{Lookup, Resolver};
use crate::index::PackedIndex;
use crate::key::MaterialQuery;
use crate::source::WorldSource;

/// All neighbours, pass one.
pub const NEIGHBOR_DIGITS: [u8; 8] = [1, 2, 3, 4, 6, 7, 8, 9];

/// Cardinal neighbours, pass two.
pub const CARDINAL_DIGITS: [u8; 4] = [2, 4, 6, 8];

/// Source-grid offset of a neighbour digit.
#[inline]
#[must_use]
pub const fn neighbor_offset(digit: u8) -> (i32, i32) {
    let i = digit as i32 - 1;
    (i % 3 - 1, i / 3 - 1)
}

/// Which template category a direction is probed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeKind {
    /// Terrain named `class` + digits.
    Terrain,
    /// Building named `class.-digits`.
    Building,
}

fn collect_digits(digits: &[u8], mut qualifies: impl FnMut(i32, i32) -> bool) -> String {
    digits
        .iter()
        .filter(|&&d| {
            let (ox, oy) = neighbor_offset(d);
            qualifies(ox, oy)
        })
        .map(|&d| char::from(b'0' + d))
        .collect()
}

fn parse_direction(dir: &str) -> i32 {
    dir.parse().unwrap_or(0)
}

/// Finds the wall-facing direction of a feature at `(x, y, z)`.
///
/// Returns the digit string of the first pass whose name exists in the
/// template library, or an empty string.
pub fn object_direction<S: WorldSource + ?Sized>(
    source: &S,
    resolver: &mut Resolver,
    (x, y, z): (i32, i32, i32),
    classname: &str,
    kind: ProbeKind,
) -> String {
    for digits in [&NEIGHBOR_DIGITS[..], &CARDINAL_DIGITS[..]] {
        let dir = collect_digits(digits, |ox, oy| {
            source
                .tile(x + ox, y + oy, z)
                .is_some_and(|t| t.shape.is_wall_like())
        });
        let found = match kind {
            ProbeKind::Terrain => resolver
                .terrain(
                    &format!("{classname}{dir}"),
                    &MaterialQuery::base("air"),
                    Lookup::Probe,
                )
                .is_some(),
            ProbeKind::Building => resolver
                .building(classname, -parse_direction(&dir), "air", None, Lookup::Probe)
                .is_some(),
        };
        if found {
            return dir;
        }
    }
    String::new()
}

/// Finds the direction a building or torch faces.
///
/// With a face-to type, neighbours of that building type are tried first
/// and a hit gives a positive direction. Otherwise the wall direction is
/// used and returned negated, so `0` means undirected.
pub fn building_direction<S: WorldSource + ?Sized>(
    source: &S,
    resolver: &mut Resolver,
    at: (i32, i32, i32),
    classname: &str,
    face: Option<&str>,
) -> i32 {
    let (x, y, z) = at;
    if let Some(face) = face.filter(|f| !f.is_empty()) {
        for digits in [&NEIGHBOR_DIGITS[..], &CARDINAL_DIGITS[..]] {
            let dir = collect_digits(digits, |ox, oy| {
                PackedIndex::from_signed(x + ox, y + oy, z)
                    .and_then(|i| source.building(i))
                    .is_some_and(|b| b.kind.eq_ignore_ascii_case(face))
            });
            if dir.is_empty() {
                continue;
            }
            let dir = parse_direction(&dir);
            if resolver
                .building(classname, dir, "air", None, Lookup::Probe)
                .is_some()
            {
                return dir;
            }
        }
    }

    -parse_direction(&object_direction(source, resolver, at, classname, ProbeKind::Building))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        BuildingFootprint, MaterialRef, ShapeClass, SourceTile, WorldExtent, WorldSnapshot,
    };
    use crate::store::TemplateLibrary;
    use crate::template::VoxelTemplate;
    use crate::unknown::UnknownFeatureLog;

    fn world() -> WorldSnapshot {
        WorldSnapshot::new(WorldExtent {
            blocks_x: 1,
            blocks_y: 1,
            levels: 1,
        })
    }

    fn wall() -> SourceTile {
        SourceTile {
            shape: ShapeClass::Wall,
            ..SourceTile::default()
        }
    }

    fn place_at_digit(world: &mut WorldSnapshot, x: u32, y: u32, digit: u8, tile: SourceTile) {
        let (ox, oy) = neighbor_offset(digit);
        world.set_tile(x.saturating_add_signed(ox), y.saturating_add_signed(oy), 0, tile);
    }

    fn resolver(lib: TemplateLibrary) -> Resolver {
        Resolver::new(lib, UnknownFeatureLog::new(1), 1, true)
    }

    #[test]
    fn test_offsets_follow_keypad() {
        assert_eq!(neighbor_offset(1), (-1, -1));
        assert_eq!(neighbor_offset(2), (0, -1));
        assert_eq!(neighbor_offset(6), (1, 0));
        assert_eq!(neighbor_offset(7), (-1, 1));
        assert_eq!(neighbor_offset(9), (1, 1));
    }

    #[test]
    fn test_ramp_direction_passes() {
        let mut w = world();
        for d in [4, 7, 8] {
            place_at_digit(&mut w, 5, 5, d, wall());
        }

        let mut lib = TemplateLibrary::default();
        lib.terrain.insert("ramp478", VoxelTemplate::solid(1, 1));
        let mut r = resolver(lib);
        assert_eq!(object_direction(&w, &mut r, (5, 5, 0), "ramp", ProbeKind::Terrain), "478");

        let mut lib = TemplateLibrary::default();
        lib.terrain.insert("ramp48", VoxelTemplate::solid(1, 1));
        let mut r = resolver(lib);
        assert_eq!(object_direction(&w, &mut r, (5, 5, 0), "ramp", ProbeKind::Terrain), "48");

        let mut r = resolver(TemplateLibrary::default());
        assert_eq!(object_direction(&w, &mut r, (5, 5, 0), "ramp", ProbeKind::Terrain), "");
        assert_eq!(r.unknown().count(crate::stats::StatArea::Terrain), 0);
    }

    #[test]
    fn test_edge_neighbours_are_ignored() {
        let mut w = world();
        w.set_tile(1, 0, 0, wall());
        let mut lib = TemplateLibrary::default();
        lib.terrain.insert("ramp6", VoxelTemplate::solid(1, 1));
        let mut r = resolver(lib);
        assert_eq!(object_direction(&w, &mut r, (0, 0, 0), "ramp", ProbeKind::Terrain), "6");
    }

    #[test]
    fn test_building_faces_configured_neighbour() {
        let mut w = world();
        w.add_building(&BuildingFootprint {
            kind: "building_tablest".into(),
            x1: 6,
            y1: 5,
            x2: 6,
            y2: 5,
            z: 0,
            material: MaterialRef::default(),
        });
        let mut lib = TemplateLibrary::default();
        lib.buildings.insert("chair.6", VoxelTemplate::solid(1, 1));
        let mut r = resolver(lib);
        assert_eq!(building_direction(&w, &mut r, (5, 5, 0), "chair.only", Some("Table")), 6);
    }

    #[test]
    fn test_building_falls_back_to_walls() {
        let mut w = world();
        place_at_digit(&mut w, 5, 5, 2, wall());
        let mut lib = TemplateLibrary::default();
        lib.buildings.insert("torch.-2", VoxelTemplate::solid(1, 1));
        let mut r = resolver(lib);
        assert_eq!(building_direction(&w, &mut r, (5, 5, 0), "torch", Some("table")), -2);

        let mut r = resolver(TemplateLibrary::default());
        assert_eq!(building_direction(&w, &mut r, (5, 5, 0), "torch", None), 0);
    }
}
