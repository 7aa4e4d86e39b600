//! # Resolution Cascade
//!
//! Maps feature descriptors to templates and keeps the match statistics.
//!
//! ## Material Outcomes
//!
//! | outcome   | condition                               | effect                                   |
//! |-----------|-----------------------------------------|------------------------------------------|
//! | perfect   | most specific candidate is stored       | `perfect += 1`                           |
//! | imperfect | a less specific candidate is stored     | `imperfect += 1`, log most specific key  |
//! | unknown   | nothing stored                          | `unknown += 1`, store air under the base |
//!
//! The air template inserted on a total miss makes later lookups of the
//! same base category succeed.
//!
//! ## Shapes
//!
//! Terrain, plant and building lookups resolve a material first, then a
//! shape by normalized class name, and merge the two with
//! [`merge_shape`]. Flows use the shape as is.

use std::sync::Arc;

use tracing::warn;

use crate::key::{candidate_keys, normalize_key, MaterialQuery};
use crate::stats::{ConversionStats, StatArea, StatKind};
use crate::store::TemplateLibrary;
use crate::template::{VoxelTemplate, INHERIT};
use crate::unknown::UnknownFeatureLog;

/// Whether a lookup counts towards statistics and the unknown log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// A real resolution: statistics and logging apply, misses give air.
    Record,
    /// An existence check during direction search: misses give `None`.
    Probe,
}

/// Combines a shape with a resolved material: inherit cells take the
/// material's cell, data always comes from the shape.
#[must_use]
pub fn merge_shape(shape: &VoxelTemplate, material: &VoxelTemplate) -> VoxelTemplate {
    let materials = shape
        .materials()
        .iter()
        .zip(material.materials())
        .map(|(&s, &m)| if s == INHERIT { m } else { s })
        .collect();
    VoxelTemplate::from_cells(shape.size(), materials, shape.data().to_vec())
        .unwrap_or_else(|| VoxelTemplate::air(shape.size()))
}

/// Template lookup with statistics and unknown-feature bookkeeping.
#[derive(Debug)]
pub struct Resolver {
    library: TemplateLibrary,
    stats: ConversionStats,
    unknown: UnknownFeatureLog,
    record_unknown: bool,
    air: Arc<VoxelTemplate>,
}

impl Resolver {
    /// Creates a resolver over a loaded library.
    #[must_use]
    pub fn new(
        library: TemplateLibrary,
        unknown: UnknownFeatureLog,
        cube_size: usize,
        record_unknown: bool,
    ) -> Self {
        Self {
            library,
            stats: ConversionStats::new(),
            unknown,
            record_unknown,
            air: Arc::new(VoxelTemplate::air(cube_size)),
        }
    }

    /// Template stores.
    #[must_use]
    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// Match statistics so far.
    #[must_use]
    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Mutable statistics, for counters bumped outside the cascade.
    pub fn stats_mut(&mut self) -> &mut ConversionStats {
        &mut self.stats
    }

    /// Unknown-feature log so far.
    #[must_use]
    pub fn unknown(&self) -> &UnknownFeatureLog {
        &self.unknown
    }

    /// Shared all-air template.
    #[must_use]
    pub fn air(&self) -> Arc<VoxelTemplate> {
        Arc::clone(&self.air)
    }

    /// Resolves the best material template for a query.
    pub fn material(&mut self, query: &MaterialQuery<'_>, lookup: Lookup) -> Arc<VoxelTemplate> {
        let record = lookup == Lookup::Record;
        let keys = candidate_keys(query);
        let best = keys
            .iter()
            .rev()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_default();

        if let Some(found) = self.library.materials.get(&best).cloned() {
            if record {
                self.stats.bump(StatArea::Materials, StatKind::Perfect);
            }
            return found;
        }

        let fallback = keys
            .iter()
            .rev()
            .flatten()
            .find_map(|key| self.library.materials.get(key))
            .cloned();

        if let Some(found) = fallback {
            if record {
                self.stats.bump(StatArea::Materials, StatKind::Imperfect);
            }
            self.note_unknown(StatArea::Materials, &best, record);
            return found;
        }

        if record {
            let base = keys[0].clone().unwrap_or_default();
            warn!(key = %best, base = %base, "no material template found, creating base as air");
            self.stats.bump(StatArea::Materials, StatKind::Unknown);
            self.library
                .materials
                .insert(base, VoxelTemplate::clone(&self.air));
        }
        self.note_unknown(StatArea::Materials, &best, record);
        self.air()
    }

    /// Resolves a terrain shape merged with its material.
    ///
    /// A miss gives air when recording and `None` when probing. Probes still
    /// resolve the material, so unmatched material keys reach the unknown
    /// log uncounted.
    pub fn terrain(
        &mut self,
        classname: &str,
        query: &MaterialQuery<'_>,
        lookup: Lookup,
    ) -> Option<Arc<VoxelTemplate>> {
        let material = self.material(query, lookup);

        let name = normalize_key(classname);
        let Some(shape) = self.library.terrain.get(&name).cloned() else {
            return match lookup {
                Lookup::Record => {
                    self.note_unknown(StatArea::Terrain, &name, true);
                    Some(self.air())
                }
                Lookup::Probe => None,
            };
        };

        self.stats.bump(StatArea::Terrain, StatKind::Perfect);
        Some(Arc::new(merge_shape(&shape, &material)))
    }

    /// Resolves a liquid flow. A miss gives air.
    pub fn flow(&mut self, classname: &str) -> Arc<VoxelTemplate> {
        let name = normalize_key(classname);
        if let Some(found) = self.library.flows.get(&name).cloned() {
            self.stats.bump(StatArea::Flows, StatKind::Perfect);
            return found;
        }
        self.note_unknown(StatArea::Flows, &name, true);
        self.air()
    }

    /// Resolves a plant, falling back to the generic shape (the name up to
    /// its first `.`). Construction material is never used for plants.
    pub fn plant(&mut self, classname: &str, query: &MaterialQuery<'_>) -> Arc<VoxelTemplate> {
        let query = MaterialQuery { cmat: None, ..*query };
        let material = self.material(&query, Lookup::Record);

        let name = normalize_key(classname);
        let shape = if let Some(found) = self.library.plants.get(&name).cloned() {
            self.stats.bump(StatArea::Plants, StatKind::Perfect);
            found
        } else {
            let generic = name.split('.').next().unwrap_or_default();
            if let Some(found) = self.library.plants.get(generic).cloned() {
                self.stats.bump(StatArea::Plants, StatKind::Imperfect);
                found
            } else {
                self.note_unknown(StatArea::Plants, &name, true);
                return self.air();
            }
        };

        Arc::new(merge_shape(&shape, &material))
    }

    /// Resolves a building facing `direction`.
    ///
    /// Names tried in order: `class.direction`, `type.direction` (class up
    /// to its first `.`), and when recording also `class` and `type`.
    pub fn building(
        &mut self,
        classname: &str,
        direction: i32,
        base: &str,
        full: Option<&str>,
        lookup: Lookup,
    ) -> Option<Arc<VoxelTemplate>> {
        let query = MaterialQuery {
            base,
            variant: 0,
            full,
            smat: None,
            cmat: None,
        };
        let material = self.material(&query, lookup);

        let name = normalize_key(&format!("{classname}.{direction}"));
        let shape = if let Some(found) = self.library.buildings.get(&name).cloned() {
            if lookup == Lookup::Record {
                self.stats.bump(StatArea::Buildings, StatKind::Perfect);
            }
            found
        } else {
            let Some(found) = self.building_fallback(classname, direction, lookup) else {
                return match lookup {
                    Lookup::Record => {
                        self.note_unknown(StatArea::Buildings, &normalize_key(classname), true);
                        Some(self.air())
                    }
                    Lookup::Probe => None,
                };
            };
            self.stats.bump(StatArea::Buildings, StatKind::Imperfect);
            found
        };

        Some(Arc::new(merge_shape(&shape, &material)))
    }

    fn building_fallback(
        &self,
        classname: &str,
        direction: i32,
        lookup: Lookup,
    ) -> Option<Arc<VoxelTemplate>> {
        let class = normalize_key(classname);
        let kind = class.split('.').next().unwrap_or_default();
        let store = &self.library.buildings;

        let mut candidates = vec![normalize_key(&format!("{kind}.{direction}"))];
        if lookup == Lookup::Record {
            candidates.push(class.clone());
            candidates.push(kind.to_owned());
        }
        candidates.iter().find_map(|name| store.get(name)).cloned()
    }

    fn note_unknown(&mut self, area: StatArea, name: &str, counted: bool) {
        if !self.record_unknown {
            return;
        }
        if self.unknown.record(area, name, None) && counted {
            self.stats.bump(area, StatKind::Unseen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(library: TemplateLibrary) -> Resolver {
        Resolver::new(library, UnknownFeatureLog::new(1), 1, true)
    }

    fn granite_query() -> MaterialQuery<'static> {
        MaterialQuery {
            base: "stone",
            variant: 1,
            full: Some("rough"),
            smat: Some("granite"),
            cmat: None,
        }
    }

    #[test]
    fn test_perfect_match() {
        let mut lib = TemplateLibrary::default();
        lib.materials.insert("stone.1.rough.granite", VoxelTemplate::solid(1, 1));
        let mut r = resolver(lib);

        let t = r.material(&granite_query(), Lookup::Record);
        assert_eq!(t.materials(), &[1]);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Perfect), 1);
        assert_eq!(r.unknown().count(StatArea::Materials), 0);
    }

    #[test]
    fn test_imperfect_match_uses_most_specific_ancestor() {
        let mut lib = TemplateLibrary::default();
        lib.materials.insert("stone", VoxelTemplate::solid(1, 1));
        lib.materials.insert("stone.granite", VoxelTemplate::solid(1, 2));
        let mut r = resolver(lib);

        let t = r.material(&granite_query(), Lookup::Record);
        assert_eq!(t.materials(), &[2]);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Imperfect), 1);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Unseen), 1);
        assert!(r.unknown().contains(StatArea::Materials, "stone.1.rough.granite"));

        r.material(&granite_query(), Lookup::Record);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Imperfect), 2);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Unseen), 1);
    }

    #[test]
    fn test_total_miss_creates_air_base() {
        let mut r = resolver(TemplateLibrary::default());

        let t = r.material(&granite_query(), Lookup::Record);
        assert!(t.is_air());
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Unknown), 1);
        assert!(r.library().materials.contains("stone"));

        // The base now exists, so the same query is an imperfect match.
        r.material(&granite_query(), Lookup::Record);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Unknown), 1);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Imperfect), 1);

        // A base-only query is now perfect.
        r.material(&MaterialQuery::base("stone"), Lookup::Record);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Perfect), 1);
    }

    #[test]
    fn test_direction_lookup_leaves_counts_and_library() {
        let mut r = resolver(TemplateLibrary::default());
        let t = r.material(&granite_query(), Lookup::Probe);
        assert!(t.is_air());
        assert!(!r.library().materials.contains("stone"));
        assert_eq!(r.stats(), &ConversionStats::new());
    }

    #[test]
    fn test_direction_lookup_logs_material_uncounted() {
        let mut lib = TemplateLibrary::default();
        lib.terrain.insert("ramp4", VoxelTemplate::solid(1, 3));
        let mut r = resolver(lib);

        let t = r.terrain("ramp4", &granite_query(), Lookup::Probe);
        assert_eq!(t.unwrap().materials(), &[3]);
        assert!(r.unknown().contains(StatArea::Materials, "stone.1.rough.granite"));
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Unseen), 0);
        assert_eq!(r.stats().get(StatArea::Materials, StatKind::Unknown), 0);
        assert!(!r.library().materials.contains("stone"));

        assert!(r.building("chair.only", 2, "wood", None, Lookup::Probe).is_none());
        assert!(r.unknown().contains(StatArea::Materials, "wood"));
    }

    #[test]
    fn test_terrain_merges_inherit_cells() {
        let mut lib = TemplateLibrary::default();
        lib.materials.insert("stone", VoxelTemplate::solid(2, 1));
        let shape = VoxelTemplate::from_cells(
            2,
            vec![0, 0, 0, 0, INHERIT, INHERIT, 4, INHERIT],
            vec![0, 0, 0, 0, 0x10, 0, 0x20, 0],
        )
        .unwrap();
        lib.terrain.insert("floor", shape);
        let mut r = Resolver::new(lib, UnknownFeatureLog::new(2), 2, true);

        let t = r
            .terrain("Floor", &MaterialQuery::base("stone"), Lookup::Record)
            .unwrap();
        assert_eq!(t.materials(), &[0, 0, 0, 0, 1, 1, 4, 1]);
        assert_eq!(t.data(), &[0, 0, 0, 0, 0x10, 0, 0x20, 0]);
        assert_eq!(r.stats().get(StatArea::Terrain, StatKind::Perfect), 1);
    }

    #[test]
    fn test_terrain_miss_record_vs_lookup() {
        let mut r = resolver(TemplateLibrary::default());
        assert!(r
            .terrain("ramp26", &MaterialQuery::base("stone"), Lookup::Probe)
            .is_none());
        assert!(!r.unknown().contains(StatArea::Terrain, "ramp26"));

        let t = r
            .terrain("ramp26", &MaterialQuery::base("stone"), Lookup::Record)
            .unwrap();
        assert!(t.is_air());
        assert!(r.unknown().contains(StatArea::Terrain, "ramp26"));
        assert_eq!(r.stats().get(StatArea::Terrain, StatKind::Unseen), 1);
    }

    #[test]
    fn test_flow_lookup() {
        let mut lib = TemplateLibrary::default();
        lib.flows.insert("water.7", VoxelTemplate::solid(1, 9));
        let mut r = resolver(lib);
        assert_eq!(r.flow("water.7").materials(), &[9]);
        assert!(r.flow("magma.3").is_air());
        assert_eq!(r.stats().get(StatArea::Flows, StatKind::Perfect), 1);
        assert!(r.unknown().contains(StatArea::Flows, "magma.3"));
    }

    #[test]
    fn test_plant_generic_fallback() {
        let mut lib = TemplateLibrary::default();
        lib.materials.insert("grass", VoxelTemplate::solid(1, 2));
        lib.plants.insert("shrub", VoxelTemplate::from_cells(1, vec![INHERIT], vec![0]).unwrap());
        let mut r = resolver(lib);

        let t = r.plant("shrub.Prickle Berry", &MaterialQuery::base("grass"));
        assert_eq!(t.materials(), &[2]);
        assert_eq!(r.stats().get(StatArea::Plants, StatKind::Imperfect), 1);

        let t = r.plant("tree.oak", &MaterialQuery::base("grass"));
        assert!(t.is_air());
        assert!(r.unknown().contains(StatArea::Plants, "tree.oak"));
    }

    #[test]
    fn test_building_fallback_chain() {
        let mut lib = TemplateLibrary::default();
        lib.materials.insert("stone", VoxelTemplate::solid(1, 1));
        lib.buildings.insert("table.only.0", VoxelTemplate::solid(1, 5));
        lib.buildings.insert("chair.-26", VoxelTemplate::solid(1, 6));
        lib.buildings.insert("bed", VoxelTemplate::solid(1, 7));
        let mut r = resolver(lib);

        let t = r.building("table.only", 0, "stone", Some("building"), Lookup::Record);
        assert_eq!(t.unwrap().materials(), &[5]);
        assert_eq!(r.stats().get(StatArea::Buildings, StatKind::Perfect), 1);

        let t = r.building("chair.only", -26, "stone", None, Lookup::Probe);
        assert_eq!(t.unwrap().materials(), &[6]);

        assert!(r.building("bed.x0y0", 4, "stone", None, Lookup::Probe).is_none());
        let t = r.building("bed.x0y0", 4, "stone", None, Lookup::Record);
        assert_eq!(t.unwrap().materials(), &[7]);
        assert_eq!(r.stats().get(StatArea::Buildings, StatKind::Imperfect), 2);

        let t = r.building("well.only", 0, "stone", None, Lookup::Record);
        assert!(t.unwrap().is_air());
        assert!(r.unknown().contains(StatArea::Buildings, "well.only"));
    }

    #[test]
    fn test_disabled_log_counts_nothing_new() {
        let mut r = Resolver::new(TemplateLibrary::default(), UnknownFeatureLog::new(1), 1, false);
        r.flow("water.1");
        assert_eq!(r.unknown().count(StatArea::Flows), 0);
        assert_eq!(r.stats().get(StatArea::Flows, StatKind::Unseen), 0);
    }
}
