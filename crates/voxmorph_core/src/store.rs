//! # Template Stores
//!
//! Name to template maps, one per feature category. Templates are shared
//! through `Arc` so a resolved template can be stamped any number of times
//! without copying.

use std::collections::HashMap;
use std::sync::Arc;

use crate::stats::StatArea;
use crate::template::VoxelTemplate;

/// Symbolic name to template map for one category.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: HashMap<String, Arc<VoxelTemplate>>,
}

impl TemplateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a template by its normalized name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<VoxelTemplate>> {
        self.templates.get(name)
    }

    /// True if `name` is present.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Inserts a template, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, template: VoxelTemplate) -> Option<Arc<VoxelTemplate>> {
        self.templates.insert(name.into(), Arc::new(template))
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// All template stores plus the neighbour-facing table.
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    /// Solid blocks per source material.
    pub materials: TemplateStore,
    /// Terrain shapes.
    pub terrain: TemplateStore,
    /// Liquid flows.
    pub flows: TemplateStore,
    /// Vegetation.
    pub plants: TemplateStore,
    /// Buildings and torches.
    pub buildings: TemplateStore,
    /// Feature name to the building type it turns to face.
    pub faces: HashMap<String, String>,
}

impl TemplateLibrary {
    /// Store backing a statistics area.
    #[must_use]
    pub fn store(&self, area: StatArea) -> &TemplateStore {
        match area {
            StatArea::Materials => &self.materials,
            StatArea::Terrain => &self.terrain,
            StatArea::Flows => &self.flows,
            StatArea::Plants => &self.plants,
            StatArea::Buildings => &self.buildings,
        }
    }

    /// Mutable store backing a statistics area.
    pub fn store_mut(&mut self, area: StatArea) -> &mut TemplateStore {
        match area {
            StatArea::Materials => &mut self.materials,
            StatArea::Terrain => &mut self.terrain,
            StatArea::Flows => &mut self.flows,
            StatArea::Plants => &mut self.plants,
            StatArea::Buildings => &mut self.buildings,
        }
    }

    /// Building type the named feature faces, if configured.
    #[must_use]
    pub fn face_for(&self, feature: &str) -> Option<&str> {
        self.faces.get(feature).map(String::as_str).filter(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_replace() {
        let mut store = TemplateStore::new();
        assert!(store.insert("stone", VoxelTemplate::solid(1, 1)).is_none());
        let old = store.insert("stone", VoxelTemplate::solid(1, 4));
        assert_eq!(old.map(|t| t.materials()[0]), Some(1));
        assert_eq!(store.get("stone").map(|t| t.materials()[0]), Some(4));
        assert_eq!(store.len(), 1);
        assert!(store.contains("stone"));
        assert!(!store.contains("soil"));
    }

    #[test]
    fn test_library_routes_areas() {
        let mut lib = TemplateLibrary::default();
        lib.store_mut(StatArea::Flows).insert("water.7", VoxelTemplate::solid(1, 9));
        assert!(lib.flows.contains("water.7"));
        assert!(lib.store(StatArea::Flows).contains("water.7"));
        assert!(lib.store(StatArea::Terrain).is_empty());
    }

    #[test]
    fn test_face_for_ignores_empty() {
        let mut lib = TemplateLibrary::default();
        lib.faces.insert("chair".into(), "table".into());
        lib.faces.insert("bed".into(), String::new());
        assert_eq!(lib.face_for("chair"), Some("table"));
        assert_eq!(lib.face_for("bed"), None);
        assert_eq!(lib.face_for("door"), None);
    }
}
