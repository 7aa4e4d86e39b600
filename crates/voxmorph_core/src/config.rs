//! # Configuration
//!
//! Run parameters, the output material table and every template, loaded
//! once from TOML and immutable afterwards.
//!
//! ```toml
//! [settings]
//! cube_size = 1
//! world_name = "World "
//!
//! [settings.clip]
//! x_min = 0
//! x_max = 4
//!
//! [settings.vertical]
//! mode = "smart"
//! levels = 40
//! air_to_keep = 3
//!
//! [[materials]]
//! name = "stone"
//! id = 1
//! opacity = 15
//!
//! [templates.materials]
//! stone = { mat = "stone" }
//!
//! [templates.terrain]
//! wall = { mat = "-1" }
//!
//! [templates.buildings]
//! chair = { mat = "air", face = "table" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::key::normalize_key;
use crate::opacity::OpacityTable;
use crate::stamp::GravityRules;
use crate::stats::StatArea;
use crate::store::TemplateLibrary;
use crate::template::{MaterialPalette, VoxelTemplate, MAX_CUBE_SIZE, MIN_CUBE_SIZE};

/// Seed used when none is configured.
pub const DEFAULT_SEED: i64 = 0x0044_4674_6F4D_43FF;

/// Highest output level a cell can occupy.
pub const MAX_OUTPUT_HEIGHT: u32 = 127;

/// Clip window in source blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipWindow {
    /// First block along x.
    pub x_min: u32,
    /// Last block along x, exclusive.
    pub x_max: u32,
    /// First block along y.
    pub y_min: u32,
    /// Last block along y, exclusive.
    pub y_max: u32,
}

impl Default for ClipWindow {
    fn default() -> Self {
        Self {
            x_min: 0,
            x_max: 2000,
            y_min: 0,
            y_max: 2000,
        }
    }
}

/// How source levels are chosen for export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalMode {
    /// Keep every level, dropping the surplus from the bottom.
    #[default]
    None,
    /// Keep the topmost non-empty levels plus some air.
    Top,
    /// Keep a fixed range ending at `top_level`.
    Range,
    /// Keep interesting levels, padding with the levels between them.
    Smart,
}

/// Vertical level selection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalSettings {
    /// Selection mode.
    pub mode: VerticalMode,
    /// Maximum number of levels to export.
    pub levels: u32,
    /// Air levels kept above the highest interesting level.
    pub air_to_keep: u32,
    /// Top level for [`VerticalMode::Range`]; 0 or less means the world top.
    pub top_level: i32,
}

impl Default for VerticalSettings {
    fn default() -> Self {
        Self {
            mode: VerticalMode::None,
            levels: 1000,
            air_to_keep: 1000,
            top_level: 0,
        }
    }
}

/// Run parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Template side length, 1 to 10.
    pub cube_size: usize,
    /// Torch chance on floors without sky view.
    pub torch_inside_percent: u32,
    /// Torch chance on unlit floors.
    pub torch_dark_percent: u32,
    /// Torch chance on subterranean floors.
    pub torch_subterranean_percent: u32,
    /// Give walls and other shapes a neighbour direction suffix.
    pub directional_walls: bool,
    /// Material replacing sand over non-supporting cells; 0 disables.
    pub safe_sand: u8,
    /// World seed; 0 selects [`DEFAULT_SEED`].
    pub seed: i64,
    /// 0 follows ice detection, positive forces snow, negative never snows.
    pub snowy: i32,
    /// Material filling the bottom plane.
    pub floor_material: u8,
    /// Prefix of the world directory name.
    pub world_name: String,
    /// Directory the world directory is created in.
    pub output_dir: PathBuf,
    /// Record unknown features for operator follow-up.
    pub record_unknown: bool,
    /// File the unknown-feature log is merged into.
    pub unknown_log: PathBuf,
    /// Clip window.
    pub clip: ClipWindow,
    /// Vertical selection.
    pub vertical: VerticalSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cube_size: 3,
            torch_inside_percent: 10,
            torch_dark_percent: 20,
            torch_subterranean_percent: 30,
            directional_walls: false,
            safe_sand: 3,
            seed: 0,
            snowy: 0,
            floor_material: 7,
            world_name: "World ".to_owned(),
            output_dir: PathBuf::from("."),
            record_unknown: true,
            unknown_log: PathBuf::from("unknown_features.toml"),
            clip: ClipWindow::default(),
            vertical: VerticalSettings::default(),
        }
    }
}

impl Settings {
    /// Effective seed.
    #[must_use]
    pub const fn effective_seed(&self) -> i64 {
        if self.seed == 0 {
            DEFAULT_SEED
        } else {
            self.seed
        }
    }

    /// Level limit, capped so the stacked cubes fit the output height.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn level_limit(&self) -> u32 {
        let cube = self.cube_size.max(1) as u32;
        self.vertical.levels.min(MAX_OUTPUT_HEIGHT / cube)
    }
}

/// One output material.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Name used in templates.
    pub name: String,
    /// Output id.
    pub id: u8,
    /// Sets both opacities.
    #[serde(default)]
    pub opacity: Option<i32>,
    /// Sky opacity, overrides `opacity`.
    #[serde(default)]
    pub sky_opacity: Option<i32>,
    /// Block opacity, overrides `opacity`; negative values emit light.
    #[serde(default)]
    pub block_opacity: Option<i32>,
    /// Lit itself but blocks light from passing.
    #[serde(default)]
    pub partial_lit: bool,
    /// Falls under gravity.
    #[serde(default)]
    pub sand: bool,
    /// Cannot hold falling materials.
    #[serde(default)]
    pub non_support: bool,
}

/// Text form of one template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Material cell list.
    pub mat: String,
    /// Optional data cell list.
    #[serde(default)]
    pub data: Option<String>,
    /// Building type this feature turns to face.
    #[serde(default)]
    pub face: Option<String>,
}

/// Templates grouped by category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSections {
    /// Solid material blocks.
    pub materials: BTreeMap<String, TemplateEntry>,
    /// Terrain shapes.
    pub terrain: BTreeMap<String, TemplateEntry>,
    /// Liquid flows.
    pub flows: BTreeMap<String, TemplateEntry>,
    /// Vegetation.
    pub plants: BTreeMap<String, TemplateEntry>,
    /// Buildings and torches.
    pub buildings: BTreeMap<String, TemplateEntry>,
}

impl TemplateSections {
    fn section(&self, area: StatArea) -> &BTreeMap<String, TemplateEntry> {
        match area {
            StatArea::Materials => &self.materials,
            StatArea::Terrain => &self.terrain,
            StatArea::Flows => &self.flows,
            StatArea::Plants => &self.plants,
            StatArea::Buildings => &self.buildings,
        }
    }
}

/// Complete configuration document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run parameters.
    pub settings: Settings,
    /// Output material table.
    pub materials: Vec<MaterialEntry>,
    /// Templates.
    pub templates: TemplateSections,
}

impl Config {
    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a setting is out of range.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|source| CoreError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, malformed or out of range.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(
            path = %path.display(),
            materials = config.materials.len(),
            cube_size = config.settings.cube_size,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for an out-of-range cube size.
    pub fn validate(&self) -> CoreResult<()> {
        let size = self.settings.cube_size;
        if !(MIN_CUBE_SIZE..=MAX_CUBE_SIZE).contains(&size) {
            return Err(CoreError::InvalidConfig(format!(
                "cube_size {size} is outside {MIN_CUBE_SIZE}..={MAX_CUBE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Material name to id map. `air` is always 0.
    #[must_use]
    pub fn palette(&self) -> MaterialPalette {
        let mut palette = MaterialPalette::new();
        palette.insert("air", 0);
        for m in &self.materials {
            palette.insert(m.name.clone(), m.id);
        }
        palette
    }

    /// Light behaviour per material id.
    #[must_use]
    pub fn opacity(&self) -> OpacityTable {
        let mut table = OpacityTable::new();
        for m in &self.materials {
            if let Some(opacity) = m.opacity {
                table.set_opacity(m.id, opacity);
            }
            if let Some(sky) = m.sky_opacity {
                table.set_sky(m.id, sky);
            }
            if let Some(block) = m.block_opacity {
                table.set_block(m.id, block);
            }
            table.set_partial_lit(m.id, m.partial_lit);
        }
        table
    }

    /// Sand and non-support sets.
    #[must_use]
    pub fn gravity(&self) -> GravityRules {
        let mut rules = GravityRules::new();
        for m in &self.materials {
            if m.sand {
                rules.mark_sand(m.id);
            }
            if m.non_support {
                rules.mark_non_support(m.id);
            }
        }
        rules
    }

    /// Parses every template into the per-category stores. Template names
    /// are normalized; `face` entries fill the face table.
    #[must_use]
    pub fn library(&self, palette: &MaterialPalette) -> TemplateLibrary {
        let size = self.settings.cube_size;
        let mut library = TemplateLibrary::default();
        for area in StatArea::ALL {
            let entries = self.templates.section(area);
            for (name, entry) in entries {
                let key = normalize_key(name);
                let template = VoxelTemplate::parse(&key, size, &entry.mat, entry.data.as_deref(), palette);
                library.store_mut(area).insert(key.clone(), template);
                if matches!(area, StatArea::Terrain | StatArea::Buildings) {
                    if let Some(face) = entry.face.as_ref().filter(|f| !f.is_empty()) {
                        library.faces.insert(key, face.clone());
                    }
                }
            }
            info!(
                section = area.section(),
                count = library.store(area).len(),
                "templates loaded"
            );
        }
        library
    }
}
