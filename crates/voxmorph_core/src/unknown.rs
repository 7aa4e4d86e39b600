//! # Unknown-Feature Log
//!
//! Append-only record of the most specific keys that had no exact template.
//! Each entry is an all-air placeholder an operator can copy into the
//! configuration and fill in. The log persists as TOML:
//!
//! ```toml
//! [terrain]
//! ramp26 = { mat = "air" }
//!
//! [materials]
//! "stone.0.granite" = { mat = "air" }
//! ```
//!
//! Saving merges with whatever is already on disk; existing entries are
//! never rewritten.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::stats::StatArea;
use crate::template::VoxelTemplate;

/// A placeholder template entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Material cell list.
    pub mat: String,
    /// Optional data cell list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

type Sections = BTreeMap<String, BTreeMap<String, Placeholder>>;

/// Keys seen without an exact template, grouped by category.
#[derive(Clone, Debug, Default)]
pub struct UnknownFeatureLog {
    cube_size: usize,
    sections: Sections,
}

impl UnknownFeatureLog {
    /// Creates an empty log for templates of side `cube_size`.
    #[must_use]
    pub fn new(cube_size: usize) -> Self {
        Self {
            cube_size,
            sections: Sections::new(),
        }
    }

    /// Loads an existing log, or starts empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path, cube_size: usize) -> CoreResult<Self> {
        Ok(Self {
            cube_size,
            sections: read_sections(path)?,
        })
    }

    /// Records a key. Returns `true` if it was not logged before.
    pub fn record(&mut self, area: StatArea, name: &str, data: Option<&str>) -> bool {
        let section = self.sections.entry(area.section().to_owned()).or_default();
        if section.contains_key(name) {
            return false;
        }
        debug!(area = area.section(), name, "new unknown feature");
        section.insert(
            name.to_owned(),
            Placeholder {
                mat: VoxelTemplate::air_text(self.cube_size),
                data: data.map(str::to_owned),
            },
        );
        true
    }

    /// True if `name` is logged under `area`.
    #[must_use]
    pub fn contains(&self, area: StatArea, name: &str) -> bool {
        self.sections
            .get(area.section())
            .is_some_and(|s| s.contains_key(name))
    }

    /// Number of entries under `area`.
    #[must_use]
    pub fn count(&self, area: StatArea) -> usize {
        self.sections.get(area.section()).map_or(0, BTreeMap::len)
    }

    /// Writes the log to `path`, keeping every entry already in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file is unreadable or the write fails.
    pub fn save_merged(&self, path: &Path) -> CoreResult<()> {
        let mut merged = read_sections(path)?;
        for (section, entries) in &self.sections {
            let target = merged.entry(section.clone()).or_default();
            for (name, placeholder) in entries {
                target
                    .entry(name.clone())
                    .or_insert_with(|| placeholder.clone());
            }
        }
        let text = toml::to_string(&merged)?;
        fs::write(path, text).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_sections(path: &Path) -> CoreResult<Sections> {
    match fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Sections::new()),
        Err(source) => Err(CoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
