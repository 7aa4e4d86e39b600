//! # Voxel Templates
//!
//! A template is a cube of side `S` describing how one source feature looks
//! in the output world. Cells are listed row by row, rows within a layer,
//! then layers from the top down:
//!
//! ```text
//! index = x + y * S + z * S * S      (z = 0 is the top layer)
//! ```
//!
//! Material `255` means "inherit the resolved material's cell". Data values
//! keep their sub-state in the high nibble; the low nibble is reserved for
//! lighting when the grid is serialized.
//!
//! ## Text Form
//!
//! ```text
//! mat  = "air,air;stone,-1|..."   cells split on any of , ; |
//! data = "0,0;3,0|..."            low nibble of each value is kept
//! ```

use std::collections::HashMap;

use tracing::warn;

/// Material id that defers to the underlying resolved material.
pub const INHERIT: u8 = 255;

/// Material id of air.
pub const AIR: u8 = 0;

/// Smallest supported cube side.
pub const MIN_CUBE_SIZE: usize = 1;

/// Largest supported cube side.
pub const MAX_CUBE_SIZE: usize = 10;

const CELL_SEPARATORS: &[char] = &[',', ';', '|'];

/// Output material name to id lookup, used when parsing templates.
#[derive(Clone, Debug, Default)]
pub struct MaterialPalette {
    ids: HashMap<String, u8>,
}

impl MaterialPalette {
    /// Creates an empty palette.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material name.
    pub fn insert(&mut self, name: impl Into<String>, id: u8) {
        self.ids.insert(name.into(), id);
    }

    /// Looks up a material id by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u8> {
        self.ids.get(name).copied()
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A cube of material and data cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelTemplate {
    size: usize,
    material: Vec<u8>,
    data: Vec<u8>,
}

impl VoxelTemplate {
    /// An all-air cube.
    #[must_use]
    pub fn air(size: usize) -> Self {
        let cells = size * size * size;
        Self {
            size,
            material: vec![AIR; cells],
            data: vec![0; cells],
        }
    }

    /// Builds a template from explicit cells, or `None` if either array
    /// does not hold exactly `size³` entries.
    #[must_use]
    pub fn from_cells(size: usize, material: Vec<u8>, data: Vec<u8>) -> Option<Self> {
        let cells = size * size * size;
        if material.len() != cells || data.len() != cells {
            return None;
        }
        Some(Self {
            size,
            material,
            data,
        })
    }

    /// A cube filled with one material and zero data.
    #[must_use]
    pub fn solid(size: usize, material: u8) -> Self {
        let cells = size * size * size;
        Self {
            size,
            material: vec![material; cells],
            data: vec![0; cells],
        }
    }

    /// Parses the text form.
    ///
    /// Never fails: a wrong cell count resets the whole template to air, a
    /// wrong data count resets the data to zero, and an unknown material
    /// becomes air. Each case is logged.
    #[must_use]
    pub fn parse(
        name: &str,
        size: usize,
        mat: &str,
        data: Option<&str>,
        palette: &MaterialPalette,
    ) -> Self {
        let cells = size * size * size;
        let tokens = split_cells(mat);
        if tokens.len() != cells {
            warn!(
                template = name,
                found = tokens.len(),
                expected = cells,
                "template has wrong number of materials, resetting to air"
            );
            return Self::air(size);
        }

        let material = tokens
            .iter()
            .map(|token| parse_material(name, token, palette))
            .collect();

        let data = match data.filter(|d| !d.is_empty()) {
            None => vec![0; cells],
            Some(text) => {
                let values = split_cells(text);
                if values.len() == cells {
                    values
                        .iter()
                        .map(|v| (parse_leading_int(v) as u8 & 0x0f) << 4)
                        .collect()
                } else {
                    warn!(
                        template = name,
                        found = values.len(),
                        expected = cells,
                        "template has wrong number of data values, resetting to 0"
                    );
                    vec![0; cells]
                }
            }
        };

        Self {
            size,
            material,
            data,
        }
    }

    /// Cube side.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of cells (`size³`).
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.material.len()
    }

    /// Material cells.
    #[inline]
    #[must_use]
    pub fn materials(&self) -> &[u8] {
        &self.material
    }

    /// Data cells (sub-state in the high nibble).
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Linear cell index for an in-cube offset (`oz = 0` is the top layer).
    #[inline]
    #[must_use]
    pub const fn cell_index(&self, ox: usize, oy: usize, oz: usize) -> usize {
        ox + oy * self.size + oz * self.size * self.size
    }

    /// True if every material cell is air.
    #[must_use]
    pub fn is_air(&self) -> bool {
        self.material.iter().all(|&m| m == AIR)
    }

    /// Text form of an all-air cube, as written for placeholder entries.
    #[must_use]
    pub fn air_text(size: usize) -> String {
        cell_text(size, "air")
    }

    /// Text form of an all-zero data list.
    #[must_use]
    pub fn zero_text(size: usize) -> String {
        cell_text(size, "0")
    }
}

fn cell_text(size: usize, cell: &str) -> String {
    let row = vec![cell; size].join(",");
    let layer = vec![row.as_str(); size].join(";");
    vec![layer.as_str(); size].join("|")
}

/// Splits a cell list. A trailing separator does not add an empty cell.
fn split_cells(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut cells: Vec<&str> = text.split(CELL_SEPARATORS).collect();
    if text.ends_with(CELL_SEPARATORS) {
        cells.pop();
    }
    cells
}

fn parse_material(template: &str, token: &str, palette: &MaterialPalette) -> u8 {
    let token = token.trim();
    if let Some(id) = palette.get(token) {
        return id;
    }
    match token.parse::<i32>() {
        Ok(-1) => INHERIT,
        Ok(n) if (0..=255).contains(&n) => n as u8,
        _ => {
            warn!(template, material = token, "unknown output material, using air");
            AIR
        }
    }
}

/// Leading integer of a token; anything unparsable reads as zero.
fn parse_leading_int(token: &str) -> i32 {
    let token = token.trim();
    let end = token
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(token.len(), |(i, _)| i);
    token[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> MaterialPalette {
        let mut p = MaterialPalette::new();
        p.insert("air", 0);
        p.insert("stone", 1);
        p.insert("torch", 50);
        p
    }

    #[test]
    fn test_parse_single_cell() {
        let t = VoxelTemplate::parse("stone", 1, "stone", None, &palette());
        assert_eq!(t.materials(), &[1]);
        assert_eq!(t.data(), &[0]);
    }

    #[test]
    fn test_parse_mixed_separators_and_inherit() {
        let t = VoxelTemplate::parse(
            "floor",
            2,
            "air,air;air,air|-1,-1;stone,4",
            Some("0,0;0,0|1,2;3,17"),
            &palette(),
        );
        assert_eq!(t.materials(), &[0, 0, 0, 0, INHERIT, INHERIT, 1, 4]);
        assert_eq!(t.data(), &[0, 0, 0, 0, 0x10, 0x20, 0x30, 0x10]);
    }

    #[test]
    fn test_wrong_count_becomes_air() {
        let t = VoxelTemplate::parse("bad", 2, "stone,stone", None, &palette());
        assert_eq!(t, VoxelTemplate::air(2));
    }

    #[test]
    fn test_wrong_data_count_zeroes_data() {
        let t = VoxelTemplate::parse("bad", 1, "stone", Some("1,2"), &palette());
        assert_eq!(t.materials(), &[1]);
        assert_eq!(t.data(), &[0]);
    }

    #[test]
    fn test_unknown_name_and_out_of_range_become_air() {
        let t = VoxelTemplate::parse("t", 1, "granite", None, &palette());
        assert_eq!(t.materials(), &[AIR]);
        let t = VoxelTemplate::parse("t", 1, "300", None, &palette());
        assert_eq!(t.materials(), &[AIR]);
        let t = VoxelTemplate::parse("t", 1, "-2", None, &palette());
        assert_eq!(t.materials(), &[AIR]);
    }

    #[test]
    fn test_trailing_separator_ignored() {
        let t = VoxelTemplate::parse("t", 1, "torch,", None, &palette());
        assert_eq!(t.materials(), &[50]);
    }

    #[test]
    fn test_air_text_roundtrips() {
        let text = VoxelTemplate::air_text(3);
        assert_eq!(text.matches("air").count(), 27);
        let t = VoxelTemplate::parse("a", 3, &text, Some(&VoxelTemplate::zero_text(3)), &palette());
        assert!(t.is_air());
        assert_eq!(VoxelTemplate::air_text(1), "air");
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(VoxelTemplate::from_cells(2, vec![0; 8], vec![0; 8]).is_some());
        assert!(VoxelTemplate::from_cells(2, vec![0; 7], vec![0; 8]).is_none());
    }

    #[test]
    fn test_cell_index_top_layer_first() {
        let t = VoxelTemplate::air(3);
        assert_eq!(t.cell_index(0, 0, 0), 0);
        assert_eq!(t.cell_index(2, 1, 0), 5);
        assert_eq!(t.cell_index(0, 0, 2), 18);
    }
}
