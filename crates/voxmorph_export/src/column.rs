//! # Column Encoding
//!
//! Slices the voxel grid into 16 x 16 x 128 columns. Within a column the
//! byte index of a cell is `z + y * 128 + x * 2048`, with `x` and `y` the
//! offsets from the column origin on the grid's x and y axes.
//!
//! Data and both light channels hold four bits per cell, two cells per
//! byte: even heights in the low nibble, odd heights in the high nibble.
//! Template data is stored in the high nibble of the grid's data byte.

use voxmorph_core::VoxelGrid;
use voxmorph_nbt::{Compound, NamedTag, NbtResult, TagType};

/// Column side along x and y.
pub const CHUNK_SIDE: usize = 16;

/// Column height.
pub const CHUNK_HEIGHT: usize = 128;

/// Cells per column.
pub const CHUNK_CELLS: usize = CHUNK_SIDE * CHUNK_SIDE * CHUNK_HEIGHT;

/// Encoded channels of one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnData {
    /// One material byte per cell.
    pub blocks: Vec<u8>,
    /// Packed data nibbles.
    pub data: Vec<u8>,
    /// Packed sky light.
    pub sky_light: Vec<u8>,
    /// Packed block light.
    pub block_light: Vec<u8>,
    /// First air height above the highest non-air cell, per `(x, y)`.
    pub height_map: Vec<u8>,
}

impl Default for ColumnData {
    fn default() -> Self {
        Self {
            blocks: vec![0; CHUNK_CELLS],
            data: vec![0; CHUNK_CELLS / 2],
            sky_light: vec![0; CHUNK_CELLS / 2],
            block_light: vec![0; CHUNK_CELLS / 2],
            height_map: vec![0; CHUNK_SIDE * CHUNK_SIDE],
        }
    }
}

impl ColumnData {
    fn clear(&mut self) {
        self.blocks.fill(0);
        self.data.fill(0);
        self.sky_light.fill(0);
        self.block_light.fill(0);
        self.height_map.fill(0);
    }
}

/// Encodes columns into a reused scratch buffer.
#[derive(Debug, Default)]
pub struct ColumnEncoder {
    scratch: ColumnData,
}

impl ColumnEncoder {
    /// Creates an encoder with zeroed scratch space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes the column whose origin is grid cell `(x0, y0)`. Cells past
    /// the grid edge read as air.
    pub fn encode(&mut self, grid: &VoxelGrid, x0: usize, y0: usize) -> &ColumnData {
        let out = &mut self.scratch;
        out.clear();
        let height = grid.z_size().min(CHUNK_HEIGHT);
        for zz in 0..height {
            for yy in 0..CHUNK_SIDE {
                for xx in 0..CHUNK_SIDE {
                    let (x, y) = (x0 + xx, y0 + yy);
                    let block = grid.material(x, y, zz);
                    let data = grid.data(x, y, zz);
                    let sky = grid.sky_light(x, y, zz) & 0x0f;
                    let light = grid.block_light(x, y, zz) & 0x0f;

                    let index = zz + yy * CHUNK_HEIGHT + xx * CHUNK_HEIGHT * CHUNK_SIDE;
                    out.blocks[index] = block;
                    if block != 0 {
                        out.height_map[yy * CHUNK_SIDE + xx] = (zz + 1).min(CHUNK_HEIGHT - 1) as u8;
                    }

                    let half = index / 2;
                    if zz % 2 == 0 {
                        out.data[half] |= data >> 4;
                        out.sky_light[half] |= sky;
                        out.block_light[half] |= light;
                    } else {
                        out.data[half] |= data & 0xf0;
                        out.sky_light[half] |= sky << 4;
                        out.block_light[half] |= light << 4;
                    }
                }
            }
        }
        &self.scratch
    }
}

/// Builds the chunk document for one encoded column.
///
/// # Errors
///
/// Returns an error only if a list is built with mismatched element types.
pub fn chunk_document(x_pos: i32, z_pos: i32, column: &ColumnData) -> NbtResult<NamedTag> {
    let level = Compound::new()
        .list("Entities", TagType::Compound, Vec::new())?
        .list("TileEntities", TagType::Compound, Vec::new())?
        .byte("TerrainPopulated", 1)
        .long("LastUpdate", 0)
        .int("xPos", x_pos)
        .int("zPos", z_pos)
        .byte_array("Blocks", column.blocks.clone())
        .byte_array("Data", column.data.clone())
        .byte_array("SkyLight", column.sky_light.clone())
        .byte_array("BlockLight", column.block_light.clone())
        .byte_array("HeightMap", column.height_map.clone());
    Ok(Compound::new().compound("Level", level).into_named(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmorph_nbt::Tag;

    #[test]
    fn test_nibble_packing() {
        let mut grid = VoxelGrid::try_new(16, 16, 128).unwrap();
        grid.set(1, 2, 4, 3, 0x50);
        grid.set(1, 2, 5, 3, 0xa0);

        let mut encoder = ColumnEncoder::new();
        let col = encoder.encode(&grid, 0, 0);
        let index = 4 + 2 * 128 + 2048;
        assert_eq!(col.blocks[index], 3);
        assert_eq!(col.blocks[index + 1], 3);
        assert_eq!(col.data[index / 2], 0xa5);
        assert_eq!(col.height_map[2 * 16 + 1], 6);
        assert_eq!(col.height_map[0], 0);
    }

    #[test]
    fn test_height_map_caps_at_127() {
        let mut grid = VoxelGrid::try_new(16, 16, 128).unwrap();
        grid.set(0, 0, 127, 1, 0);
        let mut encoder = ColumnEncoder::new();
        assert_eq!(encoder.encode(&grid, 0, 0).height_map[0], 127);
    }

    #[test]
    fn test_scratch_is_cleared_between_columns() {
        let mut grid = VoxelGrid::try_new(32, 16, 128).unwrap();
        grid.set(0, 0, 10, 9, 0);
        let mut encoder = ColumnEncoder::new();
        assert_eq!(encoder.encode(&grid, 0, 0).blocks[10], 9);
        let second = encoder.encode(&grid, 16, 0);
        assert!(second.blocks.iter().all(|&b| b == 0));
        assert!(second.height_map.iter().all(|&h| h == 0));
    }

    #[test]
    fn test_chunk_document_layout() {
        let doc = chunk_document(2, -1, &ColumnData::default()).unwrap();
        assert_eq!(doc.name, "");
        let Tag::Compound(root) = &doc.tag else {
            panic!("root is not a compound");
        };
        assert_eq!(root.len(), 1);
        let level = doc.tag.get("Level").unwrap();
        assert!(matches!(level.get("zPos"), Some(Tag::Int(-1))));
        assert!(matches!(level.get("TerrainPopulated"), Some(Tag::Byte(1))));
        match level.get("Blocks") {
            Some(Tag::ByteArray(b)) => assert_eq!(b.len(), CHUNK_CELLS),
            other => panic!("unexpected Blocks tag {other:?}"),
        }
        match level.get("HeightMap") {
            Some(Tag::ByteArray(h)) => assert_eq!(h.len(), 256),
            other => panic!("unexpected HeightMap tag {other:?}"),
        }
    }
}
