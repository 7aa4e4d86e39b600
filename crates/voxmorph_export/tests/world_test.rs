//! World output tests: files on disk decompress to the documents the
//! encoder builds in memory.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use voxmorph_core::VoxelGrid;
use voxmorph_export::{
    chunk_document, level_document, ColumnEncoder, LevelInfo, SpawnPoint, WorldWriter,
};
use voxmorph_nbt::encode_document;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("voxmorph_world_{name}_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn gunzip(path: &Path) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(fs::File::open(path).unwrap())
        .read_to_end(&mut out)
        .unwrap();
    out
}

#[test]
fn test_chunk_file_matches_encoder() {
    let parent = temp_dir("chunk");
    let mut grid = VoxelGrid::try_new(16, 48, 128).unwrap();
    grid.fill_floor(7);
    grid.set(3, 40, 5, 4, 0x20);

    let mut writer = WorldWriter::create(&parent, "Test").unwrap();
    writer.write_columns(&grid).unwrap();
    assert_eq!(writer.columns_written(), 3);

    let file = writer.root().join("0/2/c.0.2.dat");
    let on_disk = gunzip(&file);

    let mut encoder = ColumnEncoder::new();
    let column = encoder.encode(&grid, 0, 32);
    assert_eq!(column.blocks[5 + 8 * 128 + 3 * 2048], 4);
    let expected = encode_document(&chunk_document(0, 2, column).unwrap()).unwrap();
    assert_eq!(on_disk, expected);

    fs::remove_dir_all(&parent).unwrap();
}

#[test]
fn test_level_file_records_size_on_disk() {
    let parent = temp_dir("level");
    let grid = VoxelGrid::try_new(16, 16, 128).unwrap();
    let mut writer = WorldWriter::create(&parent, "").unwrap();
    writer.write_columns(&grid).unwrap();

    let info = LevelInfo {
        snow_covered: false,
        last_played_ms: 0,
        seed: -7,
        spawn: SpawnPoint {
            x: 8,
            height: 2,
            z: 8,
        },
        size_on_disk: writer.size_on_disk() as i64,
    };
    let path = writer.write_level(&info).unwrap();
    assert_eq!(path, parent.join("World 1").join("level.dat"));

    let expected = encode_document(&level_document(&info).unwrap()).unwrap();
    assert_eq!(gunzip(&path), expected);
    assert!(info.size_on_disk > 0);

    fs::remove_dir_all(&parent).unwrap();
}
