//! End-to-end conversion tests: snapshot and configuration files in, world
//! directory out.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use voxmorph::{export, render, run};
use voxmorph_core::{Config, ConversionContext, WorldSnapshot};
use voxmorph_export::{chunk_document, ColumnEncoder};
use voxmorph_nbt::encode_document;

const WORLD: &str = r#"
    [world]
    blocks_x = 1
    blocks_y = 1
    levels = 2

    [[regions]]
    from = [0, 0, 0]
    to = [15, 15, 0]
    shape = "floor"
    material = "stone"
    name = "stone floor"
"#;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("voxmorph_run_{name}_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_text(out: &Path) -> String {
    config_with(out, "stone", "")
}

/// Base configuration with the stone template pointed at `stone_as` and
/// `extra` appended to the material table.
fn config_with(out: &Path, stone_as: &str, extra: &str) -> String {
    format!(
        r#"
        [settings]
        cube_size = 1
        floor_material = 89
        torch_inside_percent = 0
        torch_dark_percent = 0
        torch_subterranean_percent = 0
        world_name = "Test"
        output_dir = '{out}'
        unknown_log = '{out}/unknown.toml'

        [settings.vertical]
        mode = "none"

        [[materials]]
        name = "stone"
        id = 1
        opacity = 15

        [[materials]]
        name = "glowstone"
        id = 89
        opacity = 15
        block_opacity = -15
        {extra}

        [templates.materials]
        stone = {{ mat = "{stone_as}" }}

        [templates.terrain]
        floor = {{ mat = "-1" }}
        "#,
        out = out.display()
    )
}

fn gunzip(path: &Path) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(fs::File::open(path).unwrap())
        .read_to_end(&mut out)
        .unwrap();
    out
}

/// Payload of the byte array tag `name` inside an encoded document.
fn byte_array<'a>(doc: &'a [u8], name: &str, len: usize) -> &'a [u8] {
    let mut header = vec![7u8];
    header.extend_from_slice(&(name.len() as u16).to_be_bytes());
    header.extend_from_slice(name.as_bytes());
    header.extend_from_slice(&(len as u32).to_be_bytes());
    let at = doc
        .windows(header.len())
        .position(|w| w == header.as_slice())
        .unwrap()
        + header.len();
    &doc[at..at + len]
}

/// Int tag `name` with `value`, as it appears inside an encoded compound.
fn int_tag(name: &str, value: i32) -> Vec<u8> {
    let mut bytes = vec![3u8];
    bytes.extend_from_slice(&(name.len() as u16).to_be_bytes());
    bytes.extend_from_slice(name.as_bytes());
    bytes.extend_from_slice(&value.to_be_bytes());
    bytes
}

#[test]
fn test_run_writes_world_from_files() {
    let dir = temp_dir("files");
    let config_path = dir.join("voxmorph.toml");
    let world_path = dir.join("world.toml");
    fs::write(&config_path, config_text(&dir)).unwrap();
    fs::write(&world_path, WORLD).unwrap();

    let report = run(&config_path, &world_path).unwrap();
    assert_eq!(report.world_dir, dir.join("Test1"));
    assert_eq!(report.columns, 1);
    assert_eq!(report.levels, 2);
    assert!(!report.spawn.from_cursor);
    // Bottom plane at 0, stone floor at 1, spawn in the air above.
    assert_eq!((report.spawn.x, report.spawn.y, report.spawn.z), (8, 8, 2));

    let chunk = report.world_dir.join("0/0/c.0.0.dat");
    assert_eq!(fs::metadata(&chunk).unwrap().len(), report.size_on_disk);

    let level = gunzip(&report.world_dir.join("level.dat"));
    let contains = |needle: &[u8]| level.windows(needle.len()).any(|w| w == needle);
    assert!(contains(&int_tag("SpawnX", 8)));
    assert!(contains(&int_tag("SpawnY", 3)));
    assert!(contains(&int_tag("SpawnZ", 8)));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_rendered_grid_matches_chunk_on_disk() {
    let dir = temp_dir("render");
    let config = Config::from_toml_str(&config_text(&dir)).unwrap();
    let mut ctx = ConversionContext::from_config(&config).unwrap();
    let world = WorldSnapshot::from_toml_str(WORLD).unwrap();

    let rendered = render(&mut ctx, &world).unwrap();
    let grid = &rendered.grid;
    assert_eq!(grid.material(0, 0, 0), 89);
    assert_eq!(grid.material(5, 9, 1), 1);
    assert_eq!(grid.material(5, 9, 2), 0);
    assert_eq!(grid.block_light(5, 9, 0), 15);
    assert_eq!(grid.sky_light(5, 9, 2), 15);
    assert_eq!(grid.sky_light(5, 9, 1), 0);
    assert!(!rendered.saw_ice);
    assert_eq!(rendered.torches, 0);

    let report = export(&ctx, &rendered).unwrap();
    let on_disk = gunzip(&report.world_dir.join("0/0/c.0.0.dat"));
    let mut encoder = ColumnEncoder::new();
    let expected = encode_document(&chunk_document(0, 0, encoder.encode(grid, 0, 0)).unwrap()).unwrap();
    assert_eq!(on_disk, expected);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_bottom_level_sand_sees_air_below() {
    let dir = temp_dir("sand");
    let sand = r#"
        [[materials]]
        name = "sand"
        id = 12
        sand = true

        [[materials]]
        name = "air"
        id = 0
        non_support = true
    "#;
    let config = Config::from_toml_str(&config_with(&dir, "sand", sand)).unwrap();
    assert_eq!(config.settings.safe_sand, 3);
    let mut ctx = ConversionContext::from_config(&config).unwrap();
    let world = WorldSnapshot::from_toml_str(
        r#"
        [world]
        blocks_x = 1
        blocks_y = 1
        levels = 1

        [[regions]]
        from = [0, 0, 0]
        to = [15, 15, 0]
        shape = "floor"
        material = "stone"
        name = "sand floor"
        "#,
    )
    .unwrap();

    let rendered = render(&mut ctx, &world).unwrap();
    let grid = &rendered.grid;
    for (x, y) in [(0, 0), (7, 8), (15, 15)] {
        assert_eq!(grid.material(x, y, 0), 89);
        assert_eq!(grid.material(x, y, 1), 3);
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_interior_tile_height_and_light_on_disk() {
    let dir = temp_dir("interior");
    let config_path = dir.join("voxmorph.toml");
    let world_path = dir.join("world.toml");
    fs::write(&config_path, config_text(&dir)).unwrap();
    fs::write(
        &world_path,
        r#"
        [world]
        blocks_x = 1
        blocks_y = 1
        levels = 4

        [[tiles]]
        x = 7
        y = 7
        z = 1
        shape = "floor"
        material = "stone"
        name = "stone floor"
        "#,
    )
    .unwrap();

    let report = run(&config_path, &world_path).unwrap();
    assert_eq!(report.levels, 4);
    let chunk = gunzip(&report.world_dir.join("0/0/c.0.0.dat"));

    // Source (7, 7) on level 1 lands at column (7, 8), cell 2.
    let cell = |xx: usize, yy: usize, zz: usize| zz + yy * 128 + xx * 2048;
    let blocks = byte_array(&chunk, "Blocks", 32_768);
    assert_eq!(blocks[cell(7, 8, 2)], 1);
    assert_eq!(blocks[cell(7, 8, 1)], 0);
    assert_eq!(blocks[cell(7, 8, 0)], 89);

    let heights = byte_array(&chunk, "HeightMap", 256);
    assert_eq!(heights[8 * 16 + 7], 3);
    assert_eq!(heights[0], 1);
    assert_eq!(heights[8 * 16 + 6], 1);

    // Air between the glowing bottom plane and the stone gets 15 - 1.
    let block_light = byte_array(&chunk, "BlockLight", 16_384);
    let at = cell(7, 8, 1);
    assert_eq!(block_light[at / 2] >> 4, 14);
    let at = cell(0, 0, 0);
    assert_eq!(block_light[at / 2] & 0x0f, 15);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_snapshot_is_load_error() {
    let dir = temp_dir("missing");
    let config_path = dir.join("voxmorph.toml");
    fs::write(&config_path, config_text(&dir)).unwrap();
    let err = run(&config_path, &dir.join("nope.toml")).unwrap_err();
    assert_eq!(err.code(), 2);
    fs::remove_dir_all(&dir).unwrap();
}
