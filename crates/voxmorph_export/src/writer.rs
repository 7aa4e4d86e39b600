//! # World Writer
//!
//! Owns one output world directory. Columns are written in x-major order,
//! each compressed with GZIP at the best level; `level.dat` goes last so
//! it can carry the total compressed size.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, info};
use voxmorph_core::VoxelGrid;
use voxmorph_nbt::{encode_document, NamedTag};

use crate::column::{chunk_document, ColumnEncoder, CHUNK_SIDE};
use crate::error::{ExportError, ExportResult};
use crate::level::{level_document, LevelInfo};
use crate::naming::column_path;

/// Prefix used when the configured world name is empty.
pub const DEFAULT_WORLD_PREFIX: &str = "World ";

/// Highest numeric suffix tried for a free world directory.
pub const MAX_WORLD_SUFFIX: u32 = 9999;

/// Compresses `bytes` into a GZIP stream.
///
/// # Errors
///
/// Returns `Compress` if the encoder fails.
pub fn gzip(bytes: &[u8], path: &Path) -> ExportResult<Vec<u8>> {
    let compress_err = |source| ExportError::Compress {
        path: path.to_path_buf(),
        source,
    };
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 4), Compression::best());
    encoder.write_all(bytes).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}

/// First free `{prefix}{n}` directory under `parent`, `n` in `1..=9999`.
#[must_use]
pub fn free_world_dir(parent: &Path, prefix: &str) -> Option<PathBuf> {
    (1..=MAX_WORLD_SUFFIX)
        .map(|n| parent.join(format!("{prefix}{n}")))
        .find(|candidate| !candidate.exists())
}

/// Writes chunk files and the level descriptor of one world.
#[derive(Debug)]
pub struct WorldWriter {
    root: PathBuf,
    encoder: ColumnEncoder,
    size_on_disk: u64,
    columns: usize,
}

impl WorldWriter {
    /// Creates a fresh world directory under `parent`.
    ///
    /// # Errors
    ///
    /// Returns `NoFreeName` if every suffix is taken and `WorldDir` if the
    /// directory cannot be created.
    pub fn create(parent: &Path, name: &str) -> ExportResult<Self> {
        let prefix = if name.is_empty() {
            DEFAULT_WORLD_PREFIX
        } else {
            name
        };
        let root = free_world_dir(parent, prefix).ok_or_else(|| ExportError::NoFreeName {
            prefix: prefix.to_owned(),
        })?;
        fs::create_dir_all(&root).map_err(|source| ExportError::WorldDir {
            path: root.clone(),
            source,
        })?;
        info!(path = %root.display(), "world directory created");
        Ok(Self::at(root))
    }

    /// Writes into an existing directory.
    #[must_use]
    pub fn at(root: PathBuf) -> Self {
        Self {
            root,
            encoder: ColumnEncoder::new(),
            size_on_disk: 0,
            columns: 0,
        }
    }

    /// World directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sum of compressed chunk sizes written so far.
    #[must_use]
    pub const fn size_on_disk(&self) -> u64 {
        self.size_on_disk
    }

    /// Number of chunk files written so far.
    #[must_use]
    pub const fn columns_written(&self) -> usize {
        self.columns
    }

    /// Writes every 16 x 16 column of the grid.
    ///
    /// # Errors
    ///
    /// Returns the first directory, compression or write failure.
    pub fn write_columns(&mut self, grid: &VoxelGrid) -> ExportResult<()> {
        for x0 in (0..grid.x_size()).step_by(CHUNK_SIDE) {
            for y0 in (0..grid.y_size()).step_by(CHUNK_SIDE) {
                self.write_column(grid, x0, y0)?;
            }
        }
        info!(
            columns = self.columns,
            bytes = self.size_on_disk,
            "chunk files written"
        );
        Ok(())
    }

    fn write_column(&mut self, grid: &VoxelGrid, x0: usize, y0: usize) -> ExportResult<()> {
        let x_pos = (x0 / CHUNK_SIDE) as i32;
        let z_pos = (y0 / CHUNK_SIDE) as i32;
        let paths = column_path(&self.root, x_pos, z_pos);
        fs::create_dir_all(&paths.outer).map_err(|source| ExportError::OuterDir {
            path: paths.outer.clone(),
            source,
        })?;
        fs::create_dir_all(&paths.inner).map_err(|source| ExportError::InnerDir {
            path: paths.inner.clone(),
            source,
        })?;

        let column = self.encoder.encode(grid, x0, y0);
        let doc = chunk_document(x_pos, z_pos, column)?;
        let written = write_document(&doc, &paths.file)?;
        self.size_on_disk += written as u64;
        self.columns += 1;
        debug!(x_pos, z_pos, bytes = written, "column written");
        Ok(())
    }

    /// Writes `level.dat`.
    ///
    /// # Errors
    ///
    /// Returns an encoding, compression or write failure.
    pub fn write_level(&self, info: &LevelInfo) -> ExportResult<PathBuf> {
        let path = self.root.join("level.dat");
        let doc = level_document(info)?;
        write_document(&doc, &path)?;
        info!(path = %path.display(), "level descriptor written");
        Ok(path)
    }
}

/// Encodes, compresses and writes one document. Returns the compressed size.
fn write_document(doc: &NamedTag, path: &Path) -> ExportResult<usize> {
    let raw = encode_document(doc)?;
    let packed = gzip(&raw, path)?;
    fs::write(path, &packed).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(packed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use flate2::read::GzDecoder;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("voxmorph_export_{name}_{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_gzip_round_trips() {
        let packed = gzip(b"hello hello hello", Path::new("mem")).unwrap();
        let mut out = String::new();
        GzDecoder::new(packed.as_slice())
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "hello hello hello");
    }

    #[test]
    fn test_world_names_skip_taken() {
        let parent = temp_dir("names");
        let first = WorldWriter::create(&parent, "").unwrap();
        assert_eq!(first.root(), parent.join("World 1"));
        let second = WorldWriter::create(&parent, "").unwrap();
        assert_eq!(second.root(), parent.join("World 2"));
        let named = WorldWriter::create(&parent, "Fort").unwrap();
        assert_eq!(named.root(), parent.join("Fort1"));
        fs::remove_dir_all(&parent).unwrap();
    }

    #[test]
    fn test_columns_land_in_base36_dirs() {
        let parent = temp_dir("columns");
        let mut writer = WorldWriter::create(&parent, "w").unwrap();
        let grid = VoxelGrid::try_new(32, 16, 128).unwrap();
        writer.write_columns(&grid).unwrap();

        assert_eq!(writer.columns_written(), 2);
        assert!(writer.root().join("0/0/c.0.0.dat").is_file());
        assert!(writer.root().join("1/0/c.1.0.dat").is_file());
        let total: u64 = ["0/0/c.0.0.dat", "1/0/c.1.0.dat"]
            .iter()
            .map(|p| fs::metadata(writer.root().join(p)).unwrap().len())
            .sum();
        assert_eq!(writer.size_on_disk(), total);
        fs::remove_dir_all(&parent).unwrap();
    }
}
