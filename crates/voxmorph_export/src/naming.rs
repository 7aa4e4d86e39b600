//! # Column Naming
//!
//! Chunk files live two directories deep, named in base 36:
//!
//! ```text
//! <world>/<b36(x mod 64)>/<b36(z mod 64)>/c.<b36(x)>.<b36(z)>.dat
//! ```
//!
//! Negative numbers are written with a leading `-`. Both directories use
//! the non-negative remainder.

use std::path::{Path, PathBuf};

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Lowercase base-36 text of a number.
#[must_use]
pub fn to_base36(value: i64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut n = value.unsigned_abs();
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

/// Location of one column file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnPath {
    /// Outer directory.
    pub outer: PathBuf,
    /// Inner directory.
    pub inner: PathBuf,
    /// Chunk file.
    pub file: PathBuf,
}

/// Path of the column at chunk coordinates `(x_pos, z_pos)` under `root`.
#[must_use]
pub fn column_path(root: &Path, x_pos: i32, z_pos: i32) -> ColumnPath {
    let outer = root.join(to_base36(i64::from(x_pos.rem_euclid(64))));
    let inner = outer.join(to_base36(i64::from(z_pos.rem_euclid(64))));
    let file = inner.join(format!(
        "c.{}.{}.dat",
        to_base36(i64::from(x_pos)),
        to_base36(i64::from(z_pos))
    ));
    ColumnPath { outer, inner, file }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(-13), "-d");
        assert_eq!(to_base36(1295), "zz");
        assert_eq!(to_base36(i64::MIN), "-1y2p0ij32e8e8");
    }

    #[test]
    fn test_column_path_layout() {
        let p = column_path(Path::new("w"), 65, 2);
        assert_eq!(p.outer, Path::new("w/1"));
        assert_eq!(p.inner, Path::new("w/1/2"));
        assert_eq!(p.file, Path::new("w/1/2/c.1t.2.dat"));
    }

    #[test]
    fn test_negative_columns_wrap_both_dirs() {
        let p = column_path(Path::new("w"), 0, -1);
        assert_eq!(p.inner, Path::new("w/0/1r"));
        assert_eq!(p.file, Path::new("w/0/1r/c.0.-1.dat"));

        let p = column_path(Path::new("w"), -1, -65);
        assert_eq!(p.outer, Path::new("w/1r"));
        assert_eq!(p.inner, Path::new("w/1r/1r"));
        assert_eq!(p.file, Path::new("w/1r/1r/c.-1.-1t.dat"));
    }
}
