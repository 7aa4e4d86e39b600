//! # Symbolic Keys
//!
//! Template names are built from up to five feature attributes and looked
//! up most specific first. Twelve candidates exist; slot 11 is the most
//! specific and slot 0 is the base category alone:
//!
//! | slot | key                                | needs             |
//! |------|------------------------------------|-------------------|
//! | 11   | `base.variant.full.smat-cmat`      | full, smat, cmat  |
//! | 10   | `base.variant.full.smat`           | full, smat        |
//! | 9    | `base.variant.full`                | full              |
//! | 8    | `base.full.smat-cmat`              | full, smat, cmat  |
//! | 7    | `base.full.smat`                   | full, smat        |
//! | 6    | `base.full`                        | full              |
//! | 5    | `base.variant.smat-cmat`           | smat, cmat        |
//! | 4    | `base.variant.smat`                | smat              |
//! | 3    | `base.variant`                     |                   |
//! | 2    | `base.smat-cmat`                   | smat, cmat        |
//! | 1    | `base.smat`                        | smat              |
//! | 0    | `base`                             |                   |

/// Number of candidate slots.
pub const CANDIDATE_COUNT: usize = 12;

/// Normalizes a key: every character other than ASCII letters, digits,
/// `_`, `.` and `-` becomes `_`, and letters are lowercased.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Feature attributes used to build candidate keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterialQuery<'a> {
    /// Base category, always present.
    pub base: &'a str,
    /// Variant number.
    pub variant: i32,
    /// Descriptive feature name.
    pub full: Option<&'a str>,
    /// Specific material.
    pub smat: Option<&'a str>,
    /// Construction material.
    pub cmat: Option<&'a str>,
}

impl<'a> MaterialQuery<'a> {
    /// A query with only a base category.
    #[must_use]
    pub const fn base(base: &'a str) -> Self {
        Self {
            base,
            variant: 0,
            full: None,
            smat: None,
            cmat: None,
        }
    }
}

/// Normalized candidate keys, indexed by slot; `None` where a required
/// attribute is absent. Empty strings count as absent.
#[must_use]
pub fn candidate_keys(query: &MaterialQuery<'_>) -> [Option<String>; CANDIDATE_COUNT] {
    let b = query.base;
    let v = query.variant;
    let full = query.full.filter(|s| !s.is_empty());
    let smat = query.smat.filter(|s| !s.is_empty());
    let cmat = query.cmat.filter(|s| !s.is_empty());

    let mut keys: [Option<String>; CANDIDATE_COUNT] = Default::default();

    if let Some(s) = smat {
        if let Some(c) = cmat {
            if let Some(f) = full {
                keys[11] = Some(format!("{b}.{v}.{f}.{s}-{c}"));
                keys[8] = Some(format!("{b}.{f}.{s}-{c}"));
            }
            keys[5] = Some(format!("{b}.{v}.{s}-{c}"));
            keys[2] = Some(format!("{b}.{s}-{c}"));
        }
        if let Some(f) = full {
            keys[10] = Some(format!("{b}.{v}.{f}.{s}"));
            keys[7] = Some(format!("{b}.{f}.{s}"));
        }
        keys[4] = Some(format!("{b}.{v}.{s}"));
        keys[1] = Some(format!("{b}.{s}"));
    }
    if let Some(f) = full {
        keys[9] = Some(format!("{b}.{v}.{f}"));
        keys[6] = Some(format!("{b}.{f}"));
    }
    keys[3] = Some(format!("{b}.{v}"));
    keys[0] = Some(b.to_owned());

    for key in keys.iter_mut().flatten() {
        *key = normalize_key(key);
    }
    keys
}
