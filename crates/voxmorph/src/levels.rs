//! # Vertical Level Selection
//!
//! Chooses which source levels are exported. Kept levels are stacked in
//! the output without gaps, so the output level of a kept source level is
//! the number of kept levels below it.
//!
//! | Mode | Keeps |
//! |---|---|
//! | `none` | every level |
//! | `top` | the top `levels`, or with `air_to_keep` the `levels` below the highest solid level plus that much air |
//! | `range` | `levels` levels ending at `top_level` (0 = world top) |
//! | `smart` | levels with floors, pillars, fortifications or ramps, air above them, then filler levels |
//!
//! Whatever the mode, at most `127 / cube_size` levels survive; surplus
//! levels are dropped from the bottom.

use tracing::{debug, info};
use voxmorph_core::config::MAX_OUTPUT_HEIGHT;
use voxmorph_core::{VerticalMode, VerticalSettings};

/// What a level scan looks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelProbe {
    /// Any shape other than empty.
    Solid,
    /// Floors, pillars, fortifications, ramps or ramp tops.
    Built,
}

/// Source levels chosen for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSelection {
    keep: Vec<bool>,
}

impl LevelSelection {
    /// Keeps exactly the flagged levels.
    #[must_use]
    pub fn from_flags(keep: Vec<bool>) -> Self {
        Self { keep }
    }

    /// Whether source level `z` is exported.
    #[must_use]
    pub fn is_kept(&self, z: usize) -> bool {
        self.keep.get(z).copied().unwrap_or(false)
    }

    /// Number of exported levels.
    #[must_use]
    pub fn kept_count(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    /// Number of exported levels strictly below source level `z`.
    #[must_use]
    pub fn kept_below(&self, z: usize) -> usize {
        self.keep.iter().take(z).filter(|&&k| k).count()
    }

    /// Output level of source level `z`, if exported.
    #[must_use]
    pub fn output_level(&self, z: usize) -> Option<usize> {
        self.is_kept(z).then(|| self.kept_below(z))
    }

    /// `(source level, output level)` pairs, bottom up.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.keep
            .iter()
            .enumerate()
            .filter(|(_, &k)| k)
            .map(|(z, _)| z)
            .enumerate()
            .map(|(out, z)| (z, out))
    }

    /// Unmarks the lowest kept levels until at most `limit` remain.
    fn drop_from_bottom(&mut self, limit: usize) {
        let mut count = self.kept_count();
        for flag in &mut self.keep {
            if count <= limit {
                break;
            }
            if *flag {
                *flag = false;
                count -= 1;
            }
        }
    }
}

/// Keeps `(top - levels, top]`.
fn window_below(total: usize, top: usize, levels: usize) -> Vec<bool> {
    (0..total).map(|z| z <= top && z + levels > top).collect()
}

/// Selects the exported levels of a world `total` levels high.
///
/// `has` answers whether a level contains anything matching the probe;
/// it is only called by the `top` (with `air_to_keep`) and `smart` modes.
pub fn select_levels(
    vertical: &VerticalSettings,
    cube_size: usize,
    total: usize,
    mut has: impl FnMut(usize, LevelProbe) -> bool,
) -> LevelSelection {
    if total == 0 {
        return LevelSelection::from_flags(Vec::new());
    }
    let top_index = total - 1;
    let levels = vertical.levels as usize;
    let air = vertical.air_to_keep as usize;
    let cap = (MAX_OUTPUT_HEIGHT as usize) / cube_size.max(1);

    let mut selection = match vertical.mode {
        VerticalMode::None => LevelSelection::from_flags(vec![true; total]),
        VerticalMode::Top => {
            if air < 1 || air > total / 2 {
                let first = total.saturating_sub(levels);
                LevelSelection::from_flags((0..total).map(|z| z >= first).collect())
            } else {
                let highest = (0..total).rev().find(|&z| has(z, LevelProbe::Solid));
                let top = highest.map_or(top_index, |h| (h + air).min(top_index));
                LevelSelection::from_flags(window_below(total, top, levels))
            }
        }
        VerticalMode::Range => {
            let top = usize::try_from(vertical.top_level)
                .ok()
                .filter(|&t| t > 0)
                .map_or(top_index, |t| t.min(top_index));
            LevelSelection::from_flags(window_below(total, top, levels))
        }
        VerticalMode::Smart => smart(total, levels, air, &mut has),
    };

    let limit = match vertical.mode {
        VerticalMode::None => cap,
        _ => levels.min(cap),
    };
    selection.drop_from_bottom(limit);
    info!(
        mode = ?vertical.mode,
        total,
        kept = selection.kept_count(),
        "levels selected"
    );
    selection
}

fn smart(
    total: usize,
    levels: usize,
    air: usize,
    has: &mut impl FnMut(usize, LevelProbe) -> bool,
) -> LevelSelection {
    let top_index = total - 1;
    let mut keep: Vec<bool> = (0..total).map(|z| has(z, LevelProbe::Built)).collect();

    let highest = keep.iter().rposition(|&k| k);
    let top = highest.map_or(top_index, |h| (h + air).min(top_index));
    for z in (0..=top).rev() {
        if keep[z] {
            break;
        }
        keep[z] = true;
    }

    let mut selection = LevelSelection::from_flags(keep);
    let mut count = selection.kept_count();
    if count > levels {
        selection.drop_from_bottom(levels);
    } else {
        // One filler level under each kept run, repeated until full or
        // nothing more can be added.
        while count < levels {
            let before = count;
            let mut above_kept = false;
            for z in (0..total).rev() {
                if count >= levels {
                    break;
                }
                if !selection.keep[z] && above_kept {
                    selection.keep[z] = true;
                    count += 1;
                    above_kept = false;
                } else {
                    above_kept = selection.keep[z];
                }
            }
            if count == before {
                break;
            }
        }
    }
    debug!(kept = selection.kept_count(), "smart selection");
    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(mode: VerticalMode, levels: u32, air_to_keep: u32, top_level: i32) -> VerticalSettings {
        VerticalSettings {
            mode,
            levels,
            air_to_keep,
            top_level,
        }
    }

    fn kept(selection: &LevelSelection) -> Vec<usize> {
        selection.iter().map(|(z, _)| z).collect()
    }

    #[test]
    fn test_none_keeps_everything_up_to_cap() {
        let all = select_levels(&settings(VerticalMode::None, 3, 0, 0), 1, 10, |_, _| false);
        assert_eq!(all.kept_count(), 10);

        let capped = select_levels(&settings(VerticalMode::None, 1000, 0, 0), 10, 40, |_, _| false);
        assert_eq!(kept(&capped), vec![28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39]);
    }

    #[test]
    fn test_top_without_air_keeps_top_levels() {
        let sel = select_levels(&settings(VerticalMode::Top, 3, 0, 0), 1, 10, |_, _| true);
        assert_eq!(kept(&sel), vec![7, 8, 9]);
    }

    #[test]
    fn test_top_with_air_tracks_highest_solid() {
        let sel = select_levels(&settings(VerticalMode::Top, 4, 2, 0), 1, 20, |z, probe| {
            assert_eq!(probe, LevelProbe::Solid);
            z <= 10
        });
        assert_eq!(kept(&sel), vec![9, 10, 11, 12]);
    }

    #[test]
    fn test_range() {
        let sel = select_levels(&settings(VerticalMode::Range, 3, 0, 5), 1, 10, |_, _| false);
        assert_eq!(kept(&sel), vec![3, 4, 5]);
        let from_top = select_levels(&settings(VerticalMode::Range, 2, 0, 0), 1, 10, |_, _| false);
        assert_eq!(kept(&from_top), vec![8, 9]);
    }

    #[test]
    fn test_smart_adds_air_and_trims_bottom() {
        // Built levels 2, 3 and 6 plus air 7 and 8; level 2 is trimmed.
        let built = [2, 3, 6];
        let sel = select_levels(&settings(VerticalMode::Smart, 4, 2, 0), 1, 12, |z, probe| {
            assert_eq!(probe, LevelProbe::Built);
            built.contains(&z)
        });
        assert_eq!(kept(&sel), vec![3, 6, 7, 8]);
    }

    #[test]
    fn test_smart_fills_below_kept_runs() {
        let sel = select_levels(&settings(VerticalMode::Smart, 5, 1, 0), 1, 10, |z, _| z == 4);
        // Kept after air: 4, 5. Fillers go under each run: 3, then 2, then 1.
        assert_eq!(kept(&sel), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_output_levels_are_dense() {
        let sel = LevelSelection::from_flags(vec![false, true, false, true, true]);
        assert_eq!(sel.output_level(1), Some(0));
        assert_eq!(sel.output_level(2), None);
        assert_eq!(sel.output_level(4), Some(2));
        assert_eq!(sel.kept_below(3), 1);
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![(1, 0), (3, 1), (4, 2)]);
    }
}
