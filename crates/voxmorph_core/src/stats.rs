//! # Conversion Statistics
//!
//! Match-quality counters per feature category. These are the numbers an
//! operator compares between runs, so every counter bump lives next to the
//! lookup that caused it.

use std::fmt;

use tracing::info;

/// Feature category a counter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatArea {
    /// Material cascade.
    Materials,
    /// Terrain shapes.
    Terrain,
    /// Liquid flows.
    Flows,
    /// Vegetation.
    Plants,
    /// Buildings and torches.
    Buildings,
}

impl StatArea {
    /// All areas in report order.
    pub const ALL: [Self; 5] = [
        Self::Materials,
        Self::Terrain,
        Self::Flows,
        Self::Plants,
        Self::Buildings,
    ];

    /// Section name used in configuration and the unknown-feature log.
    #[must_use]
    pub const fn section(self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Terrain => "terrain",
            Self::Flows => "flows",
            Self::Plants => "plants",
            Self::Buildings => "buildings",
        }
    }
}

/// Outcome a counter tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// Nothing matched; air was used.
    Unknown,
    /// A less specific key matched.
    Imperfect,
    /// The most specific key matched.
    Perfect,
    /// A key was added to the unknown-feature log for the first time.
    Unseen,
}

/// Counters for every area and kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionStats {
    counts: [[u64; 4]; 5],
}

impl ConversionStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments one counter.
    #[inline]
    pub fn bump(&mut self, area: StatArea, kind: StatKind) {
        self.counts[area as usize][kind as usize] += 1;
    }

    /// Reads one counter.
    #[inline]
    #[must_use]
    pub fn get(&self, area: StatArea, kind: StatKind) -> u64 {
        self.counts[area as usize][kind as usize]
    }

    /// Logs one line per area.
    pub fn log_summary(&self) {
        for area in StatArea::ALL {
            info!(
                area = area.section(),
                unknown = self.get(area, StatKind::Unknown),
                imperfect = self.get(area, StatKind::Imperfect),
                perfect = self.get(area, StatKind::Perfect),
                new = self.get(area, StatKind::Unseen),
                "match statistics"
            );
        }
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for area in StatArea::ALL {
            writeln!(
                f,
                "{:<10} unknown: {}  imperfect: {}  perfect: {}  new: {}",
                area.section(),
                self.get(area, StatKind::Unknown),
                self.get(area, StatKind::Imperfect),
                self.get(area, StatKind::Perfect),
                self.get(area, StatKind::Unseen),
            )?;
        }
        Ok(())
    }
}
