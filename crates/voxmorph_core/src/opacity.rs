//! # Material Opacity
//!
//! How each output material interacts with light. Every id starts fully
//! transparent; the material table in the configuration raises opacities,
//! turns materials into emitters (negative block opacity) or marks them as
//! partially lit.

/// Full light level.
pub const MAX_LIGHT: u8 = 15;

/// Per-material light behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpacityTable {
    sky: [u8; 256],
    block: [i8; 256],
    partial_lit: [bool; 256],
}

impl Default for OpacityTable {
    fn default() -> Self {
        Self {
            sky: [0; 256],
            block: [0; 256],
            partial_lit: [false; 256],
        }
    }
}

impl OpacityTable {
    /// Every material fully transparent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both opacities from one value. Sky opacity is clamped to
    /// `0..=15`, block opacity to `-15..=15`.
    pub fn set_opacity(&mut self, id: u8, opacity: i32) {
        self.set_sky(id, opacity);
        self.set_block(id, opacity);
    }

    /// Sets the sky opacity, clamped to `0..=15`.
    pub fn set_sky(&mut self, id: u8, opacity: i32) {
        self.sky[usize::from(id)] = u8::try_from(opacity.clamp(0, 15)).unwrap_or(MAX_LIGHT);
    }

    /// Sets the block opacity, clamped to `-15..=15`.
    pub fn set_block(&mut self, id: u8, opacity: i32) {
        self.block[usize::from(id)] = i8::try_from(opacity.clamp(-15, 15)).unwrap_or(0);
    }

    /// Marks a material as partially lit.
    pub fn set_partial_lit(&mut self, id: u8, partial: bool) {
        self.partial_lit[usize::from(id)] = partial;
    }

    /// Sky opacity of a material.
    #[inline]
    #[must_use]
    pub const fn sky(&self, id: u8) -> u8 {
        self.sky[id as usize]
    }

    /// Block opacity of a material; negative values emit light.
    #[inline]
    #[must_use]
    pub const fn block(&self, id: u8) -> i8 {
        self.block[id as usize]
    }

    /// True if the material is partially lit.
    #[inline]
    #[must_use]
    pub const fn partial_lit(&self, id: u8) -> bool {
        self.partial_lit[id as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_transparent() {
        let table = OpacityTable::new();
        assert_eq!(table.sky(200), 0);
        assert_eq!(table.block(200), 0);
        assert!(!table.partial_lit(200));
    }

    #[test]
    fn test_opacity_clamps() {
        let mut opacity = OpacityTable::new();
        opacity.set_opacity(1, 40);
        opacity.set_opacity(2, -40);
        assert_eq!(opacity.sky(1), 15);
        assert_eq!(opacity.block(1), 15);
        assert_eq!(opacity.sky(2), 0);
        assert_eq!(opacity.block(2), -15);
    }

    #[test]
    fn test_channels_set_independently() {
        let mut opacity = OpacityTable::new();
        opacity.set_opacity(50, 3);
        opacity.set_block(50, -10);
        assert_eq!(opacity.sky(50), 3);
        assert_eq!(opacity.block(50), -10);
    }
}
