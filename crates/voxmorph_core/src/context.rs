//! # Conversion Context
//!
//! Everything one conversion run mutates or reads repeatedly, built once
//! from the configuration. Nothing here is global; two runs with their own
//! contexts never share state.

use tracing::info;

use crate::cascade::Resolver;
use crate::config::{Config, Settings};
use crate::error::CoreResult;
use crate::opacity::OpacityTable;
use crate::stamp::GravityRules;
use crate::unknown::UnknownFeatureLog;

/// Per-run state.
#[derive(Debug)]
pub struct ConversionContext {
    /// Run parameters.
    pub settings: Settings,
    /// Template lookup with statistics.
    pub resolver: Resolver,
    /// Light behaviour per material.
    pub opacity: OpacityTable,
    /// Sand and non-support sets.
    pub gravity: GravityRules,
}

impl ConversionContext {
    /// Builds a context with the given unknown-feature log.
    #[must_use]
    pub fn new(config: &Config, unknown: UnknownFeatureLog) -> Self {
        let settings = config.settings.clone();
        let palette = config.palette();
        let library = config.library(&palette);
        let resolver = Resolver::new(library, unknown, settings.cube_size, settings.record_unknown);
        Self {
            opacity: config.opacity(),
            gravity: config.gravity(),
            resolver,
            settings,
        }
    }

    /// Builds a context, loading the unknown-feature log named in the
    /// settings when recording is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing log file cannot be read or parsed.
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let size = config.settings.cube_size;
        let unknown = if config.settings.record_unknown {
            UnknownFeatureLog::load(&config.settings.unknown_log, size)?
        } else {
            UnknownFeatureLog::new(size)
        };
        Ok(Self::new(config, unknown))
    }

    /// Merges newly seen unknown features into the configured log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or written.
    pub fn save_unknown(&self) -> CoreResult<()> {
        if !self.settings.record_unknown {
            return Ok(());
        }
        self.resolver.unknown().save_merged(&self.settings.unknown_log)?;
        info!(path = %self.settings.unknown_log.display(), "unknown features saved");
        Ok(())
    }
}
