//! Configuration for the window management core.
//!
//! Settings are loaded from TOML and cover the tunable parts of placement
//! and focus behavior. Every section has serde defaults so a partial file
//! (or none at all) yields a working configuration; `validate()` clamps
//! out-of-range values rather than refusing to start.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CoreConfig {
    /// Placement tunables (cascade offset, size floor, tiling gap)
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Focus behavior
    #[serde(default)]
    pub focus: FocusConfig,
}

/// Placement tunables shared by the reference algorithms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// Offset applied to each subsequent top-level window within a tile (pixels)
    pub cascade_offset: i32,

    /// Smallest width/height any window may be resized to (pixels)
    pub min_size_floor: u32,

    /// Gap between tiles in the tiling partition (pixels)
    pub tile_gap: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            cascade_offset: 15,
            min_size_floor: 5,
            tile_gap: 0,
        }
    }
}

/// Focus behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FocusConfig {
    /// Maximum depth of the most-recently-used focus history
    pub mru_limit: usize,

    /// Raise a window's tree whenever it gains focus
    pub raise_on_focus: bool,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            mru_limit: 64,
            raise_on_focus: true,
        }
    }
}

impl CoreConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: CoreConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate();
        Ok(config)
    }

    /// Clamp out-of-range values to something workable.
    pub fn validate(&mut self) {
        if self.placement.min_size_floor == 0 {
            self.placement.min_size_floor = 1;
        }
        self.placement.cascade_offset = self.placement.cascade_offset.clamp(0, 256);
        self.placement.tile_gap = self.placement.tile_gap.min(512);
        if self.focus.mru_limit == 0 {
            self.focus.mru_limit = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let mut config = CoreConfig::default();
        let before = config.clone();
        config.validate();
        assert_eq!(config, before);
    }

    #[test]
    fn partial_file_fills_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[placement]\ncascade_offset = 20")?;

        let config = CoreConfig::load_from_file(file.path())?;
        assert_eq!(config.placement.cascade_offset, 20);
        assert_eq!(config.placement.min_size_floor, 5);
        assert_eq!(config.focus.mru_limit, 64);
        Ok(())
    }

    #[test]
    fn validate_clamps_degenerate_values() {
        let mut config = CoreConfig::default();
        config.placement.min_size_floor = 0;
        config.placement.cascade_offset = -4;
        config.focus.mru_limit = 0;

        config.validate();
        assert_eq!(config.placement.min_size_floor, 1);
        assert_eq!(config.placement.cascade_offset, 0);
        assert_eq!(config.focus.mru_limit, 1);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CoreConfig::load_from_file("/nonexistent/strata.toml").unwrap_err();
        assert!(err.to_string().contains("strata.toml"));
    }
}
