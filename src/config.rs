//! Run configuration
//!
//! A [`GenerationConfig`] describes one run: grid size, seed, pacing, the
//! generation method with its parameters, and optional tile appearance
//! overrides. It is stored as pretty JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::generation::GenerationMethod;
use crate::tileset::{TileOverride, Tileset};

/// Configuration parameters for a generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in cells (default: 64).
    pub width: usize,

    /// Grid length in cells (default: 64).
    pub length: usize,

    /// Random seed. A fresh one is drawn when absent.
    pub seed: Option<u64>,

    /// Pause between steps when visualising (0 = no pause).
    pub step_delay_ms: u64,

    pub method: GenerationMethod,

    /// Glyph/color replacements keyed by template name.
    pub tile_overrides: BTreeMap<String, TileOverride>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 64,
            length: 64,
            seed: None,
            step_delay_ms: 0,
            method: GenerationMethod::default(),
            tile_overrides: BTreeMap::new(),
        }
    }
}

impl GenerationConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> GenResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: GenerationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> GenResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.width == 0 || self.length == 0 {
            return Err(GenError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.length
            )));
        }
        self.method.validate()?;
        self.build_tileset().map(|_| ())
    }

    /// Default tileset with this config's overrides applied.
    pub fn build_tileset(&self) -> GenResult<Tileset> {
        let mut tileset = Tileset::default();
        for (name, over) in &self.tile_overrides {
            tileset.apply_override(name, over)?;
        }
        Ok(tileset)
    }
}
