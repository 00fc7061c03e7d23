//! Sound catalog — maps category names to on-disk audio files.
//!
//! The config is a JSON document with two maps mirroring the two
//! halves of the board: `sound_effects` and `ambient_sounds`, each
//! category naming one or more candidate files. Candidates are picked
//! uniformly at random on every resolve, and looked up under the
//! sounds directory with the `normalized_` prefix the offline
//! normalization step produces.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::{CatalogError, EngineError};

/// Which half of the board a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Effect,
    Ambient,
}

/// Catalog config as found on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub sound_effects: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub ambient_sounds: BTreeMap<String, Vec<String>>,
}

/// Resolves category names to playable file paths.
#[derive(Debug, Clone)]
pub struct SoundCatalog {
    sounds_dir: PathBuf,
    config: CatalogConfig,
}

impl SoundCatalog {
    pub fn new(config: CatalogConfig, sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            sounds_dir: sounds_dir.into(),
            config,
        }
    }

    /// Load the catalog config from a JSON file.
    pub fn load(config_path: &Path, sounds_dir: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let file = File::open(config_path)?;
        let config: CatalogConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::new(config, sounds_dir))
    }

    /// Category names for one half of the board, in listing order.
    pub fn categories(&self, kind: SoundKind) -> Vec<&str> {
        self.section(kind).keys().map(String::as_str).collect()
    }

    /// Pick a candidate file for `name` uniformly at random and return
    /// its full path. Fails with `NotFound` when the category is
    /// unknown, empty, or the chosen file is not on disk.
    pub fn resolve(&self, kind: SoundKind, name: &str) -> Result<PathBuf, EngineError> {
        let chosen = self
            .section(kind)
            .get(name)
            .and_then(|candidates| candidates.choose(&mut rand::thread_rng()))
            .ok_or_else(|| EngineError::NotFound {
                category: name.to_string(),
            })?;

        let path = self.sound_path(chosen);
        if path.exists() {
            Ok(path)
        } else {
            log::debug!("dmboard: missing sound file: {}", path.display());
            Err(EngineError::NotFound {
                category: name.to_string(),
            })
        }
    }

    /// Path convention: `<sounds_dir>/normalized_<file>`.
    pub fn sound_path(&self, file: &str) -> PathBuf {
        self.sounds_dir.join(format!("normalized_{}", file))
    }

    fn section(&self, kind: SoundKind) -> &BTreeMap<String, Vec<String>> {
        match kind {
            SoundKind::Effect => &self.config.sound_effects,
            SoundKind::Ambient => &self.config.ambient_sounds,
        }
    }
}
