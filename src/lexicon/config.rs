//! Configuration loading.
//!
//! Values resolve in this order:
//! 1. Command-line flags (applied by the binary)
//! 2. `LEXIGRAPH_CONFIG` / `--config` TOML file
//! 3. Compiled defaults

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::lexicon::import::DEFAULT_BATCH_SIZE;
use crate::lexicon::lookup::LookupOptions;
use crate::lexicon::rules::AgreementRules;
use crate::lexicon::types::error::{LexiconError, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "LEXIGRAPH_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Directory holding one `<src>-<dst>/` folder per binary dictionary.
    pub dictionary_root: PathBuf,
    /// JSON snapshot of the lexical graph.
    pub graph_path: PathBuf,
    pub import: ImportSettings,
    pub lookup: LookupSettings,
    pub inspect: InspectSettings,
    pub rules: AgreementRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    pub max_slice_len: u64,
    pub max_alternates: usize,
    pub lookup_limit: usize,
    pub candidate_lemmas: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectSettings {
    pub preview_chars: usize,
    pub max_len: u64,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            dictionary_root: PathBuf::from("data/stardict"),
            graph_path: PathBuf::from("data/graph.json"),
            import: ImportSettings::default(),
            lookup: LookupSettings::default(),
            inspect: InspectSettings::default(),
            rules: AgreementRules::default(),
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        let options = LookupOptions::default();
        Self {
            max_slice_len: options.max_slice_len,
            max_alternates: options.max_alternates,
            lookup_limit: options.lookup_limit,
            candidate_lemmas: options.candidate_lemmas,
        }
    }
}

impl Default for InspectSettings {
    fn default() -> Self {
        Self {
            preview_chars: 160,
            max_len: 512,
        }
    }
}

impl LookupSettings {
    pub fn options(&self) -> LookupOptions {
        LookupOptions {
            max_slice_len: self.max_slice_len,
            max_alternates: self.max_alternates.max(1),
            lookup_limit: self.lookup_limit.max(1),
            candidate_lemmas: self.candidate_lemmas.max(1),
        }
    }
}

impl LexiconConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LexiconError::Config(e.to_string()))
    }

    /// Reads the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LexiconError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `explicit` if given, else the file named by [`CONFIG_ENV`], else
    /// the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(path);
        }
        debug!("No configuration file, using defaults");
        Ok(Self::default())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LexiconError::Config(e.to_string()))
    }
}
