//! Configuration management for the CLI

use anyhow::{Context, Result};
use predictor_lib::{predictor::DEFAULT_MODEL_PATH, RegionCodes};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration, read from `~/.config/icp/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default estimator artifact
    pub model_path: Option<PathBuf>,
    /// Region codes matching the artifact, if not the standard ones
    pub region_codes: Option<RegionCodes>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file, missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Model path from the command line, then the config file, then the default
    pub fn resolve_model_path(&self, override_path: Option<PathBuf>) -> PathBuf {
        override_path
            .or_else(|| self.model_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    fn config_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("icp").join("config.json"))
    }
}
