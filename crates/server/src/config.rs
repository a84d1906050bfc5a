//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional file
//! named by `PREDICTOR_CONFIG`, then `PREDICTOR_*` environment variables
//! (`__` separates nested keys, e.g. `PREDICTOR_ENCODING__REGIONS__SOUTHEAST`).

use anyhow::{Context, Result};
use predictor_lib::{predictor::DEFAULT_MODEL_PATH, Encoding, ModelFormat, RegionCodes};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "PREDICTOR_CONFIG";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path to the trained estimator artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Artifact format, `auto` picks by extension
    #[serde(default)]
    pub model_format: ModelFormat,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the form page and health/metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Name attached to every structured log record
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    #[serde(default)]
    pub encoding: EncodingConfig,
}

/// Categorical encoding overrides tied to the trained artifact
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncodingConfig {
    #[serde(default)]
    pub regions: RegionCodes,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string())
}

impl ServerConfig {
    /// Load configuration from the optional file and the environment
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PREDICTOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read predictor configuration")?;

        Self::from_config(config)
    }

    pub fn from_config(config: config::Config) -> Result<Self> {
        let parsed: Self = config
            .try_deserialize()
            .context("Invalid predictor configuration")?;
        parsed.encoding()?;
        Ok(parsed)
    }

    /// Validated region encoding for the configured artifact
    pub fn encoding(&self) -> Result<Encoding> {
        Encoding::new(self.encoding.regions).context("Invalid region encoding")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }
}
