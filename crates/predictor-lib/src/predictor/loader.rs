//! Startup model loading
//!
//! Reads the estimator artifact once, checksums it and builds the matching
//! estimator. The result is an immutable handle shared by every request.

use super::{Estimator, LinearEstimator, OnnxEstimator};
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Artifact path used when nothing is configured
pub const DEFAULT_MODEL_PATH: &str = "trained_insurance.onnx";

/// Serialized estimator format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Pick from the file extension
    #[default]
    Auto,
    Onnx,
    Linear,
}

impl ModelFormat {
    /// Resolve `Auto` from the artifact's extension
    pub fn resolve(self, path: &Path) -> Option<ModelFormat> {
        match self {
            ModelFormat::Auto => {
                let ext = path.extension()?.to_str()?.to_ascii_lowercase();
                match ext.as_str() {
                    "onnx" => Some(ModelFormat::Onnx),
                    "json" => Some(ModelFormat::Linear),
                    _ => None,
                }
            }
            other => Some(other),
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelFormat::Auto => "auto",
            ModelFormat::Onnx => "onnx",
            ModelFormat::Linear => "linear",
        };
        f.write_str(name)
    }
}

/// Metadata about the loaded artifact
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub path: PathBuf,
    pub format: ModelFormat,
    pub checksum: String,
    pub size_bytes: usize,
    pub model_version: String,
}

/// Estimator plus the metadata of the artifact it came from
#[derive(Clone)]
pub struct LoadedModel {
    pub estimator: Arc<dyn Estimator>,
    pub info: ModelInfo,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Load the estimator artifact at `path`
///
/// Fails with [`LoadError::ArtifactNotFound`] when the file is missing and
/// [`LoadError::ArtifactCorrupt`] when it cannot be deserialized.
pub fn load_model(path: impl AsRef<Path>, format: ModelFormat) -> Result<LoadedModel, LoadError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoadError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = format.resolve(path).ok_or_else(|| {
        LoadError::corrupt(path, "unsupported artifact extension, expected .onnx or .json")
    })?;

    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::ArtifactNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::corrupt(path, format!("failed to read artifact: {}", e)),
    })?;
    debug!(path = %path.display(), size_bytes = bytes.len(), "Read model artifact");

    let checksum = hex::encode(Sha256::digest(&bytes));
    let fallback_version = format!("sha256:{}", &checksum[..12]);

    let estimator: Arc<dyn Estimator> = match format {
        ModelFormat::Onnx => {
            let estimator = OnnxEstimator::from_bytes(&bytes, fallback_version)
                .map_err(|e| LoadError::corrupt(path, format!("{:#}", e)))?;
            Arc::new(estimator)
        }
        ModelFormat::Linear => {
            let estimator = LinearEstimator::from_json(&bytes, &fallback_version)
                .map_err(|e| LoadError::corrupt(path, format!("{:#}", e)))?;
            Arc::new(estimator)
        }
        ModelFormat::Auto => {
            return Err(LoadError::corrupt(path, "artifact format could not be resolved"));
        }
    };

    let info = ModelInfo {
        path: path.to_path_buf(),
        format,
        checksum,
        size_bytes: bytes.len(),
        model_version: estimator.model_version().to_string(),
    };
    debug!(
        path = %info.path.display(),
        format = %info.format,
        checksum = %info.checksum,
        model_version = %info.model_version,
        "Model loaded"
    );

    Ok(LoadedModel { estimator, info })
}
