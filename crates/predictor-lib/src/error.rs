//! Error types for model loading and prediction

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the estimator artifact at startup.
///
/// Both variants are fatal: a process without a loaded model must not
/// accept prediction requests.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model artifact not found: {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("model artifact {} is corrupt: {reason}", .path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },
}

impl LoadError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound { .. } => "artifact_not_found",
            Self::ArtifactCorrupt { .. } => "artifact_corrupt",
        }
    }
}

/// Errors raised while handling a single prediction request
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("unknown {field} '{value}', expected one of: {}", .expected.join(", "))]
    UnknownCategory {
        field: &'static str,
        value: String,
        expected: &'static [&'static str],
    },

    #[error("feature '{feature}' must be a finite number, got {value}")]
    NonFiniteFeature { feature: &'static str, value: f64 },

    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),
}

impl PredictError {
    pub(crate) fn inference(message: impl std::fmt::Display) -> Self {
        Self::Inference(anyhow::anyhow!("{}", message))
    }

    /// Short machine-readable kind, used as a metric label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCategory { .. } => "unknown_category",
            Self::NonFiniteFeature { .. } => "non_finite_feature",
            Self::Inference(_) => "inference",
        }
    }

    /// Whether the error was caused by the submitted input rather than the model
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Inference(_))
    }
}

/// Errors raised when building a custom categorical encoding
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("region code {code} is assigned to both {first} and {second}")]
    DuplicateRegionCode {
        code: u8,
        first: &'static str,
        second: &'static str,
    },

    #[error("region code {code} for {region} is out of range, expected 0..=3")]
    RegionCodeOutOfRange { region: &'static str, code: u8 },
}
