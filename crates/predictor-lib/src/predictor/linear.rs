//! Linear regression estimator read from a JSON coefficient file
//!
//! ```json
//! {"version": "2024-01", "intercept": -11938.5,
//!  "coefficients": [256.9, -131.3, 339.2, 475.5, 23848.5, 352.9]}
//! ```

use super::Estimator;
use crate::error::PredictError;
use crate::models::{FeatureVector, FEATURE_COUNT};
use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk form of a fitted linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelArtifact {
    #[serde(default)]
    pub version: Option<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModelArtifact {
    /// Check that the artifact matches the six-feature layout
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.coefficients.len() == FEATURE_COUNT,
            "expected {} coefficients, found {}",
            FEATURE_COUNT,
            self.coefficients.len()
        );
        ensure!(self.intercept.is_finite(), "intercept is not finite");
        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            bail!("coefficient {} is not finite", i);
        }
        Ok(())
    }
}

/// Estimator computing `intercept + coefficients · features`
#[derive(Debug, Clone)]
pub struct LinearEstimator {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
    model_version: String,
}

impl LinearEstimator {
    pub fn new(intercept: f64, coefficients: [f64; FEATURE_COUNT]) -> Self {
        Self {
            intercept,
            coefficients,
            model_version: "linear".to_string(),
        }
    }

    pub fn from_artifact(artifact: LinearModelArtifact, fallback_version: &str) -> Result<Self> {
        artifact.validate()?;
        let mut coefficients = [0.0; FEATURE_COUNT];
        coefficients.copy_from_slice(&artifact.coefficients);
        Ok(Self {
            intercept: artifact.intercept,
            coefficients,
            model_version: artifact
                .version
                .unwrap_or_else(|| fallback_version.to_string()),
        })
    }

    pub fn from_json(bytes: &[u8], fallback_version: &str) -> Result<Self> {
        let artifact: LinearModelArtifact =
            serde_json::from_slice(bytes).context("invalid linear model JSON")?;
        Self::from_artifact(artifact, fallback_version)
    }

    fn evaluate(&self, row: &FeatureVector) -> f64 {
        row.to_array()
            .iter()
            .zip(self.coefficients.iter())
            .fold(self.intercept, |acc, (x, w)| acc + x * w)
    }
}

impl Estimator for LinearEstimator {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictError> {
        Ok(rows.iter().map(|row| self.evaluate(row)).collect())
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}
