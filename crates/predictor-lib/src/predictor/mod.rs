//! ML prediction engine

mod inference;
mod linear;
mod loader;
mod output;

pub use inference::OnnxEstimator;
pub use linear::{LinearEstimator, LinearModelArtifact};
pub use loader::{load_model, LoadedModel, ModelFormat, ModelInfo, DEFAULT_MODEL_PATH};
pub use output::{format_currency, PredictionOutcome};

use crate::encoding::Encoding;
use crate::error::PredictError;
use crate::models::{FeatureVector, PredictionRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Maximum single-row latency before warning
const MAX_INFERENCE_MS: u128 = 5;

/// Trait for trained regression estimators
///
/// Row batch in, one scalar per row out.
pub trait Estimator: Send + Sync {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictError>;

    /// Version string reported in logs and metrics
    fn model_version(&self) -> &str {
        "unknown"
    }
}

/// Turns raw form input into a single predicted cost
///
/// Holds the loaded estimator read-only; every call is independent.
#[derive(Clone)]
pub struct PredictionAdapter {
    estimator: Arc<dyn Estimator>,
    encoding: Encoding,
}

impl PredictionAdapter {
    pub fn new(estimator: Arc<dyn Estimator>) -> Self {
        Self::with_encoding(estimator, Encoding::default())
    }

    pub fn with_encoding(estimator: Arc<dyn Estimator>, encoding: Encoding) -> Self {
        Self {
            estimator,
            encoding,
        }
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn model_version(&self) -> &str {
        self.estimator.model_version()
    }

    pub fn encode(&self, request: &PredictionRequest) -> Result<FeatureVector, PredictError> {
        self.encoding.encode(request)
    }

    /// Encode the request, run a batch of one and return the only scalar
    pub fn predict(&self, request: &PredictionRequest) -> Result<f64, PredictError> {
        let features = self.encode(request)?;
        self.predict_features(&features)
    }

    /// Same as [`predict`](Self::predict) but keeps the encoded row and metadata
    pub fn predict_detailed(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionOutcome, PredictError> {
        let features = self.encode(request)?;
        let cost = self.predict_features(&features)?;
        Ok(PredictionOutcome::new(cost, features, self.model_version()))
    }

    fn predict_features(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let start = Instant::now();
        let outputs = self.estimator.predict(std::slice::from_ref(features))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        if outputs.len() != 1 {
            return Err(PredictError::inference(format!(
                "estimator returned {} values for a single row",
                outputs.len()
            )));
        }

        let cost = outputs[0];
        if !cost.is_finite() {
            return Err(PredictError::inference(format!(
                "estimator returned non-finite value {}",
                cost
            )));
        }
        Ok(cost)
    }
}
