//! ONNX inference using tract
//!
//! The trained regressor is exported to ONNX with one float input of shape
//! `[N, 6]` and one output of shape `[N]` or `[N, 1]`. The plan is optimized
//! for a single row; batches are evaluated row by row.
//!
//! Only standard ONNX operators are supported. A linear model exported with
//! the `ai.onnx.ml` `LinearRegressor` node fails to optimize and is reported
//! as a corrupt artifact; export it as `Gemm`/`MatMul` or use the linear JSON
//! format instead.

use super::Estimator;
use crate::error::PredictError;
use crate::models::{FeatureVector, FEATURE_COUNT};
use anyhow::{Context, Result};
use tract_onnx::prelude::*;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based estimator using tract for lightweight inference
pub struct OnnxEstimator {
    model: TractModel,
    model_version: String,
}

impl OnnxEstimator {
    /// Create an estimator from ONNX model bytes
    pub fn from_bytes(model_bytes: &[u8], model_version: impl Into<String>) -> Result<Self> {
        let model = Self::load_model(model_bytes)?;
        Ok(Self {
            model,
            model_version: model_version.into(),
        })
    }

    /// Load and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8]) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    /// Convert one feature row to a `[1, 6]` tensor
    fn features_to_tensor(features: &FeatureVector) -> Result<Tensor> {
        let data = features.to_f32_array().to_vec();
        let array = tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), data)
            .context("Failed to shape input row")?;
        Ok(array.into())
    }

    fn run_row(&self, features: &FeatureVector) -> Result<f64> {
        let input = Self::features_to_tensor(features)?;
        let result = self.model.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;

        let output = output
            .cast_to::<f64>()
            .context("Model output is not numeric")?;
        let values = output.to_array_view::<f64>()?;
        values
            .iter()
            .next()
            .copied()
            .context("Model output is empty")
    }
}

impl Estimator for OnnxEstimator {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictError> {
        rows.iter()
            .map(|row| self.run_row(row).map_err(PredictError::Inference))
            .collect()
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}
