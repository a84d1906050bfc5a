//! Prediction output formatting

use crate::models::FeatureVector;
use serde::Serialize;

/// Render a cost as dollars with two decimals, sign kept after the symbol
pub fn format_currency(cost: f64) -> String {
    format!("${:.2}", cost)
}

/// One completed prediction, ready for display or logging
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub cost: f64,
    pub formatted: String,
    pub features: FeatureVector,
    pub model_version: String,
    pub generated_at: i64,
}

impl PredictionOutcome {
    pub fn new(cost: f64, features: FeatureVector, model_version: &str) -> Self {
        Self {
            cost,
            formatted: format_currency(cost),
            features,
            model_version: model_version.to_string(),
            generated_at: chrono::Utc::now().timestamp(),
        }
    }
}
