//! Prediction library for medical insurance cost estimates
//!
//! This crate provides the core functionality for:
//! - Encoding the six form fields into the estimator's feature row
//! - Loading the trained estimator artifact (ONNX or linear JSON)
//! - Single-row prediction through a narrow estimator trait
//! - Health checks and observability

pub mod encoding;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;

pub use encoding::{Encoding, RegionCodes};
pub use error::{EncodingError, LoadError, PredictError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use predictor::{
    format_currency, load_model, Estimator, LoadedModel, ModelFormat, ModelInfo,
    PredictionAdapter, PredictionOutcome,
};
