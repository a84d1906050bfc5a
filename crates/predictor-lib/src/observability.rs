//! Observability infrastructure for the predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction and error counts, model info)
//! - Structured JSON logging with tracing

use crate::error::{LoadError, PredictError};
use crate::predictor::{ModelInfo, PredictionOutcome};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for single-row inference latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounterVec,
    model_info: GaugeVec,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "insurance_predictor_prediction_latency_seconds",
                "Time spent encoding a request and running inference",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "insurance_predictor_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "insurance_predictor_prediction_errors_total",
                "Total number of failed predictions by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            model_info: register_gauge_vec!(
                "insurance_predictor_model_info",
                "Information about the loaded estimator artifact",
                &["version", "format", "checksum"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Lightweight handle to the global predictor metrics
///
/// Clones share the same underlying collectors.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    /// Create a handle, registering the collectors on first use
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Publish the loaded model, replacing any previous label set
    pub fn set_model_info(&self, info: &ModelInfo) {
        let gauge = &self.inner().model_info;
        let format = info.format.to_string();
        gauge.reset();
        gauge
            .with_label_values(&[
                info.model_version.as_str(),
                format.as_str(),
                info.checksum.as_str(),
            ])
            .set(1.0);
    }

    pub fn predictions(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn prediction_errors(&self, kind: &str) -> u64 {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .get()
    }
}

/// Structured logger for predictor events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_path: &str) {
        info!(
            event = "server_started",
            instance = %self.instance,
            server_version = %version,
            model_path = %model_path,
            "Insurance predictor starting"
        );
    }

    pub fn log_model_loaded(&self, info: &ModelInfo) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            path = %info.path.display(),
            format = %info.format,
            checksum = %info.checksum,
            size_bytes = info.size_bytes,
            model_version = %info.model_version,
            "Estimator artifact loaded"
        );
    }

    pub fn log_model_load_failed(&self, err: &LoadError) {
        error!(
            event = "model_load_failed",
            instance = %self.instance,
            kind = err.kind(),
            error = %err,
            "Cannot serve predictions without a model"
        );
    }

    pub fn log_prediction(&self, outcome: &PredictionOutcome, latency_secs: f64) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            features = %outcome.features,
            cost = outcome.cost,
            model_version = %outcome.model_version,
            latency_secs = latency_secs,
            "Generated insurance cost prediction"
        );
    }

    pub fn log_prediction_failed(&self, err: &PredictError) {
        if err.is_user_error() {
            info!(
                event = "prediction_rejected",
                instance = %self.instance,
                kind = err.kind(),
                error = %err,
                "Prediction request rejected"
            );
        } else {
            warn!(
                event = "prediction_failed",
                instance = %self.instance,
                kind = err.kind(),
                error = %err,
                "Prediction failed"
            );
        }
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Insurance predictor shutting down"
        );
    }
}
