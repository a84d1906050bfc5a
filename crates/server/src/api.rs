//! HTTP surface: the prediction form page plus health checks and Prometheus metrics

use crate::form::{FieldError, PredictionForm};
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use predictor_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    Gender, PredictionAdapter, PredictorMetrics, Region, Smoker, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub adapter: PredictionAdapter,
    pub health_registry: HealthRegistry,
    pub metrics: PredictorMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        adapter: PredictionAdapter,
        health_registry: HealthRegistry,
        metrics: PredictorMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            adapter,
            health_registry,
            metrics,
            logger,
        }
    }
}

struct SelectOption {
    value: &'static str,
    selected: bool,
}

fn options(labels: &[&'static str], current: &str) -> Vec<SelectOption> {
    labels
        .iter()
        .map(|&value| SelectOption {
            value,
            selected: value == current,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage {
    age: String,
    bmi: String,
    children: String,
    genders: Vec<SelectOption>,
    smokers: Vec<SelectOption>,
    regions: Vec<SelectOption>,
    prediction: Option<String>,
    errors: Vec<String>,
    model_version: String,
}

impl IndexPage {
    fn new(form: &PredictionForm, model_version: &str) -> Self {
        Self {
            age: form.age.clone(),
            bmi: form.bmi.clone(),
            children: form.children.clone(),
            genders: options(Gender::LABELS, &form.gender),
            smokers: options(Smoker::LABELS, &form.smoker),
            regions: options(Region::LABELS, &form.region),
            prediction: None,
            errors: Vec::new(),
            model_version: model_version.to_string(),
        }
    }

    fn with_prediction(mut self, formatted: String) -> Self {
        self.prediction = Some(formatted);
        self
    }

    fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

fn render(status: StatusCode, page: IndexPage) -> Response {
    match page.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// Empty form with the default widget values
async fn index(State(state): State<Arc<AppState>>) -> Response {
    let page = IndexPage::new(&PredictionForm::default(), state.adapter.model_version());
    render(StatusCode::OK, page)
}

/// Validate the submitted form, predict, and re-render the page with the result
async fn predict(State(state): State<Arc<AppState>>, Form(form): Form<PredictionForm>) -> Response {
    let page = IndexPage::new(&form, state.adapter.model_version());

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            state.metrics.inc_prediction_errors("validation");
            info!(
                event = "prediction_rejected",
                kind = "validation",
                errors = errors.len(),
                "Form validation failed"
            );
            let messages = errors.iter().map(FieldError::to_string).collect();
            return render(StatusCode::UNPROCESSABLE_ENTITY, page.with_errors(messages));
        }
    };

    let start = Instant::now();
    match state.adapter.predict_detailed(&request) {
        Ok(outcome) => {
            let latency = start.elapsed().as_secs_f64();
            state.metrics.observe_prediction_latency(latency);
            state.metrics.inc_predictions();
            state.logger.log_prediction(&outcome, latency);
            state
                .health_registry
                .clear_degraded(components::PREDICTION_ADAPTER)
                .await;
            render(StatusCode::OK, page.with_prediction(outcome.formatted))
        }
        Err(e) => {
            state.metrics.inc_prediction_errors(e.kind());
            state.logger.log_prediction_failed(&e);
            let status = if e.is_user_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                state
                    .health_registry
                    .set_degraded(components::PREDICTION_ADAPTER, e.to_string())
                    .await;
                StatusCode::INTERNAL_SERVER_ERROR
            };
            render(status, page.with_errors(vec![e.to_string()]))
        }
    }
}

/// Health check response - returns 200 if healthy, 503 if degraded/unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once the model is loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
