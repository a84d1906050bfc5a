//! Integration tests for the form page and the health/metrics endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use insurance_server::api::{create_router, AppState};
use predictor_lib::{
    health::{components, HealthRegistry},
    predictor::LinearEstimator,
    Estimator, FeatureVector, PredictError, PredictionAdapter, PredictorMetrics,
    StructuredLogger,
};
use std::sync::Arc;
use tower::ServiceExt;

/// Estimator that always fails, to exercise the 500 path
struct BrokenEstimator;

impl Estimator for BrokenEstimator {
    fn predict(&self, _rows: &[FeatureVector]) -> Result<Vec<f64>, PredictError> {
        Err(PredictError::Inference(anyhow_error()))
    }
}

/// Returns NaN for smokers and a fixed cost otherwise
struct SmokerNanEstimator;

impl Estimator for SmokerNanEstimator {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictError> {
        Ok(rows
            .iter()
            .map(|row| if row.smoker_code() == 1 { f64::NAN } else { 100.0 })
            .collect())
    }
}

fn anyhow_error() -> anyhow::Error {
    anyhow::anyhow!("graph execution failed")
}

fn linear_estimator() -> Arc<dyn Estimator> {
    Arc::new(LinearEstimator::new(
        -1000.0,
        [250.0, -100.0, 300.0, 500.0, 24000.0, -350.0],
    ))
}

async fn setup_test_app(estimator: Arc<dyn Estimator>, loaded: bool) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::PREDICTION_ADAPTER).await;
    if loaded {
        health_registry.mark_model_loaded("test-model").await;
    }

    let state = Arc::new(AppState::new(
        PredictionAdapter::new(estimator),
        health_registry,
        PredictorMetrics::new(),
        StructuredLogger::new("test"),
    ));
    let router = create_router(state.clone());

    (router, state)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_renders_form_with_defaults() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Medical Insurance Cost Predictor"));
    assert!(body.contains(r#"name="age""#));
    assert!(body.contains(r#"value="25""#));
    assert!(body.contains(r#"value="25.0""#));
    assert!(body.contains(r#"<option value="Southeast" selected>"#));
    assert!(body.contains(r#"<option value="Yes" selected>"#));
    assert!(!body.contains("Predicted Insurance Cost"));
}

#[tokio::test]
async fn test_predict_renders_currency() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app
        .oneshot(post_form(
            "age=25&gender=Male&bmi=25.0&children=0&smoker=No&region=Southeast",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(
        body.contains("Predicted Insurance Cost: <strong>$12650.00</strong>"),
        "{}",
        body
    );
    // Submitted values are kept in the form
    assert!(body.contains(r#"<option value="No" selected>"#));
}

#[tokio::test]
async fn test_predict_counts_successes() {
    let (app, state) = setup_test_app(linear_estimator(), true).await;
    let before = state.metrics.predictions();

    let response = app
        .oneshot(post_form(
            "age=40&gender=Female&bmi=30.5&children=2&smoker=Yes&region=Northwest",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.metrics.predictions() > before);
}

#[tokio::test]
async fn test_out_of_range_age_is_rejected() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app
        .oneshot(post_form(
            "age=150&gender=Male&bmi=25.0&children=0&smoker=No&region=Southeast",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(response).await;
    assert!(body.contains("age: 150 is outside the allowed range 1..=120"));
    assert!(!body.contains("Predicted Insurance Cost"));
}

#[tokio::test]
async fn test_unknown_region_is_reported_not_defaulted() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app
        .oneshot(post_form(
            "age=25&gender=Male&bmi=25.0&children=0&smoker=No&region=Midwest",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(response).await;
    assert!(body.contains("unknown region"));
    assert!(body.contains("Midwest"));
    assert!(!body.contains("Predicted Insurance Cost"));
}

#[tokio::test]
async fn test_submitted_values_are_escaped() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app
        .oneshot(post_form(
            "age=25&gender=Male&bmi=25.0&children=0&smoker=No&region=%3Cscript%3E",
        ))
        .await
        .unwrap();

    let body = body_string(response).await;
    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app.oneshot(post_form("gender=Male")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_inference_failure_returns_500_and_degrades_health() {
    let (app, state) = setup_test_app(Arc::new(BrokenEstimator), true).await;

    let response = app
        .oneshot(post_form(
            "age=25&gender=Male&bmi=25.0&children=0&smoker=No&region=Southeast",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("inference failed"));

    let health = state.health_registry.health().await;
    assert_eq!(health.status, predictor_lib::ComponentStatus::Degraded);
}

#[tokio::test]
async fn test_successful_prediction_clears_degraded_health() {
    let (app, state) = setup_test_app(Arc::new(SmokerNanEstimator), true).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "age=25&gender=Male&bmi=25.0&children=0&smoker=Yes&region=Southeast",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        state.health_registry.health().await.status,
        predictor_lib::ComponentStatus::Degraded
    );

    let response = app
        .oneshot(post_form(
            "age=25&gender=Male&bmi=25.0&children=0&smoker=No&region=Southeast",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = state.health_registry.health().await;
    assert_eq!(health.status, predictor_lib::ComponentStatus::Healthy);
    assert!(health.components[components::PREDICTION_ADAPTER]
        .message
        .is_none());
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app(linear_estimator(), true).await;
    state
        .health_registry
        .set_unhealthy(components::PREDICTION_ADAPTER, "Broken")
        .await;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readyz_reports_model_version() {
    let (app, _state) = setup_test_app(linear_estimator(), true).await;

    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let readiness: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(readiness["ready"], true);
    assert_eq!(readiness["model_version"], "test-model");
}

#[tokio::test]
async fn test_readyz_returns_503_before_model_load() {
    let (app, _state) = setup_test_app(linear_estimator(), false).await;

    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_prediction_counters() {
    let (app, state) = setup_test_app(linear_estimator(), true).await;
    state.metrics.inc_predictions();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("insurance_predictor_predictions_total"));
}
