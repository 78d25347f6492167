use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use heartsense_core::{
    FeatureKind, FeatureSchema, FeatureSpec, Features, InferenceError, Prediction, Predictor,
};
use heartsense_model::{LogisticModel, UnavailablePredictor};
use heartsense_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Scripted predictor over the `age`/`sex`/`cp` schema.
struct Scripted {
    schema: FeatureSchema,
    outcome: Outcome,
}

enum Outcome {
    Probability(f64),
    Fail(InferenceError),
    Panic,
}

impl Scripted {
    fn new(outcome: Outcome) -> Self {
        Self {
            schema: FeatureSchema::new(vec![
                FeatureSpec::new("age", FeatureKind::integer_range(1, 120)),
                FeatureSpec::new("sex", FeatureKind::integer_range(0, 1)),
                FeatureSpec::new("cp", FeatureKind::integer_range(0, 3)),
            ]),
            outcome,
        }
    }
}

#[async_trait]
impl Predictor for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn version(&self) -> &str {
        "test"
    }

    fn schema(&self) -> Result<&FeatureSchema, InferenceError> {
        Ok(&self.schema)
    }

    async fn predict(&self, _features: &Features) -> Result<Prediction, InferenceError> {
        match &self.outcome {
            Outcome::Probability(p) => Ok(Prediction::from_probability(*p, 0.5)),
            Outcome::Fail(e) => Err(e.clone()),
            Outcome::Panic => panic!("model weights corrupted at 0xdeadbeef"),
        }
    }
}

fn app(predictor: impl Predictor + 'static) -> Router {
    build_router(Arc::new(AppState::new(Arc::new(predictor))))
}

fn heart_model() -> LogisticModel {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/heart_disease.json");
    LogisticModel::from_file(path).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn predict(app: &Router, body: &str) -> (StatusCode, Value) {
    send(app, "POST", "/predict/", Some(body)).await
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test]
async fn root_reports_running() {
    let (status, body) = send(&app(heart_model()), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "ML server running"}));
}

#[tokio::test]
async fn root_reports_running_without_model() {
    let (status, body) = send(&app(UnavailablePredictor::new("no model")), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "ML server running"}));
}

// ============================================================================
// Predictions
// ============================================================================

#[tokio::test]
async fn heart_model_predicts_negative_for_low_risk_patient() {
    let (status, body) = predict(&app(heart_model()), r#"{"age": 54, "sex": 1, "cp": 0}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["risk_level"], "moderate");
    assert_eq!(body["model"], "heart-disease@1.0.0");
}

#[tokio::test]
async fn heart_model_accepts_level_names() {
    let (status, body) = predict(
        &app(heart_model()),
        r#"{"age": 77, "sex": 1, "cp": "asymptomatic"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["risk_level"], "high");
}

#[tokio::test]
async fn route_without_trailing_slash_also_predicts() {
    let (status, body) = send(
        &app(Scripted::new(Outcome::Probability(0.9))),
        "POST",
        "/predict",
        Some(r#"{"age": 60, "sex": 0, "cp": 2}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["probability"], 0.9);
    assert_eq!(body["confidence"], 0.9);
}

#[tokio::test]
async fn same_input_twice_gives_same_status() {
    let app = app(heart_model());
    let body = r#"{"age": 41, "sex": 0, "cp": 1}"#;

    let (first, _) = predict(&app, body).await;
    let (second, _) = predict(&app, body).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn get_on_predict_is_not_allowed() {
    let (status, _) = send(&app(heart_model()), "GET", "/predict/", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn empty_object_is_validation_error() {
    let (status, body) = predict(&app(heart_model()), "{}").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.to_string().contains("ValidationError"));
    assert_eq!(body["issues"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn missing_feature_is_named() {
    let (status, body) = predict(&app(heart_model()), r#"{"age": 54, "sex": 1}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(
        body["issues"],
        json!([{"field": "cp", "message": "missing required feature"}])
    );
}

#[tokio::test]
async fn extra_feature_is_rejected() {
    let (status, body) = predict(
        &app(heart_model()),
        r#"{"age": 54, "sex": 1, "cp": 0, "chol": 233}"#,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["issues"][0]["field"], "chol");
}

#[tokio::test]
async fn wrong_value_types_are_rejected() {
    let (status, body) = predict(
        &app(heart_model()),
        r#"{"age": "old", "sex": 1, "cp": "crushing"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<_> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["age", "cp"]);
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let app = app(heart_model());

    for body in [r#"{"age": 54,"#, "[54, 1, 0]", "\"age=54\"", ""] {
        let (status, value) = predict(&app, body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body {:?}", body);
        assert_eq!(value["error"], "ValidationError", "body {:?}", body);
    }
}

#[tokio::test]
async fn missing_content_type_is_validation_error() {
    let (status, body) = send(&app(heart_model()), "POST", "/predict/", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn oversized_body_is_validation_error() {
    let state = AppState::new(Arc::new(heart_model())).with_body_limit(16);
    let app = build_router(Arc::new(state));

    let (status, body) = predict(&app, r#"{"age": 54, "sex": 1, "cp": 0}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");
}

// ============================================================================
// Inference failures
// ============================================================================

#[tokio::test]
async fn unloaded_model_is_unavailable() {
    let (status, body) = predict(
        &app(UnavailablePredictor::new("model file missing")),
        r#"{"age": 54, "sex": 1, "cp": 0}"#,
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "InferenceUnavailable");
    assert!(body["detail"].as_str().unwrap().contains("model file missing"));
}

#[tokio::test]
async fn failing_capability_is_unavailable() {
    for failure in [
        InferenceError::Unavailable("connection refused".into()),
        InferenceError::Timeout(5000),
        InferenceError::Malformed("not json".into()),
    ] {
        let (status, body) = predict(
            &app(Scripted::new(Outcome::Fail(failure))),
            r#"{"age": 54, "sex": 1, "cp": 0}"#,
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "InferenceUnavailable");
    }
}

#[tokio::test]
async fn validation_runs_before_inference() {
    let (status, _) = predict(
        &app(Scripted::new(Outcome::Fail(InferenceError::Unavailable("down".into())))),
        "{}",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn panicking_capability_is_internal_error_without_details() {
    let (status, body) = predict(
        &app(Scripted::new(Outcome::Panic)),
        r#"{"age": 54, "sex": 1, "cp": 0}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "InternalError", "detail": "internal server error"})
    );
    assert!(!body.to_string().contains("deadbeef"));
}

// ============================================================================
// Model description
// ============================================================================

#[tokio::test]
async fn model_endpoint_lists_schema() {
    let (status, body) = send(&app(heart_model()), "GET", "/model", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "heart-disease");
    assert_eq!(body["threshold"], 0.5);
    let names: Vec<_> = body["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["age", "sex", "cp"]);
    assert_eq!(body["features"][2]["kind"], "categorical");
}

#[tokio::test]
async fn model_endpoint_without_model_is_unavailable() {
    let (status, body) = send(&app(UnavailablePredictor::new("no model")), "GET", "/model", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "InferenceUnavailable");
}
