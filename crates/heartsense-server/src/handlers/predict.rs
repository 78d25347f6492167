//! Prediction HTTP handler.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use heartsense_core::{PredictionRequest, PredictionResponse};

use crate::error::AppError;
use crate::services;
use crate::AppState;

/// Validates the feature payload and returns the model's prediction.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(request) = payload?;
    let response = services::predict::predict(&state, request).await?;
    Ok(Json(response))
}
