//! Model description handler.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::ModelInfo;
use crate::error::AppError;
use crate::AppState;

/// Returns the model name, version and expected feature schema.
pub async fn describe(State(state): State<Arc<AppState>>) -> Result<Json<ModelInfo>, AppError> {
    let predictor = &state.predictor;
    let schema = predictor.schema()?;

    Ok(Json(ModelInfo {
        name: predictor.name().to_string(),
        version: predictor.version().to_string(),
        threshold: predictor.threshold(),
        features: schema.features().to_vec(),
    }))
}
