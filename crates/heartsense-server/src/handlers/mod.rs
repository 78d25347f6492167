//! HTTP route handlers for the prediction server.

pub mod model;
pub mod predict;

use axum::Json;

use crate::dto::{StatusMessage, LIVENESS_MESSAGE};

/// Liveness endpoint. Answers regardless of model state.
pub async fn root() -> Json<StatusMessage> {
    Json(StatusMessage { msg: LIVENESS_MESSAGE })
}
