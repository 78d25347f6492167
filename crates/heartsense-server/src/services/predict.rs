//! Prediction service.
//!
//! Validates a request against the predictor's schema, runs inference on its
//! own task, and wraps the result into a [`PredictionResponse`].

use std::sync::Arc;

use heartsense_core::{PredictionRequest, PredictionResponse};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::AppState;

/// Runs one prediction. Holds no state between calls.
pub async fn predict(
    state: &AppState,
    request: PredictionRequest,
) -> Result<PredictionResponse, AppError> {
    let predictor = Arc::clone(&state.predictor);

    let features = predictor.schema()?.validate(&request).map_err(|e| {
        debug!("Rejected prediction request: {}", e);
        e
    })?;

    // A panicking predictor only takes down its own task.
    let task = tokio::spawn({
        let predictor = Arc::clone(&predictor);
        async move { predictor.predict(&features).await }
    });

    let prediction = match task.await {
        Ok(Ok(prediction)) => prediction,
        Ok(Err(e)) => {
            warn!("Inference failed: {}", e);
            return Err(e.into());
        }
        Err(e) => {
            error!("Inference task aborted: {}", e);
            return Err(AppError::Internal(e.to_string()));
        }
    };

    info!(
        label = prediction.label,
        probability = ?prediction.probability,
        "Prediction served by {}",
        predictor.name()
    );

    Ok(PredictionResponse::new(prediction).with_model(predictor.name(), predictor.version()))
}
