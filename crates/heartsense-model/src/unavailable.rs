//! Placeholder predictor for when no model is loaded.

use async_trait::async_trait;
use heartsense_core::{FeatureSchema, Features, InferenceError, Prediction, Predictor};

/// Refuses every call with [`InferenceError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailablePredictor {
    reason: String,
}

impl UnavailablePredictor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl Predictor for UnavailablePredictor {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn version(&self) -> &str {
        "none"
    }

    fn schema(&self) -> Result<&FeatureSchema, InferenceError> {
        Err(InferenceError::Unavailable(self.reason.clone()))
    }

    async fn predict(&self, _features: &Features) -> Result<Prediction, InferenceError> {
        Err(InferenceError::Unavailable(self.reason.clone()))
    }
}
