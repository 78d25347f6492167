//! HTTP client for an upstream inference service.
//!
//! The upstream receives `{"features": [f64, ...]}` in schema order and must
//! answer `{"prediction": <probability>}`.

use std::time::Duration;

use async_trait::async_trait;
use heartsense_config::ModelDefinition;
use heartsense_core::{FeatureSchema, Features, InferenceError, Prediction, Predictor};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Serialize)]
struct UpstreamRequest<'a> {
    features: &'a [f64],
}

#[derive(Deserialize)]
struct UpstreamResponse {
    prediction: f64,
}

/// Predictor backed by a remote inference endpoint.
///
/// The local model definition supplies the schema, name and threshold; only
/// the scoring happens upstream.
#[derive(Debug, Clone)]
pub struct RemotePredictor {
    client: Client,
    url: String,
    timeout: Duration,
    name: String,
    version: String,
    threshold: f64,
    schema: FeatureSchema,
}

impl RemotePredictor {
    pub fn new(definition: ModelDefinition, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout,
            schema: definition.schema(),
            name: definition.name,
            version: definition.version,
            threshold: definition.threshold,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout(self.timeout.as_millis() as u64)
        } else {
            InferenceError::Unavailable(format!("{}: {}", self.url, e))
        }
    }
}

#[async_trait]
impl Predictor for RemotePredictor {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn schema(&self) -> Result<&FeatureSchema, InferenceError> {
        Ok(&self.schema)
    }

    fn threshold(&self) -> Option<f64> {
        Some(self.threshold)
    }

    async fn predict(&self, features: &Features) -> Result<Prediction, InferenceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&UpstreamRequest { features: features.values() })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Rejected(format!("upstream returned {}: {}", status, body)));
        }
        if !status.is_success() {
            warn!("Inference upstream {} returned {}", self.url, status);
            return Err(InferenceError::Unavailable(format!("upstream returned {}", status)));
        }

        let body: UpstreamResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        if !(0.0..=1.0).contains(&body.prediction) {
            return Err(InferenceError::Malformed(format!(
                "probability {} outside [0, 1]",
                body.prediction
            )));
        }

        debug!("{} upstream scored p={:.4}", self.name, body.prediction);
        Ok(Prediction::from_probability(body.prediction, self.threshold))
    }
}
