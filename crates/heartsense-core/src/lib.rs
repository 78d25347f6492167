//! Core domain types and the inference contract for heartsense.
//!
//! This crate provides the types shared across the heartsense workspace:
//!
//! - [`PredictionRequest`] — Raw feature mapping received from clients
//! - [`FeatureSchema`] and [`FeatureSpec`] — Declared feature set of a model
//! - [`Features`] — Validated, schema-ordered feature vector
//! - [`Prediction`] and [`PredictionResponse`] — Inference results
//! - [`Predictor`] — Trait implemented by every inference capability
//! - [`InferenceError`] and [`ValidationError`] — Error types
//!
//! # Example
//!
//! ```rust
//! use heartsense_core::{FeatureKind, FeatureSchema, FeatureSpec, PredictionRequest};
//!
//! let schema = FeatureSchema::new(vec![
//!     FeatureSpec::new("age", FeatureKind::numeric()),
//!     FeatureSpec::new("sex", FeatureKind::categorical(["female", "male"])),
//! ]);
//!
//! let request: PredictionRequest =
//!     serde_json::from_str(r#"{"age": 54, "sex": "male"}"#).unwrap();
//! let features = schema.validate(&request).unwrap();
//!
//! assert_eq!(features.values(), &[54.0, 1.0]);
//! ```

mod prediction;
mod schema;

pub use prediction::{Prediction, PredictionResponse, RiskLevel};
pub use schema::{FeatureKind, FeatureSchema, FeatureSpec, Features, FieldIssue, PredictionRequest, ValidationError};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by an inference capability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// The capability is not loaded or cannot be reached.
    #[error("Inference unavailable: {0}")]
    Unavailable(String),

    /// The capability did not answer in time.
    #[error("Inference timed out after {0} ms")]
    Timeout(u64),

    /// The capability refused the supplied features.
    #[error("Inference rejected input: {0}")]
    Rejected(String),

    /// The capability answered with something that is not a prediction.
    #[error("Malformed inference output: {0}")]
    Malformed(String),

    /// The model produced no usable result (e.g. a non-finite score).
    #[error("Inference failed: {0}")]
    Failed(String),
}

/// An inference capability that turns validated features into a prediction.
///
/// Implementations must be reentrant: the server shares a single instance
/// across all concurrent requests.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Returns the model name.
    fn name(&self) -> &str;

    /// Returns the model version.
    fn version(&self) -> &str;

    /// Returns the feature set this predictor expects.
    ///
    /// Fails with [`InferenceError::Unavailable`] when no model is loaded.
    fn schema(&self) -> Result<&FeatureSchema, InferenceError>;

    /// Runs inference on features already validated against [`Predictor::schema`].
    async fn predict(&self, features: &Features) -> Result<Prediction, InferenceError>;

    /// Returns the decision threshold applied to probabilities, if any.
    fn threshold(&self) -> Option<f64> {
        None
    }
}
