//! In-process standardized logistic regression.

use async_trait::async_trait;
use heartsense_config::{ConfigError, ModelDefinition};
use heartsense_core::{FeatureSchema, Features, InferenceError, Prediction, Predictor};

/// Regression parameters for one feature.
#[derive(Debug, Clone, Copy)]
struct Term {
    weight: f64,
    mean: f64,
    scale: f64,
}

/// Logistic model scored on the request path.
///
/// `p = sigmoid(intercept + Σ weight·(x − mean)/scale)`. The model holds no
/// mutable state, so one instance serves all requests.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    name: String,
    version: String,
    threshold: f64,
    intercept: f64,
    terms: Vec<Term>,
    schema: FeatureSchema,
}

impl LogisticModel {
    /// Builds a model from an already validated definition.
    pub fn new(definition: ModelDefinition) -> Self {
        let schema = definition.schema();
        let terms = definition
            .features
            .iter()
            .map(|f| Term {
                weight: f.weight,
                mean: f.mean,
                scale: f.scale,
            })
            .collect();

        Self {
            name: definition.name,
            version: definition.version,
            threshold: definition.threshold,
            intercept: definition.intercept,
            terms,
            schema,
        }
    }

    /// Loads a model definition file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        ModelDefinition::from_file(path).map(Self::new)
    }

    /// Linear score before the sigmoid.
    pub fn logit(&self, features: &Features) -> Result<f64, InferenceError> {
        if features.len() != self.terms.len() {
            return Err(InferenceError::Rejected(format!(
                "expected {} features, got {}",
                self.terms.len(),
                features.len()
            )));
        }

        let z = self
            .terms
            .iter()
            .zip(features.values())
            .fold(self.intercept, |acc, (term, x)| {
                acc + term.weight * (x - term.mean) / term.scale
            });

        if z.is_finite() {
            Ok(z)
        } else {
            Err(InferenceError::Failed(format!("non-finite score {}", z)))
        }
    }

    /// Probability of the positive class.
    pub fn probability(&self, features: &Features) -> Result<f64, InferenceError> {
        self.logit(features).map(sigmoid)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[async_trait]
impl Predictor for LogisticModel {
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
        let probability = self.probability(features)?;
        tracing::debug!("{} scored p={:.4}", self.name, probability);
        Ok(Prediction::from_probability(probability, self.threshold))
    }
}
