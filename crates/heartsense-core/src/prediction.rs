//! Prediction results and the response returned to clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Risk classification derived from a predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Below 0.3 is low, below 0.7 moderate, anything else high.
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Self::Low
        } else if probability < 0.7 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Output of an inference capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Binary class: 0 = no disease, 1 = disease present.
    pub label: u8,
    /// Probability of the positive class, when the model exposes one.
    pub probability: Option<f64>,
}

impl Prediction {
    /// Classifies a probability against a decision threshold (inclusive).
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            label: u8::from(probability >= threshold),
            probability: Some(probability),
        }
    }

    /// A bare label with no probability attached.
    pub fn label(label: u8) -> Self {
        Self { label, probability: None }
    }
}

/// Response body for a successful prediction.
///
/// Fields are private; a response cannot be altered once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    prediction: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl PredictionResponse {
    pub fn new(prediction: Prediction) -> Self {
        let probability = prediction.probability;
        Self {
            prediction: prediction.label,
            probability,
            confidence: probability.map(|p| p.max(1.0 - p)),
            risk_level: probability.map(RiskLevel::from_probability),
            model: None,
        }
    }

    /// Tags the response with the model that produced it.
    pub fn with_model(mut self, name: &str, version: &str) -> Self {
        self.model = Some(format!("{}@{}", name, version));
        self
    }

    pub fn prediction(&self) -> u8 {
        self.prediction
    }

    pub fn probability(&self) -> Option<f64> {
        self.probability
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.risk_level
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}
