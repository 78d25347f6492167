//! Data transfer objects for HTTP message serialization.

use heartsense_core::FeatureSpec;
use serde::Serialize;

pub const LIVENESS_MESSAGE: &str = "ML server running";

/// Liveness response for `GET /`.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub msg: &'static str,
}

/// Description of the loaded model for `GET /model`.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub features: Vec<FeatureSpec>,
}
