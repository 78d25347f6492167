//! Server configuration and model definition files.
//!
//! - [`ServerConfig`] — Runtime settings read from `HEARTSENSE_*` environment variables
//! - [`Backend`] — Where inference runs (in-process or a remote HTTP service)
//! - [`ModelDefinition`] — Logistic-regression model loaded from JSON
//!
//! # Model files
//!
//! ```rust
//! use heartsense_config::ModelDefinition;
//!
//! let model = ModelDefinition::from_json(r#"{
//!     "name": "heart-disease",
//!     "version": "1.0.0",
//!     "intercept": -0.2,
//!     "features": [
//!         { "name": "age", "kind": "numeric", "min": 1, "max": 120, "weight": 0.5, "mean": 54, "scale": 9 },
//!         { "name": "sex", "kind": "categorical", "levels": ["female", "male"], "weight": 0.6 }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(model.threshold, 0.5);
//! assert_eq!(model.schema().len(), 2);
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use heartsense_core::{FeatureKind, FeatureSchema, FeatureSpec};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "models/heart_disease.json";
pub const DEFAULT_INFERENCE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Errors that can occur when loading configuration or model files.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Model definition is structurally valid JSON but unusable.
    #[error("Invalid model '{model}': {message}")]
    InvalidModel { model: String, message: String },

    /// Environment variable holds an unusable value.
    #[error("Invalid value for {var}: '{value}' ({message})")]
    InvalidVar {
        var: String,
        value: String,
        message: String,
    },
}

impl ConfigError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Creates a model validation error.
    pub fn invalid_model(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidModel {
            model: model.into(),
            message: message.into(),
        }
    }

    fn invalid_var(var: &str, value: &str, message: impl ToString) -> Self {
        Self::InvalidVar {
            var: var.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        }
    }
}

// ============================================================================
// Server configuration
// ============================================================================

/// Where predictions are computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Score the model definition in-process.
    Local,
    /// Forward features to an upstream inference service.
    Remote { url: String, timeout: Duration },
}

/// Runtime settings for the prediction server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Model definition file; also supplies the feature schema for remote backends.
    pub model_path: PathBuf,
    pub backend: Backend,
    /// Maximum accepted request body size.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            backend: Backend::Local,
            body_limit: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HEARTSENSE_HOST` | `0.0.0.0` |
    /// | `HEARTSENSE_PORT` | `8000` |
    /// | `HEARTSENSE_MODEL_PATH` | `models/heart_disease.json` |
    /// | `HEARTSENSE_INFERENCE_URL` | unset (local model) |
    /// | `HEARTSENSE_INFERENCE_TIMEOUT_MS` | `5000` |
    /// | `HEARTSENSE_BODY_LIMIT_BYTES` | `65536` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let host = var("HEARTSENSE_HOST").unwrap_or(defaults.host);
        let port = parse_var("HEARTSENSE_PORT", var("HEARTSENSE_PORT"))?.unwrap_or(defaults.port);
        let model_path = var("HEARTSENSE_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);
        let body_limit = parse_var("HEARTSENSE_BODY_LIMIT_BYTES", var("HEARTSENSE_BODY_LIMIT_BYTES"))?
            .unwrap_or(defaults.body_limit);

        let timeout_ms: u64 = parse_var("HEARTSENSE_INFERENCE_TIMEOUT_MS", var("HEARTSENSE_INFERENCE_TIMEOUT_MS"))?
            .unwrap_or(DEFAULT_INFERENCE_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(ConfigError::invalid_var(
                "HEARTSENSE_INFERENCE_TIMEOUT_MS",
                "0",
                "timeout must be positive",
            ));
        }

        let backend = match var("HEARTSENSE_INFERENCE_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Backend::Remote {
                url,
                timeout: Duration::from_millis(timeout_ms),
            },
            Some(url) => {
                return Err(ConfigError::invalid_var(
                    "HEARTSENSE_INFERENCE_URL",
                    &url,
                    "expected an http(s) URL",
                ))
            }
            None => Backend::Local,
        };

        Ok(Self {
            host,
            port,
            model_path,
            backend,
            body_limit,
        })
    }

    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value
            .parse()
            .map_err(|e| ConfigError::invalid_var(name, &value, e))
    })
    .transpose()
}

// ============================================================================
// Model definitions
// ============================================================================

fn default_threshold() -> f64 {
    0.5
}

fn default_scale() -> f64 {
    1.0
}

/// One model input with its declared kind and regression parameters.
///
/// The contribution to the logit is `weight * (x - mean) / scale`, where `x`
/// is the encoded feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    #[serde(flatten)]
    pub spec: FeatureSpec,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

/// Standardized logistic-regression model stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub version: String,
    /// Probability at or above which the positive label is predicted.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub intercept: f64,
    pub features: Vec<FeatureDefinition>,
}

impl ModelDefinition {
    /// Loads and validates a model definition from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::from_json(&content)
    }

    /// Parses and validates a model definition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Checks that the model can be scored for every valid input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: String| Err(ConfigError::invalid_model(&self.name, message));

        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_model("<unnamed>", "model name is empty"));
        }
        if self.features.is_empty() {
            return fail("model declares no features".into());
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0 && self.threshold < 1.0) {
            return fail(format!("threshold {} must be strictly between 0 and 1", self.threshold));
        }
        if !self.intercept.is_finite() {
            return fail("intercept must be finite".into());
        }

        let mut seen = HashSet::new();
        for feature in &self.features {
            let name = &feature.spec.name;
            if name.trim().is_empty() {
                return fail("feature name is empty".into());
            }
            if !seen.insert(name.as_str()) {
                return fail(format!("duplicate feature '{}'", name));
            }
            if !(feature.weight.is_finite() && feature.mean.is_finite()) {
                return fail(format!("feature '{}' has a non-finite weight or mean", name));
            }
            if !(feature.scale.is_finite() && feature.scale > 0.0) {
                return fail(format!("feature '{}' scale must be positive", name));
            }
            match &feature.spec.kind {
                FeatureKind::Numeric { min: Some(min), max: Some(max), .. } if min > max => {
                    return fail(format!("feature '{}' has min {} above max {}", name, min, max));
                }
                FeatureKind::Categorical { levels } if levels.is_empty() => {
                    return fail(format!("feature '{}' declares no levels", name));
                }
                FeatureKind::Categorical { levels } => {
                    let unique: HashSet<_> = levels.iter().collect();
                    if unique.len() != levels.len() {
                        return fail(format!("feature '{}' has duplicate levels", name));
                    }
                }
                FeatureKind::Numeric { .. } => {}
            }
        }

        Ok(())
    }

    /// Feature schema clients must satisfy, in model order.
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.features.iter().map(|f| f.spec.clone()).collect())
    }
}
