//! Inference capabilities for heartsense.
//!
//! Every capability implements [`heartsense_core::Predictor`]:
//!
//! - [`LogisticModel`] — Scores a [`ModelDefinition`] in-process
//! - [`RemotePredictor`] — Forwards features to an upstream HTTP inference service
//! - [`UnavailablePredictor`] — Stands in when no model could be loaded
//!
//! [`predictor_from_config`] picks one from a [`ServerConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use heartsense_config::ServerConfig;
//! use heartsense_model::predictor_from_config;
//!
//! let config = ServerConfig::from_env()?;
//! let predictor = predictor_from_config(&config);
//!
//! let schema = predictor.schema()?;
//! let features = schema.validate(&request)?;
//! let prediction = predictor.predict(&features).await?;
//! ```

mod logistic;
mod remote;
mod unavailable;

pub use logistic::LogisticModel;
pub use remote::RemotePredictor;
pub use unavailable::UnavailablePredictor;

use std::sync::Arc;

use heartsense_config::{Backend, ModelDefinition, ServerConfig};
use heartsense_core::Predictor;
use tracing::{info, warn};

/// Builds the predictor described by `config`.
///
/// A model file that cannot be loaded does not stop the server: the returned
/// predictor reports itself unavailable and every prediction fails with
/// [`heartsense_core::InferenceError::Unavailable`].
pub fn predictor_from_config(config: &ServerConfig) -> Arc<dyn Predictor> {
    let definition = match ModelDefinition::from_file(&config.model_path) {
        Ok(definition) => definition,
        Err(e) => {
            warn!("Model not loaded, predictions will be refused: {}", e);
            return Arc::new(UnavailablePredictor::new(e.to_string()));
        }
    };

    info!(
        "Loaded model {}@{} ({} features, threshold {})",
        definition.name,
        definition.version,
        definition.features.len(),
        definition.threshold
    );
    for feature in &definition.features {
        info!("  - {}", feature.spec.name);
    }

    match &config.backend {
        Backend::Local => Arc::new(LogisticModel::new(definition)),
        Backend::Remote { url, timeout } => {
            info!("Forwarding predictions to {} (timeout {:?})", url, timeout);
            Arc::new(RemotePredictor::new(definition, url.clone(), *timeout))
        }
    }
}
