//! HTTP prediction server.
//!
//! [`build_router`] assembles the full routing table from an [`AppState`];
//! the binary in `main.rs` binds it to a listener.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/` | liveness message |
//! | POST | `/predict/` | run a prediction |
//! | GET | `/model` | describe the loaded model |

pub mod dto;
pub mod error;
mod handlers;
mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use heartsense_config::DEFAULT_BODY_LIMIT_BYTES;
use heartsense_core::Predictor;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Shared state handed to every handler. Immutable after construction.
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor,
            body_limit: DEFAULT_BODY_LIMIT_BYTES,
        }
    }

    /// Caps request bodies on the prediction routes.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %req.method(),
                uri = %req.uri(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/predict/", post(handlers::predict::predict))
        .route("/predict", post(handlers::predict::predict))
        .route("/model", get(handlers::model::describe))
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(DefaultBodyLimit::max(state.body_limit)),
        );

    Router::new()
        .merge(logged_routes)
        .route("/", get(handlers::root))
        .layer(cors)
        .with_state(state)
}
