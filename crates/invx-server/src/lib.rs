//! HTTP API for invoice field extraction.
//!
//! Routes:
//! - `GET /` welcome message
//! - `GET /health` liveness and version
//! - `POST /extract/` multipart upload (field `file`), returns the six invoice fields

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use invx_core::models::config::InvxConfig;
use invx_core::{ExtractionResult, InvoicePipeline};

pub use error::ApiError;

/// Backend that turns uploaded PDF bytes into invoice details.
///
/// Runs on a blocking thread.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, data: &[u8]) -> ExtractionResult;
}

impl DocumentExtractor for InvoicePipeline {
    fn extract(&self, data: &[u8]) -> ExtractionResult {
        InvoicePipeline::extract(self, data)
    }
}

/// Shared state for all handlers.
pub struct AppState {
    /// Extraction backend applied to every upload.
    pub extractor: Arc<dyn DocumentExtractor>,
    /// Slots for extractions running at the same time. A slot is held until
    /// the worker finishes, even if the request has already timed out.
    pub permits: Arc<Semaphore>,
    /// Limit on reading the upload, waiting for a slot and extracting.
    pub request_timeout: Duration,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &InvxConfig) -> Self {
        Self::with_extractor(config, Arc::new(InvoicePipeline::from_config(&config.pdf)))
    }

    /// State with a custom extraction backend and the server settings from `config`.
    pub fn with_extractor(config: &InvxConfig, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self {
            extractor,
            permits: Arc::new(Semaphore::new(config.server.max_concurrent_extractions.max(1))),
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}

/// Build the application router.
pub fn app(config: &InvxConfig) -> Router {
    router(Arc::new(AppState::new(config)))
}

/// Build the router around existing state.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/extract", post(routes::extract))
        .route("/extract/", post(routes::extract))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
