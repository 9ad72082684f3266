use std::sync::Arc;

use crate::catalog::Catalog;
use crate::llm_client::InferenceBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Usually an `LlmClient`; tests plug in a stub.
    pub backend: Arc<dyn InferenceBackend>,
    /// Read once at startup, never mutated.
    pub catalog: Arc<Catalog>,
    /// Request body cap for `POST /api/v1/estimate`.
    pub max_body_bytes: usize,
}
