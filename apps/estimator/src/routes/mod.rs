pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::estimation::handlers;
use crate::state::AppState;

/// Room for several base64-encoded phone photos in one estimate request.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(handlers::handle_catalog))
        .route(
            "/api/v1/estimate",
            post(handlers::handle_estimate).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}
