//! API routes and handlers.

pub mod health;
pub mod models;
pub mod transcriptions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Uploads above this are rejected at the framework boundary.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Create the main API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health-check", get(health::health_check))
        .route("/v1/models", get(models::list_models))
        .route("/v1/audio/transcriptions", post(transcriptions::transcribe))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
