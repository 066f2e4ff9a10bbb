//! Liveness probe. Deliberately independent of engine and model state.

use axum::Json;

pub async fn health_check() -> Json<&'static str> {
    Json("ok")
}
