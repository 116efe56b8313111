//! Liveness endpoint.

use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

/// Liveness and build version. On PostgreSQL the response also carries a
/// pool usage snapshot; on the memory backend `pool` is null.
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Server is up")))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let pool = state.db.as_ref().map(|db| db.pool_health());
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.storage.as_str(),
        "algorithm_version": state.notes.algorithm_version(),
        "pool": pool,
    }))
}
