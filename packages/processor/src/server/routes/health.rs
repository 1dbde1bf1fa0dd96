use axum::{extract::Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: String,
    provider: String,
}

/// Health check endpoint
///
/// Reports which store backend and provider the process was started with.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: state.deps.store.kind().to_string(),
        provider: state.deps.generator.provider_name().to_string(),
    })
}

/// Liveness check at the root path
pub async fn root_handler() -> Json<Value> {
    Json(json!({"Hello": "World"}))
}
