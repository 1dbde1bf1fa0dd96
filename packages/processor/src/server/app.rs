//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{health_handler, pubsub_push_handler, root_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps) -> Router {
    let app_state = AppState {
        deps: Arc::new(deps),
    };

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/pubsub/push", post(pubsub_push_handler))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
}
