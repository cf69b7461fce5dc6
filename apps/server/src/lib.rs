//! Stagecast server library
//!
//! Show control for a fixed fleet of networked displays: an in-memory
//! device registry, a WebSocket fan-out layer for displays and admin UIs,
//! a latency probe, and a scene/content dispatcher backed by an on-disk
//! scene store.

use axum::{extract::Extension, routing::get, Router};

pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod websocket;

pub use coordinator::Coordinator;
pub use error::{ApiError, ApiResult, ErrorResponse};

/// Build the full application router around a coordinator
///
/// Shared by `main` and the integration tests; middleware that only makes
/// sense on a real listener (tracing, CORS) is layered on by the caller.
pub fn build_app(coordinator: Coordinator) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", routes::api_router())
        .nest("/health", routes::health_router())
        .route("/ws", get(websocket::ws_handler))
        .layer(Extension(coordinator))
}

async fn root() -> &'static str {
    "Stagecast - show control for networked displays"
}
