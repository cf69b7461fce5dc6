//! Health check HTTP route handlers
//!
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/live` - Kubernetes-style liveness probe

use axum::{response::IntoResponse, routing::get, Json, Router};

/// Create health check router
pub fn health_router() -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness_probe))
}

/// Simple health check - always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness probe for container orchestrators
///
/// Returns 200 if the server process is running and can handle requests;
/// there are no external dependencies to verify.
async fn liveness_probe() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
