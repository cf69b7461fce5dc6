//! Server status HTTP route handlers

use axum::{extract::Extension, Json};

use crate::coordinator::{Coordinator, ServerStatus};

/// `GET /api/status` — last triggered scene and process uptime
pub async fn server_status(Extension(coordinator): Extension<Coordinator>) -> Json<ServerStatus> {
    Json(coordinator.status())
}
