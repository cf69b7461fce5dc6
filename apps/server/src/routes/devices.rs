//! Device state HTTP route handlers

use axum::{extract::Extension, Json};

use crate::coordinator::Coordinator;
use crate::models::DeviceRecord;

/// `GET /api/devices` — point-in-time state of every configured device
pub async fn list_devices(Extension(coordinator): Extension<Coordinator>) -> Json<Vec<DeviceRecord>> {
    Json(coordinator.snapshot())
}
