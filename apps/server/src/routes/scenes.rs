//! Scene HTTP route handlers
//!
//! Body and path validation lives here; the coordinator and scene store
//! only see requests that already make sense.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::coordinator::Coordinator;
use crate::error::{ApiError, ApiResult};
use crate::models::Scene;

/// Response for a successful scene trigger
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub scene: Scene,
}

/// `GET /api/scenes` — every stored scene; empty when the store is unreadable
pub async fn list_scenes(Extension(coordinator): Extension<Coordinator>) -> Json<Vec<Scene>> {
    Json(coordinator.list_scenes())
}

/// `POST /api/scenes` — create a new scene; duplicate ids are a conflict
pub async fn create_scene(
    Extension(coordinator): Extension<Coordinator>,
    Json(scene): Json<Scene>,
) -> ApiResult<(StatusCode, Json<Scene>)> {
    if scene.label.trim().is_empty() {
        return Err(ApiError::MissingField("label"));
    }

    let scene = coordinator.create_scene(scene)?;
    Ok((StatusCode::CREATED, Json(scene)))
}

/// `PUT /api/scenes/:scene_id` — create or replace a scene by id
///
/// The body id must match the path id; a mismatch fails before anything
/// touches the disk.
pub async fn upsert_scene(
    Extension(coordinator): Extension<Coordinator>,
    Path(scene_id): Path<String>,
    Json(scene): Json<Scene>,
) -> ApiResult<Json<Scene>> {
    if scene.id != scene_id {
        return Err(ApiError::ValidationError(format!(
            "scene id '{}' does not match path id '{}'",
            scene.id, scene_id
        )));
    }
    if scene.label.trim().is_empty() {
        return Err(ApiError::MissingField("label"));
    }

    Ok(Json(coordinator.upsert_scene(scene)?))
}

/// `DELETE /api/scenes/:scene_id` — remove a stored scene
pub async fn delete_scene(
    Extension(coordinator): Extension<Coordinator>,
    Path(scene_id): Path<String>,
) -> ApiResult<StatusCode> {
    coordinator.delete_scene(&scene_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/scene/:scene_id` — dispatch a stored scene to its devices
pub async fn trigger_scene(
    Extension(coordinator): Extension<Coordinator>,
    Path(scene_id): Path<String>,
) -> ApiResult<Json<TriggerResponse>> {
    let scene = coordinator.trigger_scene(&scene_id)?;
    Ok(Json(TriggerResponse {
        success: true,
        scene,
    }))
}
