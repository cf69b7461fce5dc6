//! HTTP route handlers for the Stagecast server
//!
//! The REST facade maps 1:1 onto coordinator operations: handlers parse
//! and validate, the coordinator mutates and broadcasts.

pub mod content;
pub mod devices;
pub mod health;
pub mod scenes;
pub mod status;

pub use health::health_router;

use axum::{
    routing::{get, post, put},
    Router,
};

/// All `/api` routes
///
/// Expects an `Extension<Coordinator>` layer to be installed by the caller.
pub fn api_router() -> Router {
    Router::new()
        .route("/devices", get(devices::list_devices))
        .route(
            "/scenes",
            get(scenes::list_scenes).post(scenes::create_scene),
        )
        .route(
            "/scenes/:scene_id",
            put(scenes::upsert_scene).delete(scenes::delete_scene),
        )
        .route("/scene/:scene_id", post(scenes::trigger_scene))
        .route("/content", post(content::apply_content))
        .route("/content/:device_id/fallback", post(content::device_fallback))
        .route("/all/fallback", post(content::all_fallback))
        .route("/status", get(status::server_status))
}
