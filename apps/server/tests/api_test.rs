//! Integration tests for the REST facade
//!
//! Drives the full application router with a real coordinator and a
//! temp-directory scene store, asserting status codes and response bodies.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use stagecast_server::models::DeviceDescriptor;
use stagecast_server::store::SceneStore;
use stagecast_server::{build_app, Coordinator};

fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = SceneStore::new(dir.path().join("scenes"));
    let coordinator = Coordinator::new(
        vec![
            DeviceDescriptor {
                id: "1".into(),
                label: "Lobby".into(),
                description: None,
            },
            DeviceDescriptor {
                id: "2".into(),
                label: "Stage".into(),
                description: None,
            },
        ],
        store,
    );
    (dir, build_app(coordinator))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn scene_body(id: &str) -> Value {
    json!({
        "id": id,
        "label": format!("Scene {}", id),
        "devices": {
            "1": {"type": "color", "value": "#101010"}
        }
    })
}

#[tokio::test]
async fn test_root_banner() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8(body.to_vec()).unwrap().contains("Stagecast"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let (_dir, app) = test_app();

    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_list_devices_reflects_config() {
    let (_dir, app) = test_app();

    let (status, body) = send(&app, Method::GET, "/api/devices", None).await;
    assert_eq!(status, StatusCode::OK);

    let devices = body.as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["id"], "1");
    assert_eq!(devices[0]["label"], "Lobby");
    assert_eq!(devices[0]["connected"], false);
    assert!(devices[0]["lastContent"].is_null());
}

#[tokio::test]
async fn test_scene_lifecycle() {
    let (_dir, app) = test_app();

    // Initially empty
    let (status, body) = send(&app, Method::GET, "/api/scenes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    // Create
    let (status, body) =
        send(&app, Method::POST, "/api/scenes", Some(scene_body("intro"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "intro");

    // Duplicate create conflicts
    let (status, body) =
        send(&app, Method::POST, "/api/scenes", Some(scene_body("intro"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // Visible in the listing
    let (_, body) = send(&app, Method::GET, "/api/scenes", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Upsert replaces
    let mut updated = scene_body("intro");
    updated["label"] = json!("Intro v2");
    let (status, body) = send(&app, Method::PUT, "/api/scenes/intro", Some(updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Intro v2");

    // Delete
    let (status, _) = send(&app, Method::DELETE, "/api/scenes/intro", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::DELETE, "/api/scenes/intro", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_upsert_rejects_id_mismatch() {
    let (_dir, app) = test_app();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/scenes/other",
        Some(scene_body("intro")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Nothing was written
    let (_, scenes) = send(&app, Method::GET, "/api/scenes", None).await;
    assert!(scenes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_trigger_scene_applies_content() {
    let (_dir, app) = test_app();

    send(&app, Method::POST, "/api/scenes", Some(scene_body("show"))).await;

    let (status, body) = send(&app, Method::POST, "/api/scene/show", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["scene"]["id"], "show");

    // Device 1 now carries the scene's content
    let (_, devices) = send(&app, Method::GET, "/api/devices", None).await;
    let device = &devices.as_array().unwrap()[0];
    assert_eq!(device["lastContent"]["type"], "color");
    assert_eq!(device["lastScene"], "show");
    assert!(device["lastUpdate"].is_i64());

    // And the status endpoint tracks it
    let (_, status_body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status_body["lastScene"], "show");
    assert!(status_body["lastSceneTime"].is_i64());
}

#[tokio::test]
async fn test_trigger_unknown_scene_is_not_found() {
    let (_dir, app) = test_app();

    let (status, body) = send(&app, Method::POST, "/api/scene/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    // No device state was touched
    let (_, devices) = send(&app, Method::GET, "/api/devices", None).await;
    assert!(devices.as_array().unwrap()[0]["lastContent"].is_null());
}

#[tokio::test]
async fn test_apply_content_with_partial_miss_succeeds() {
    let (_dir, app) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/content",
        Some(json!({
            "deviceIds": ["1", "unknown"],
            "content": {"type": "text", "value": "Doors open"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["applied"], 1);

    let (_, devices) = send(&app, Method::GET, "/api/devices", None).await;
    let devices = devices.as_array().unwrap();
    assert_eq!(devices[0]["lastContent"]["value"], "Doors open");
    assert!(devices[1]["lastContent"].is_null());
}

#[tokio::test]
async fn test_apply_content_accepts_single_id() {
    let (_dir, app) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/content",
        Some(json!({
            "deviceIds": "2",
            "content": {"type": "image", "src": "/assets/logo.png"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], 1);
}

#[tokio::test]
async fn test_fallback_endpoints() {
    let (_dir, app) = test_app();

    send(
        &app,
        Method::POST,
        "/api/content",
        Some(json!({
            "deviceIds": ["1", "2"],
            "content": {"type": "color", "value": "#ff0000"}
        })),
    )
    .await;

    // Single device fallback
    let (status, body) = send(&app, Method::POST, "/api/content/1/fallback", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, devices) = send(&app, Method::GET, "/api/devices", None).await;
    let devices = devices.as_array().unwrap();
    assert!(devices[0]["lastContent"].is_null());
    assert!(devices[1]["lastContent"]["value"].is_string());

    // Global fallback
    let (status, _) = send(&app, Method::POST, "/api/all/fallback", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, devices) = send(&app, Method::GET, "/api/devices", None).await;
    assert!(devices
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["lastContent"].is_null()));
}

#[tokio::test]
async fn test_initial_status() {
    let (_dir, app) = test_app();

    let (status, body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["lastScene"].is_null());
    assert!(body["lastSceneTime"].is_null());
    assert!(body["serverUptime"].as_i64().unwrap() >= 0);
}
