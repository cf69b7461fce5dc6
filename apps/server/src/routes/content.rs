//! Content dispatch HTTP route handlers

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::coordinator::Coordinator;
use crate::models::Content;

/// Body for `POST /api/content`
///
/// `deviceIds` accepts either a single id or an array of ids, matching
/// what the admin clients send.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyContentRequest {
    pub device_ids: DeviceIds,
    pub content: Content,
}

/// One id or many
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DeviceIds {
    One(String),
    Many(Vec<String>),
}

impl DeviceIds {
    fn into_vec(self) -> Vec<String> {
        match self {
            DeviceIds::One(id) => vec![id],
            DeviceIds::Many(ids) => ids,
        }
    }
}

/// Response for dispatch operations
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    /// Number of devices actually updated; targets unknown to the registry
    /// are skipped without failing the call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<usize>,
}

/// `POST /api/content` — push one content payload to a set of devices
pub async fn apply_content(
    Extension(coordinator): Extension<Coordinator>,
    Json(body): Json<ApplyContentRequest>,
) -> Json<DispatchResponse> {
    let targets = body.device_ids.into_vec();
    let applied = coordinator.apply_content(&targets, &body.content, None);

    Json(DispatchResponse {
        success: true,
        applied: Some(applied),
    })
}

/// `POST /api/content/:device_id/fallback` — force one display to fallback
pub async fn device_fallback(
    Extension(coordinator): Extension<Coordinator>,
    Path(device_id): Path<String>,
) -> Json<DispatchResponse> {
    coordinator.clear_fallback(Some(&device_id));
    Json(DispatchResponse {
        success: true,
        applied: None,
    })
}

/// `POST /api/all/fallback` — force every display to fallback
pub async fn all_fallback(
    Extension(coordinator): Extension<Coordinator>,
) -> Json<DispatchResponse> {
    coordinator.clear_fallback(None);
    Json(DispatchResponse {
        success: true,
        applied: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_ids_accepts_single_string() {
        let body: ApplyContentRequest = serde_json::from_str(
            r##"{"deviceIds": "1", "content": {"type": "color", "value": "#000"}}"##,
        )
        .unwrap();
        assert_eq!(body.device_ids.into_vec(), vec!["1".to_string()]);
    }

    #[test]
    fn test_device_ids_accepts_array() {
        let body: ApplyContentRequest = serde_json::from_str(
            r#"{"deviceIds": ["1", "2"], "content": {"type": "text", "value": "hi"}}"#,
        )
        .unwrap();
        assert_eq!(
            body.device_ids.into_vec(),
            vec!["1".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(serde_json::from_str::<ApplyContentRequest>(r#"{"deviceIds": "1"}"#).is_err());
        assert!(serde_json::from_str::<ApplyContentRequest>(
            r##"{"content": {"type": "color", "value": "#000"}}"##
        )
        .is_err());
    }
}
