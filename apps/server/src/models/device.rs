//! Device descriptors and live device state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::Content;

/// Static description of a configured display, loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Stable device identifier
    pub id: String,

    /// Human-readable device name
    pub label: String,

    /// Optional free-form description (placement, purpose)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Live state of one configured display
///
/// One record exists per configured device for the whole process lifetime;
/// connections come and go but records are never destroyed. Serialized in
/// camelCase as part of the `device-status-update` snapshot and the REST
/// device listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether an active connection currently claims this device
    pub connected: bool,

    /// Connection currently claiming this device, if any
    pub session_id: Option<Uuid>,

    /// Last content pushed; `None` after a forced fallback
    pub last_content: Option<Content>,

    /// Scene that produced `last_content`, when it came from a scene
    pub last_scene: Option<String>,

    /// Unix millis of the last content push
    pub last_update: Option<i64>,

    /// Unix millis of the first-ever connect in this process run; kept
    /// across reconnections
    pub connected_at: Option<i64>,

    /// Most recent latency estimate in milliseconds
    pub latency_ms: Option<i64>,

    /// Unix millis when the latency estimate was taken
    pub latency_measured_at: Option<i64>,
}

impl DeviceRecord {
    /// Create a fresh, disconnected record from its descriptor
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        Self {
            id: descriptor.id,
            label: descriptor.label,
            description: descriptor.description,
            connected: false,
            session_id: None,
            last_content: None,
            last_scene: None,
            last_update: None,
            connected_at: None,
            latency_ms: None,
            latency_measured_at: None,
        }
    }
}
