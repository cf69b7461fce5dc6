//! WebSocket message types for the display/admin protocol
//!
//! Messages are serialized as JSON with a kebab-case `type` tag and an
//! optional `payload`, matching the event surface the display and admin
//! clients speak: `{"type": "ping-measure", "payload": 1723111111000}`.

use serde::{Deserialize, Serialize};

use crate::models::{Content, DeviceRecord, Scene};

// =============================================================================
// Client -> Server Messages
// =============================================================================

/// Messages sent from a connected client (display or admin UI) to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Pure liveness check, answered with `pong`; no state change
    Ping,

    /// Latency probe carrying the client's clock in Unix millis
    PingMeasure(i64),
}

// =============================================================================
// Server -> Client Messages
// =============================================================================

/// Messages sent from the server to a connected client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Liveness reply
    Pong,

    /// Latency probe reply
    PongMeasure(PongMeasurePayload),

    /// New content for the receiving display
    ContentUpdate(ContentUpdatePayload),

    /// Instruct the receiving display to show its own fallback asset
    Fallback,

    /// The scene catalogue changed; UIs refresh their list, displays ignore
    ScenesUpdated(Vec<Scene>),

    /// Full registry snapshot for admin UIs
    DeviceStatusUpdate(Vec<DeviceRecord>),

    /// A whole scene was dispatched
    SceneTriggered(SceneTriggeredPayload),

    /// Protocol-level error
    Error(ErrorPayload),
}

// =============================================================================
// Payload Types
// =============================================================================

/// Payload for PongMeasure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PongMeasurePayload {
    /// Server clock at reply time, Unix millis
    pub server_time: i64,

    /// Computed latency estimate; `None` when the sender has no device
    /// record to attach the measurement to
    pub ping: Option<i64>,
}

/// Payload for ContentUpdate
///
/// The content's own fields are flattened so the wire shape stays
/// `{type, src?, value?, duration?, timestamp}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUpdatePayload {
    #[serde(flatten)]
    pub content: Content,

    /// Unix millis when this content was assigned
    pub timestamp: i64,
}

/// Payload for SceneTriggered
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTriggeredPayload {
    pub scene_id: String,

    /// Unix millis when the scene was dispatched
    pub timestamp: i64,

    /// Number of device entries the scene carries
    pub device_count: usize,
}

/// Payload for Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unknown_device(device_id: &str) -> Self {
        Self::new(
            "UNKNOWN_DEVICE",
            format!("Device {} is not configured", device_id),
        )
    }

    pub fn invalid_device_id(reason: &str) -> Self {
        Self::new("INVALID_DEVICE_ID", reason)
    }

    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::new("INVALID_MESSAGE", message)
    }

    pub fn session_replaced() -> Self {
        Self::new(
            "SESSION_REPLACED",
            "Another connection claimed this device",
        )
    }
}
