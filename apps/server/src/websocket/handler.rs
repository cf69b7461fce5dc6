//! WebSocket upgrade handler and per-connection socket loop
//!
//! Role classification happens once, at the handshake: a `deviceId` query
//! parameter makes the connection a display claiming that device, its
//! absence makes it an admin UI. The role is fixed for the connection's
//! lifetime.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Query,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::coordinator::{ConnectionHandle, Coordinator, Outbound};

use super::messages::{ClientMessage, ErrorPayload, ServerMessage};

/// Query parameters for the WebSocket endpoint
#[derive(Debug, Deserialize)]
pub struct WsQueryParams {
    /// Device id claimed by a display; absent for admin UI clients
    #[serde(rename = "deviceId")]
    device_id: Option<String>,
}

/// Role assigned to a connection at handshake time
#[derive(Debug, Clone)]
enum ConnectionRole {
    /// Display claiming a configured device
    Display(String),
    /// Admin dashboard client
    Ui,
}

impl ConnectionRole {
    fn device_id(&self) -> Option<&str> {
        match self {
            ConnectionRole::Display(id) => Some(id),
            ConnectionRole::Ui => None,
        }
    }
}

/// Validate device id format before it reaches the registry
fn validate_device_id(device_id: &str) -> Result<(), &'static str> {
    if device_id.is_empty() {
        return Err("deviceId cannot be empty");
    }
    if device_id.len() > 128 {
        return Err("deviceId must be at most 128 characters");
    }
    if !device_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err("deviceId contains invalid characters");
    }
    Ok(())
}

/// WebSocket upgrade handler
///
/// A handshake naming an unconfigured device is a protocol error: the
/// socket gets an error frame and is closed, never silently demoted to a
/// UI connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQueryParams>,
    Extension(coordinator): Extension<Coordinator>,
) -> Response {
    let role = match params.device_id {
        Some(device_id) => {
            if let Err(reason) = validate_device_id(&device_id) {
                tracing::warn!(device_id = %device_id, reason, "Rejecting malformed deviceId");
                return ws.on_upgrade(move |socket| {
                    reject(socket, ErrorPayload::invalid_device_id(reason))
                });
            }
            if !coordinator.has_device(&device_id) {
                tracing::warn!(device_id = %device_id, "Rejecting unknown device");
                return ws.on_upgrade(move |socket| {
                    reject(socket, ErrorPayload::unknown_device(&device_id))
                });
            }
            ConnectionRole::Display(device_id)
        }
        None => ConnectionRole::Ui,
    };

    ws.on_upgrade(move |socket| handle_socket(socket, role, coordinator))
}

/// Send a protocol error and close without entering the session lifecycle
async fn reject(mut socket: WebSocket, error: ErrorPayload) {
    let msg = ServerMessage::Error(error);
    if let Ok(json) = serde_json::to_string(&msg) {
        let _ = socket.send(Message::Text(json)).await;
    }
    let _ = socket.close().await;
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, role: ConnectionRole, coordinator: Coordinator) {
    let connection_id = Uuid::new_v4();

    // Unbounded outbox: anything in the system can queue frames for this
    // connection by cloning the handle
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let handle = ConnectionHandle::new(connection_id, tx);

    match &role {
        ConnectionRole::Display(device_id) => {
            if let Err(e) = coordinator.connect_display(device_id, handle.clone()) {
                // The registry check raced with the handshake; treat like
                // any other protocol error
                tracing::warn!(device_id = %device_id, error = %e, "Display registration failed");
                reject(socket, ErrorPayload::unknown_device(device_id)).await;
                return;
            }
        }
        ConnectionRole::Ui => coordinator.connect_ui(handle.clone()),
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Writer task: forwards outbox frames to the socket; an Outbound::Close
    // (duplicate-claim eviction) sends a close frame and ends the task
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                Outbound::Message(msg) => match serde_json::to_string(&msg) {
                    Ok(json) => {
                        if ws_sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize outgoing message");
                    }
                },
                Outbound::Close => {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Reader task: parses inbound frames and drives the protocol
    let recv_role = role.clone();
    let recv_handle = handle.clone();
    let recv_coordinator = coordinator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => {
                        recv_handle.send(ServerMessage::Pong);
                    }
                    Ok(ClientMessage::PingMeasure(client_time)) => {
                        recv_coordinator.ping_measure(
                            recv_role.device_id(),
                            &recv_handle,
                            client_time,
                        );
                    }
                    Err(e) => {
                        // Malformed frame: tell the peer, then degrade to a
                        // normal disconnect
                        tracing::debug!(
                            connection_id = %recv_handle.id,
                            error = %e,
                            "Malformed client message, closing connection"
                        );
                        recv_handle
                            .send(ServerMessage::Error(ErrorPayload::invalid_message(
                                e.to_string(),
                            )));
                        break;
                    }
                },
                Ok(Message::Binary(_)) => {
                    tracing::debug!(connection_id = %recv_handle.id, "Ignoring binary frame");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Transport-level keepalive, handled by axum
                }
                Ok(Message::Close(_)) => {
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %recv_handle.id,
                        error = %e,
                        "WebSocket error"
                    );
                    break;
                }
            }
        }
    });

    // Whichever task finishes first tears the other down
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    match &role {
        ConnectionRole::Display(device_id) => {
            coordinator.disconnect_display(device_id, connection_id);
        }
        ConnectionRole::Ui => coordinator.disconnect_ui(connection_id),
    }
}
