//! Device session and broadcast coordination
//!
//! The coordinator owns the device registry, the broadcast router, and the
//! scene store handle, and exposes every operation the transport and REST
//! layers are allowed to perform. Each operation runs its registry
//! mutation and the broadcasts it implies under one registry guard, so
//! observers can never see a half-applied update.

pub mod registry;
pub mod router;

pub use registry::DeviceRegistry;
pub use router::{BroadcastRouter, Channel, ConnectionHandle, Outbound};

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Content, DeviceDescriptor, DeviceRecord, Scene};
use crate::store::SceneStore;
use crate::websocket::messages::{
    ContentUpdatePayload, ErrorPayload, PongMeasurePayload, SceneTriggeredPayload, ServerMessage,
};

use registry::{snapshot_of, DeviceMap};

/// Current server clock in Unix millis
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Mutable scene-trigger bookkeeping, one per process
#[derive(Debug, Default)]
struct ServerState {
    last_triggered_scene: Option<String>,
    last_triggered_at: Option<i64>,
}

/// Server status for the REST facade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    /// Last scene dispatched, if any
    pub last_scene: Option<String>,

    /// Unix millis of the last scene dispatch
    pub last_scene_time: Option<i64>,

    /// Seconds since the coordinator was constructed
    pub server_uptime: i64,
}

struct CoordinatorInner {
    registry: DeviceRegistry,
    router: BroadcastRouter,
    scenes: SceneStore,
    state: Mutex<ServerState>,
    started_at: i64,
}

/// Orchestrates connection lifecycle, latency probing, and dispatch
///
/// Constructed once per process and cloned (cheaply, via Arc) into the
/// transport and REST layers. Test instances are fully isolated — there
/// is no hidden global state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

impl Coordinator {
    /// Build a coordinator over the configured devices and scene store
    pub fn new(descriptors: Vec<DeviceDescriptor>, scenes: SceneStore) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                registry: DeviceRegistry::load(descriptors),
                router: BroadcastRouter::new(),
                scenes,
                state: Mutex::new(ServerState::default()),
                started_at: now_ms(),
            }),
        }
    }

    // ========== Reads ==========

    /// Point-in-time copy of every device record
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        self.inner.registry.snapshot()
    }

    /// Whether a device id is configured
    pub fn has_device(&self, device_id: &str) -> bool {
        self.inner.registry.contains(device_id)
    }

    /// Scene list for UIs and the REST facade
    ///
    /// A store failure degrades to an empty list; dashboards stay usable
    /// even when the scene directory is unreadable.
    pub fn list_scenes(&self) -> Vec<Scene> {
        match self.inner.scenes.list() {
            Ok(scenes) => scenes,
            Err(e) => {
                tracing::warn!(error = %e, "Scene store listing failed, returning empty list");
                Vec::new()
            }
        }
    }

    /// Server status: last triggered scene and uptime
    pub fn status(&self) -> ServerStatus {
        let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        ServerStatus {
            last_scene: state.last_triggered_scene.clone(),
            last_scene_time: state.last_triggered_at,
            server_uptime: (now_ms() - self.inner.started_at) / 1000,
        }
    }

    // ========== Connection lifecycle ==========

    /// Attach an admin UI connection
    ///
    /// The client immediately receives the full registry snapshot and the
    /// current scene list so it can render without a follow-up request.
    pub fn connect_ui(&self, handle: ConnectionHandle) {
        self.inner.router.join_ui(handle.clone());

        handle.send(ServerMessage::DeviceStatusUpdate(self.snapshot()));
        handle.send(ServerMessage::ScenesUpdated(self.list_scenes()));

        tracing::info!(
            connection_id = %handle.id,
            ui_count = self.inner.router.ui_count(),
            "UI client connected"
        );
    }

    /// Attach a display connection claiming the given device id
    ///
    /// Unknown ids are a protocol error; the caller closes the connection.
    /// When the device was already claimed, the newest connection wins and
    /// the previous holder is force-closed.
    pub fn connect_display(&self, device_id: &str, handle: ConnectionHandle) -> ApiResult<()> {
        let now = now_ms();

        self.inner.registry.with(|devices| {
            let record = devices
                .get_mut(device_id)
                .ok_or_else(|| ApiError::not_found("device", device_id))?;

            record.connected = true;
            record.session_id = Some(handle.id);
            record.last_update = Some(now);
            if record.connected_at.is_none() {
                record.connected_at = Some(now);
            }

            // Catch-up for reconnects: replay whatever the device last showed
            let replay = record.last_content.clone().map(|content| {
                ServerMessage::ContentUpdate(ContentUpdatePayload {
                    content,
                    timestamp: now,
                })
            });

            if let Some(previous) = self.inner.router.join_display(device_id, handle.clone()) {
                if previous.id != handle.id {
                    tracing::warn!(
                        device_id = %device_id,
                        previous_connection = %previous.id,
                        new_connection = %handle.id,
                        "Device claimed by a newer connection, evicting previous session"
                    );
                    previous.send(ServerMessage::Error(ErrorPayload::session_replaced()));
                    previous.close();
                }
            }

            self.inner
                .router
                .broadcast_ui(ServerMessage::DeviceStatusUpdate(snapshot_of(devices)));

            if let Some(msg) = replay {
                handle.send(msg);
            }
            handle.send(ServerMessage::Pong);

            tracing::info!(
                device_id = %device_id,
                connection_id = %handle.id,
                "Display connected"
            );
            Ok(())
        })
    }

    /// Detach a display connection
    ///
    /// Only the connection that still holds the claim may flip the record
    /// back to disconnected; a session evicted by a newer claim leaves the
    /// successor's registration untouched. Latency and last-content fields
    /// survive the disconnect.
    pub fn disconnect_display(&self, device_id: &str, connection_id: Uuid) {
        self.inner.router.leave_display(device_id, connection_id);

        self.inner.registry.with(|devices| {
            let Some(record) = devices.get_mut(device_id) else {
                return;
            };
            if record.session_id != Some(connection_id) {
                tracing::debug!(
                    device_id = %device_id,
                    connection_id = %connection_id,
                    "Stale disconnect ignored, device claimed by a newer session"
                );
                return;
            }

            record.connected = false;
            record.session_id = None;

            self.inner
                .router
                .broadcast_ui(ServerMessage::DeviceStatusUpdate(snapshot_of(devices)));

            tracing::info!(
                device_id = %device_id,
                connection_id = %connection_id,
                "Display disconnected"
            );
        });
    }

    /// Detach an admin UI connection; no device state changes
    pub fn disconnect_ui(&self, connection_id: Uuid) {
        if self.inner.router.leave_ui(connection_id) {
            tracing::info!(
                connection_id = %connection_id,
                ui_count = self.inner.router.ui_count(),
                "UI client disconnected"
            );
        }
    }

    // ========== Latency probing ==========

    /// Handle a `ping-measure` probe and reply to the requester
    ///
    /// The latency value is `server_now - client_time`: a one-way estimate
    /// that assumes the peer clock is roughly in sync with ours. It is not
    /// a true round trip and is reported as-is. Probes from connections
    /// without a device record still get a reply, with `ping: null`.
    pub fn ping_measure(&self, device_id: Option<&str>, handle: &ConnectionHandle, client_time: i64) {
        let now = now_ms();
        let latency = now - client_time;

        let recorded = match device_id {
            Some(id) => self.inner.registry.with(|devices| {
                let Some(record) = devices.get_mut(id) else {
                    return false;
                };
                record.latency_ms = Some(latency);
                record.latency_measured_at = Some(now);

                self.inner
                    .router
                    .broadcast_ui(ServerMessage::DeviceStatusUpdate(snapshot_of(devices)));
                true
            }),
            None => false,
        };

        handle.send(ServerMessage::PongMeasure(PongMeasurePayload {
            server_time: now,
            ping: recorded.then_some(latency),
        }));
    }

    // ========== Content dispatch ==========

    /// Push content to a set of devices
    ///
    /// Ids absent from the registry are skipped without failing the batch.
    /// Returns how many devices were actually updated.
    pub fn apply_content(
        &self,
        targets: &[String],
        content: &Content,
        scene_id: Option<&str>,
    ) -> usize {
        let now = now_ms();
        let applied = self.inner.registry.with(|devices| {
            let mut applied = 0;
            for id in targets {
                if self.apply_to_device(devices, id, content, scene_id, now) {
                    applied += 1;
                }
            }
            applied
        });

        tracing::info!(
            content_type = content.kind(),
            targets = targets.len(),
            applied = applied,
            "Content dispatched"
        );
        applied
    }

    /// Dispatch every assignment of a stored scene
    ///
    /// Unknown scene ids are a not-found error and mutate nothing.
    /// Re-triggering the same scene overwrites identically; nothing
    /// accumulates.
    pub fn trigger_scene(&self, scene_id: &str) -> ApiResult<Scene> {
        let scene = self
            .inner
            .scenes
            .get(scene_id)?
            .ok_or_else(|| ApiError::not_found("scene", scene_id))?;

        let now = now_ms();
        self.inner.registry.with(|devices| {
            for (device_id, content) in &scene.devices {
                self.apply_to_device(devices, device_id, content, Some(&scene.id), now);
            }

            {
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                state.last_triggered_scene = Some(scene.id.clone());
                state.last_triggered_at = Some(now);
            }

            self.inner
                .router
                .broadcast_ui(ServerMessage::SceneTriggered(SceneTriggeredPayload {
                    scene_id: scene.id.clone(),
                    timestamp: now,
                    device_count: scene.devices.len(),
                }));
            self.inner
                .router
                .broadcast_ui(ServerMessage::DeviceStatusUpdate(snapshot_of(devices)));
        });

        tracing::info!(
            scene_id = %scene.id,
            device_count = scene.devices.len(),
            "Scene triggered"
        );
        Ok(scene)
    }

    /// Force fallback on one device, or on every device when `target` is None
    ///
    /// Clears the content fields only; connection, session, and latency
    /// state stay as they are. Unknown single targets are a silent no-op.
    pub fn clear_fallback(&self, target: Option<&str>) {
        self.inner.registry.with(|devices| match target {
            Some(id) => {
                if let Some(record) = devices.get_mut(id) {
                    clear_content(record);
                    self.inner
                        .router
                        .send_to(Channel::Display(id), ServerMessage::Fallback);
                    tracing::info!(device_id = %id, "Fallback forced");
                }
            }
            None => {
                for (id, record) in devices.iter_mut() {
                    clear_content(record);
                    self.inner
                        .router
                        .send_to(Channel::Display(id), ServerMessage::Fallback);
                }
                tracing::info!("Fallback forced for all devices");
            }
        });
    }

    fn apply_to_device(
        &self,
        devices: &mut DeviceMap,
        id: &str,
        content: &Content,
        scene_id: Option<&str>,
        now: i64,
    ) -> bool {
        let Some(record) = devices.get_mut(id) else {
            tracing::debug!(device_id = %id, "Skipping content for unknown device");
            return false;
        };

        record.last_content = Some(content.clone());
        record.last_update = Some(now);
        if let Some(scene) = scene_id {
            record.last_scene = Some(scene.to_string());
        }

        self.inner.router.send_to(
            Channel::Display(id),
            ServerMessage::ContentUpdate(ContentUpdatePayload {
                content: content.clone(),
                timestamp: now,
            }),
        );
        true
    }

    // ========== Scene catalogue pass-through ==========

    /// Persist a new scene and announce the refreshed catalogue
    pub fn create_scene(&self, scene: Scene) -> ApiResult<Scene> {
        self.inner.scenes.create(&scene)?;
        self.broadcast_scene_list();
        Ok(scene)
    }

    /// Create or replace a scene and announce the refreshed catalogue
    pub fn upsert_scene(&self, scene: Scene) -> ApiResult<Scene> {
        self.inner.scenes.upsert(&scene)?;
        self.broadcast_scene_list();
        Ok(scene)
    }

    /// Delete a scene and announce the refreshed catalogue
    pub fn delete_scene(&self, scene_id: &str) -> ApiResult<()> {
        self.inner.scenes.delete(scene_id)?;
        self.broadcast_scene_list();
        Ok(())
    }

    /// `scenes-updated` goes to both channels; displays ignore it
    fn broadcast_scene_list(&self) {
        let scenes = self.list_scenes();
        self.inner
            .router
            .broadcast_all(ServerMessage::ScenesUpdated(scenes));
    }
}

fn clear_content(record: &mut DeviceRecord) {
    record.last_content = None;
    record.last_scene = None;
    record.last_update = None;
}
