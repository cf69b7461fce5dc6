//! Channel membership and fan-out
//!
//! Every connection belongs to exactly one channel: `Channel::Display(id)`
//! holds the single connection claiming that device (0 or 1 members), and
//! `Channel::Ui` holds every admin client (0..N members). All event fan-out
//! goes through this router; nothing addresses connections ad hoc.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::websocket::messages::ServerMessage;

/// Frames placed on a connection's outbox
///
/// `Close` is a transport-level instruction: the writer task sends a close
/// frame and tears the socket down. It never appears on the wire as JSON.
#[derive(Debug, Clone)]
pub enum Outbound {
    Message(ServerMessage),
    Close,
}

/// Handle for sending messages to a specific connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Unique id for this connection's lifetime
    pub id: Uuid,
    sender: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionHandle {
    pub fn new(id: Uuid, sender: mpsc::UnboundedSender<Outbound>) -> Self {
        Self { id, sender }
    }

    /// Queue a message for delivery; returns false when the peer is gone
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.sender.send(Outbound::Message(msg)).is_ok()
    }

    /// Ask the transport to close this connection
    pub fn close(&self) {
        let _ = self.sender.send(Outbound::Close);
    }

    /// Check if the connection is still alive
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Target channel for an outgoing event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel<'a> {
    /// The single display connection claiming the given device id
    Display(&'a str),
    /// All admin UI connections
    Ui,
}

/// Routes events to display and UI channels
///
/// Thread-safe; uses DashMap for membership so joins and sends need no
/// explicit locking. Wrapped in the coordinator, which serializes the
/// state-mutating call sites.
#[derive(Debug, Default)]
pub struct BroadcastRouter {
    /// device id -> the one display connection claiming it
    displays: DashMap<String, ConnectionHandle>,

    /// connection id -> UI connection
    ui: DashMap<Uuid, ConnectionHandle>,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a display connection to its per-device channel
    ///
    /// Returns the previous member when the device was already claimed;
    /// the caller decides what to do with the displaced connection.
    pub fn join_display(&self, device_id: &str, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        self.displays.insert(device_id.to_string(), handle)
    }

    /// Remove a display connection, but only if it still owns the channel
    ///
    /// A connection evicted by a newer claim must not tear down its
    /// successor's membership on its own disconnect.
    pub fn leave_display(&self, device_id: &str, connection_id: Uuid) -> bool {
        self.displays
            .remove_if(device_id, |_, handle| handle.id == connection_id)
            .is_some()
    }

    /// Join a UI connection to the UI channel
    pub fn join_ui(&self, handle: ConnectionHandle) {
        self.ui.insert(handle.id, handle);
    }

    /// Remove a UI connection from the UI channel
    pub fn leave_ui(&self, connection_id: Uuid) -> bool {
        self.ui.remove(&connection_id).is_some()
    }

    /// Send an event to one channel; returns the number of receivers
    pub fn send_to(&self, channel: Channel<'_>, msg: ServerMessage) -> usize {
        match channel {
            Channel::Display(device_id) => self
                .displays
                .get(device_id)
                .map(|handle| usize::from(handle.send(msg)))
                .unwrap_or(0),
            Channel::Ui => self.broadcast_ui(msg),
        }
    }

    /// Fan an event out to every UI connection
    pub fn broadcast_ui(&self, msg: ServerMessage) -> usize {
        let mut sent = 0;
        for entry in self.ui.iter() {
            if entry.value().send(msg.clone()) {
                sent += 1;
            }
        }
        sent
    }

    /// Fan an event out to every connection on every channel
    pub fn broadcast_all(&self, msg: ServerMessage) -> usize {
        let mut sent = self.broadcast_ui(msg.clone());
        for entry in self.displays.iter() {
            if entry.value().send(msg.clone()) {
                sent += 1;
            }
        }
        sent
    }

    /// Number of joined UI connections
    pub fn ui_count(&self) -> usize {
        self.ui.len()
    }

    /// Number of joined display connections
    pub fn display_count(&self) -> usize {
        self.displays.len()
    }
}
