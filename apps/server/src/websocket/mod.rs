//! WebSocket transport: upgrade handling and the wire protocol
//!
//! The coordinator owns all state; this module only classifies incoming
//! connections, shuttles frames, and translates between JSON and typed
//! messages.

pub mod handler;
pub mod messages;

pub use handler::ws_handler;
