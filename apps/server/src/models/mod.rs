//! Core data types shared across the coordinator, transport, and REST facade

pub mod content;
pub mod device;
pub mod scene;

pub use content::Content;
pub use device::{DeviceDescriptor, DeviceRecord};
pub use scene::Scene;
