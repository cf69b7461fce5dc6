//! File-backed collaborators: device descriptors and the scene store

pub mod devices;
pub mod scenes;

pub use devices::load_descriptors;
pub use scenes::SceneStore;
