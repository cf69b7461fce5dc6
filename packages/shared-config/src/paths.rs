//! Filesystem path configuration

use std::path::{Path, PathBuf};

use crate::get_env_or_default;

/// Locations of the on-disk inputs the server works with
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Device descriptor file, read once at startup
    pub devices_file: PathBuf,

    /// Directory holding one JSON file per scene
    pub scenes_dir: PathBuf,
}

impl PathsConfig {
    /// Load path configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            devices_file: PathBuf::from(get_env_or_default("DEVICES_CONFIG", "./devices.json")),
            scenes_dir: PathBuf::from(get_env_or_default("SCENES_DIR", "./scenes")),
        }
    }

    /// Create a configuration rooted at a custom directory (useful for testing)
    pub fn rooted_at(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            devices_file: dir.join("devices.json"),
            scenes_dir: dir.join("scenes"),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            devices_file: PathBuf::from("./devices.json"),
            scenes_dir: PathBuf::from("./scenes"),
        }
    }
}
