//! Device descriptor loading
//!
//! The descriptor file is the single source for which devices exist; it is
//! read once before the server starts accepting connections, and any
//! failure here must abort startup.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::DeviceDescriptor;

/// On-disk shape of the descriptor file: `{ "devices": [...] }`
#[derive(Debug, Deserialize)]
struct DescriptorFile {
    devices: Vec<DeviceDescriptor>,
}

/// Load and validate the device descriptor file
///
/// Fails on missing file, malformed JSON, empty ids, or duplicate ids;
/// callers are expected to treat any error as fatal.
pub fn load_descriptors(path: &Path) -> Result<Vec<DeviceDescriptor>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read device config {}", path.display()))?;

    let file: DescriptorFile = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse device config {}", path.display()))?;

    let mut seen = HashSet::new();
    for descriptor in &file.devices {
        if descriptor.id.is_empty() {
            bail!("device config contains a device with an empty id");
        }
        if !seen.insert(descriptor.id.clone()) {
            bail!("duplicate device id in device config: {}", descriptor.id);
        }
    }

    tracing::info!(
        path = %path.display(),
        device_count = file.devices.len(),
        "Device config loaded"
    );

    Ok(file.devices)
}
