//! In-memory device registry
//!
//! The registry is the sole writable source of truth for device state.
//! Everything else reads point-in-time snapshots or requests mutation
//! through the coordinator; nothing holds a live reference into it.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{DeviceDescriptor, DeviceRecord};

/// Map of device id -> live record, fixed key set after startup
pub type DeviceMap = BTreeMap<String, DeviceRecord>;

/// Registry of all configured devices
///
/// A single mutex guards the map. Coordinator operations keep the guard
/// across their whole mutate-then-broadcast step, which serializes
/// observable state transitions the same way a single-threaded event loop
/// would.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Mutex<DeviceMap>,
}

impl DeviceRegistry {
    /// Build the registry from startup descriptors
    pub fn load(descriptors: Vec<DeviceDescriptor>) -> Self {
        let devices = descriptors
            .into_iter()
            .map(|d| (d.id.clone(), DeviceRecord::new(d)))
            .collect();
        Self {
            devices: Mutex::new(devices),
        }
    }

    fn guard(&self) -> MutexGuard<'_, DeviceMap> {
        // A poisoned lock only means another thread panicked mid-mutation;
        // the map itself is still structurally sound.
        self.devices.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run a closure with exclusive access to the device map
    ///
    /// This is the registry's mutation entry point; the coordinator uses
    /// it to bundle a mutation with the broadcasts it implies.
    pub fn with<R>(&self, f: impl FnOnce(&mut DeviceMap) -> R) -> R {
        f(&mut self.guard())
    }

    /// Copy of a single record, or `None` for an unknown id
    pub fn get(&self, id: &str) -> Option<DeviceRecord> {
        self.guard().get(id).cloned()
    }

    /// Whether a device id is configured
    pub fn contains(&self, id: &str) -> bool {
        self.guard().contains_key(id)
    }

    /// Point-in-time copy of every record, ordered by id
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        snapshot_of(&self.guard())
    }

    /// Apply a state transition to one record if present; no-op otherwise
    ///
    /// Never fails for an unknown id — callers decide whether absence is
    /// an error. Returns whether the record existed.
    pub fn mutate(&self, id: &str, f: impl FnOnce(&mut DeviceRecord)) -> bool {
        match self.guard().get_mut(id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }
}

/// Snapshot helper usable while already holding the map
pub fn snapshot_of(devices: &DeviceMap) -> Vec<DeviceRecord> {
    devices.values().cloned().collect()
}
