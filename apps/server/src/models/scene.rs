//! Scene definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::content::Content;

/// A named mapping from device id to content, applied as one unit
///
/// Scenes are persisted as individual JSON files by the scene store; the
/// coordinator only ever receives copies. `devices` uses a `BTreeMap` so
/// listings and files are deterministically ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Stable scene identifier, doubles as the file stem on disk
    pub id: String,

    /// Human-readable scene name
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content assignment per device id
    #[serde(default)]
    pub devices: BTreeMap<String, Content>,
}
