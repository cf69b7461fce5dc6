//! On-disk scene store
//!
//! Scenes live as one JSON file per scene (`<id>.json`) inside a flat
//! directory. Writes go through a temp-file-then-rename in the same
//! directory so a crash mid-write never leaves a partial scene file.
//! The store is synchronous and is only touched from low-frequency CRUD
//! paths, never while the device registry is locked.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, ApiResult};
use crate::models::Scene;

/// Maximum length accepted for a scene id
const MAX_SCENE_ID_LEN: usize = 128;

/// Validate a scene id before it is used as a file stem
///
/// Ids double as file names, so the charset is restricted the same way
/// device ids are at the WebSocket handshake.
pub fn validate_scene_id(id: &str) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err("scene id cannot be empty");
    }
    if id.len() > MAX_SCENE_ID_LEN {
        return Err("scene id too long");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("scene id contains invalid characters");
    }
    Ok(())
}

/// File-backed store for scene definitions
#[derive(Debug, Clone)]
pub struct SceneStore {
    dir: PathBuf,
}

impl SceneStore {
    /// Create a store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory this store reads from and writes to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn scene_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Create the scene directory if it does not exist yet
    pub fn ensure_dir(&self) -> ApiResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            tracing::info!(dir = %self.dir.display(), "Created scene directory");
        }
        Ok(())
    }

    /// List every scene on disk, sorted by id
    ///
    /// Individual unreadable or malformed files are skipped with a warning
    /// so one bad file cannot take the whole listing down. A missing
    /// directory is created and yields an empty list.
    pub fn list(&self) -> ApiResult<Vec<Scene>> {
        self.ensure_dir()?;

        let mut scenes = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match self.read_scene_file(&path) {
                Ok(scene) => scenes.push(scene),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable scene file"
                    );
                }
            }
        }

        scenes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(scenes)
    }

    /// Look up a single scene by id
    pub fn get(&self, id: &str) -> ApiResult<Option<Scene>> {
        validate_scene_id(id).map_err(|e| ApiError::ValidationError(e.to_string()))?;

        let path = self.scene_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_scene_file(&path).map(Some)
    }

    /// Persist a new scene; rejects an id that already exists
    pub fn create(&self, scene: &Scene) -> ApiResult<()> {
        validate_scene_id(&scene.id).map_err(|e| ApiError::ValidationError(e.to_string()))?;
        self.ensure_dir()?;

        if self.scene_path(&scene.id).exists() {
            return Err(ApiError::conflict("scene", &scene.id));
        }

        self.write_atomic(scene)?;
        tracing::info!(scene_id = %scene.id, "Scene created");
        Ok(())
    }

    /// Create or replace a scene by id
    pub fn upsert(&self, scene: &Scene) -> ApiResult<()> {
        validate_scene_id(&scene.id).map_err(|e| ApiError::ValidationError(e.to_string()))?;
        self.ensure_dir()?;

        self.write_atomic(scene)?;
        tracing::info!(scene_id = %scene.id, "Scene saved");
        Ok(())
    }

    /// Delete a scene by id; not found is an error
    pub fn delete(&self, id: &str) -> ApiResult<()> {
        validate_scene_id(id).map_err(|e| ApiError::ValidationError(e.to_string()))?;

        let path = self.scene_path(id);
        if !path.exists() {
            return Err(ApiError::not_found("scene", id));
        }

        fs::remove_file(&path)?;
        tracing::info!(scene_id = %id, "Scene deleted");
        Ok(())
    }

    fn read_scene_file(&self, path: &Path) -> ApiResult<Scene> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write via a sibling temp file and rename into place
    fn write_atomic(&self, scene: &Scene) -> ApiResult<()> {
        let path = self.scene_path(&scene.id);
        let tmp = self.dir.join(format!(".{}.json.tmp", scene.id));

        let json = serde_json::to_vec_pretty(scene)?;
        fs::write(&tmp, &json)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            // Leave no temp litter behind on a failed rename
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Content;
    use std::collections::BTreeMap;

    fn scene(id: &str) -> Scene {
        let mut devices = BTreeMap::new();
        devices.insert(
            "1".to_string(),
            Content::Color {
                value: "#102030".into(),
            },
        );
        Scene {
            id: id.into(),
            label: format!("Scene {}", id),
            description: None,
            devices,
        }
    }

    fn store() -> (tempfile::TempDir, SceneStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SceneStore::new(dir.path().join("scenes"));
        (dir, store)
    }

    #[test]
    fn test_list_creates_missing_dir() {
        let (_dir, store) = store();
        assert!(!store.dir().exists());
        assert!(store.list().unwrap().is_empty());
        assert!(store.dir().exists());
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, store) = store();
        store.create(&scene("intro")).unwrap();

        let loaded = store.get("intro").unwrap().unwrap();
        assert_eq!(loaded, scene("intro"));
    }

    #[test]
    fn test_create_duplicate_conflicts() {
        let (_dir, store) = store();
        store.create(&scene("intro")).unwrap();

        let err = store.create(&scene("intro")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict { .. }));
    }

    #[test]
    fn test_upsert_replaces() {
        let (_dir, store) = store();
        store.create(&scene("intro")).unwrap();

        let mut updated = scene("intro");
        updated.label = "Intro v2".into();
        store.upsert(&updated).unwrap();

        let loaded = store.get("intro").unwrap().unwrap();
        assert_eq!(loaded.label, "Intro v2");
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (_dir, store) = store();
        let err = store.delete("ghost").unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[test]
    fn test_delete_removes_file() {
        let (_dir, store) = store();
        store.create(&scene("intro")).unwrap();
        store.delete("intro").unwrap();
        assert!(store.get("intro").unwrap().is_none());
    }

    #[test]
    fn test_list_skips_malformed_files() {
        let (_dir, store) = store();
        store.create(&scene("good")).unwrap();
        std::fs::write(store.dir().join("bad.json"), "{broken").unwrap();

        let scenes = store.list().unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].id, "good");
    }

    #[test]
    fn test_list_ignores_non_json() {
        let (_dir, store) = store();
        store.ensure_dir().unwrap();
        std::fs::write(store.dir().join("notes.txt"), "hello").unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let (_dir, store) = store();
        store.create(&scene("intro")).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let (_dir, store) = store();
        assert!(store.get("../escape").is_err());
        assert!(store.delete("a/b").is_err());
    }

    #[test]
    fn test_validate_scene_id() {
        assert!(validate_scene_id("intro-1").is_ok());
        assert!(validate_scene_id("scene_2").is_ok());
        assert!(validate_scene_id("").is_err());
        assert!(validate_scene_id("a b").is_err());
        assert!(validate_scene_id("a.b").is_err());
        assert!(validate_scene_id(&"x".repeat(200)).is_err());
    }
}
