//! JSON persistence for the registry.
//!
//! The file is an object keyed by primary label:
//!
//! ```json
//! { "edgar": { "id": 7, "app": "kitty", "title": "...", "path": null,
//!              "aliases": ["ed"], "created_at": 1700000000 } }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use recall_core::error::RecallError;
use recall_core::types::{AppName, Timestamp, WindowId, WindowTitle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entry::WindowEntry;
use crate::error::RegistryError;
use crate::registry::LabelRegistry;

type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Serialize, Deserialize)]
struct StoredWindow {
    id: WindowId,
    app: AppName,
    title: WindowTitle,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default = "Timestamp::now")]
    created_at: Timestamp,
}

/// Reads and writes the registry file.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored entries. A missing file yields no entries.
    pub fn load(&self) -> Result<Vec<WindowEntry>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No saved windows file yet");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(RecallError::from)?;
        let stored: BTreeMap<String, StoredWindow> =
            serde_json::from_str(&content).map_err(RecallError::from)?;
        let entries: Vec<WindowEntry> = stored
            .into_iter()
            .map(|(primary, w)| WindowEntry {
                primary,
                aliases: w.aliases,
                window: w.id,
                app: w.app,
                title: w.title,
                path: w.path,
                created_at: w.created_at,
            })
            .collect();
        info!(path = %self.path.display(), count = entries.len(), "Saved windows loaded");
        Ok(entries)
    }

    /// Load stored entries into `registry`, replacing its contents.
    pub fn load_into(&self, registry: &mut LabelRegistry) -> Result<()> {
        let entries = self.load()?;
        registry.restore(entries);
        Ok(())
    }

    /// Write the whole registry to disk.
    pub fn save(&self, registry: &LabelRegistry) -> Result<()> {
        let stored: BTreeMap<&str, StoredWindow> = registry
            .entries()
            .map(|e| {
                (
                    e.primary.as_str(),
                    StoredWindow {
                        id: e.window,
                        app: e.app.clone(),
                        title: e.title.clone(),
                        path: e.path.clone(),
                        aliases: e.aliases.clone(),
                        created_at: e.created_at,
                    },
                )
            })
            .collect();

        if self.path.is_dir() {
            return Err(RecallError::Storage(format!(
                "{} is a directory",
                self.path.display()
            ))
            .into());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(RecallError::from)?;
            }
        }
        let content = serde_json::to_string_pretty(&stored).map_err(RecallError::from)?;
        std::fs::write(&self.path, content).map_err(RecallError::from)?;
        debug!(path = %self.path.display(), count = stored.len(), "Saved windows written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::types::{Rect, WindowInfo};

    fn window(id: u64) -> WindowInfo {
        WindowInfo::new(id, "kitty", "me@box: ~/src", Rect::default())
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("saved_windows.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_saved_registry_resolves_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("state").join("saved_windows.json"));

        let mut reg = LabelRegistry::new();
        reg.save("edgar", &window(7), Some(PathBuf::from("/home/me/src")))
            .unwrap();
        reg.add_alias("edgar", "ed").unwrap();
        reg.save("velma", &window(8), None).unwrap();
        store.save(&reg).unwrap();

        let mut reloaded = LabelRegistry::new();
        store.load_into(&mut reloaded).unwrap();

        assert_eq!(reloaded.len(), 2);
        let entry = reloaded.resolve("ed").unwrap();
        assert_eq!(entry.primary, "edgar");
        assert_eq!(entry.window, WindowId(7));
        assert_eq!(entry.path, Some(PathBuf::from("/home/me/src")));
        assert_eq!(reloaded.resolve("velma").unwrap().window, WindowId(8));
    }

    #[test]
    fn test_file_format_keyed_by_primary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_windows.json");
        let store = RegistryStore::new(&path);

        let mut reg = LabelRegistry::new();
        reg.save("edgar", &window(7), None).unwrap();
        store.save(&reg).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["edgar"]["id"], 7);
        assert_eq!(value["edgar"]["app"], "kitty");
        assert!(value["edgar"]["aliases"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_load_without_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_windows.json");
        std::fs::write(&path, r#"{"edgar": {"id": 3, "app": "firefox", "title": "Docs"}}"#)
            .unwrap();

        let entries = RegistryStore::new(&path).load().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].aliases.is_empty());
        assert!(entries[0].path.is_none());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_windows.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = RegistryStore::new(&path).load().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Storage(RecallError::Serialization(_))
        ));
    }

    #[test]
    fn test_save_to_directory_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = LabelRegistry::new();
        reg.save("edgar", &window(7), None).unwrap();

        let err = RegistryStore::new(dir.path()).save(&reg).unwrap_err();
        assert!(matches!(err, RegistryError::Storage(RecallError::Storage(_))));
        assert!(err.to_string().ends_with("is a directory"));
    }
}
