//! Settings persistence.
//!
//! The core does not own any on-disk state; it defines [`SettingsStore`], a
//! key-based read/write seam over serialized [`SettingsRecord`]s, so callers
//! can inject whatever persistence they have. [`MemoryStore`] is the
//! substitutable in-memory fake; [`JsonFileStore`] is a JSON-file-backed
//! implementation with a `last` slot plus named templates.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::settings::{ExportSettings, WatermarkSettings};

/// Reserved key for the most recently used settings.
pub const LAST_KEY: &str = "last";

/// A persisted pairing of watermark and export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(rename = "wm")]
    pub watermark: WatermarkSettings,
    #[serde(rename = "exp")]
    pub export: ExportSettings,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-based persistence for settings records.
///
/// `keys()` lists template names only; the [`LAST_KEY`] slot is addressable
/// but not listed.
pub trait SettingsStore {
    fn load(&self, key: &str) -> Result<Option<SettingsRecord>, StoreError>;
    fn save(&mut self, key: &str, record: &SettingsRecord) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str) -> Result<bool, StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    last: Option<SettingsRecord>,
    templates: BTreeMap<String, SettingsRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<SettingsRecord>, StoreError> {
        if key == LAST_KEY {
            return Ok(self.last.clone());
        }
        Ok(self.templates.get(key).cloned())
    }

    fn save(&mut self, key: &str, record: &SettingsRecord) -> Result<(), StoreError> {
        if key == LAST_KEY {
            self.last = Some(record.clone());
        } else {
            self.templates.insert(key.to_string(), record.clone());
        }
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        if key == LAST_KEY {
            return Ok(self.last.take().is_some());
        }
        Ok(self.templates.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.templates.keys().cloned().collect())
    }
}

/// On-disk JSON schema of [`JsonFileStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    last: Option<SettingsRecord>,
    #[serde(default)]
    templates: BTreeMap<String, SettingsRecord>,
}

/// JSON-file-backed store. The whole file is read and rewritten on each
/// mutation; an unreadable or corrupt file is treated as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> StoreFile {
        let Ok(data) = fs::read_to_string(&self.path) else {
            return StoreFile::default();
        };
        match serde_json::from_str(&data) {
            Ok(store) => store,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "settings store unreadable, starting empty");
                StoreFile::default()
            }
        }
    }

    fn write_file(&self, store: &StoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(store)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<SettingsRecord>, StoreError> {
        let store = self.read_file();
        if key == LAST_KEY {
            return Ok(store.last);
        }
        Ok(store.templates.get(key).cloned())
    }

    fn save(&mut self, key: &str, record: &SettingsRecord) -> Result<(), StoreError> {
        let mut store = self.read_file();
        if key == LAST_KEY {
            store.last = Some(record.clone());
        } else {
            store.templates.insert(key.to_string(), record.clone());
        }
        self.write_file(&store)
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        let mut store = self.read_file();
        let removed = if key == LAST_KEY {
            store.last.take().is_some()
        } else {
            store.templates.remove(key).is_some()
        };
        if removed {
            self.write_file(&store)?;
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_file().templates.keys().cloned().collect())
    }
}
