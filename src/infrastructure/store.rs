//! Key-value store implementations
//!
//! `FileStore` keeps one JSON file per key inside a directory, `MemoryStore`
//! keeps everything in a map and is used for tests and `STORE_DIR=memory:`.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::domain::{DomainError, KeyValueStore};

/// Location value selecting the in-memory store
pub const MEMORY_LOCATION: &str = "memory:";

/// Open the store described by `location` (a directory, or `memory:`)
pub fn open_store(location: &str) -> Result<Arc<dyn KeyValueStore>, DomainError> {
    if location == MEMORY_LOCATION {
        tracing::info!("Using in-memory store, borrowing history will not survive restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = FileStore::open(location)?;
    tracing::info!("Using file store at {:?}", store.dir());
    Ok(Arc::new(store))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Internal("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Internal("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DomainError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(DomainError::Validation(format!("invalid store key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;
        // Readers only ever see a complete value
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn check_key(&self, key: &str) -> Result<(), DomainError> {
        self.path_for(key).map(|_| ())
    }
}
