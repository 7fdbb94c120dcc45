//! Storage-salt persistence.
//!
//! A salt is generated once per storage scope and reused on every later
//! collection in that scope. One [`SaltStore`] instance is one scope: an
//! in-memory map for a process, or one JSON file on disk.
//!
//! Read-then-write is not locked. Two collections racing on an empty scope
//! may each generate a candidate; whichever write lands last is what later
//! reads see.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ProbeError, StorageError};
use crate::source::{run_blocking, SignalSource};

/// Default key the salt is stored under.
pub const DEFAULT_SALT_KEY: &str = "fp_salt";

/// Scoped key-value storage used only for the salt.
pub trait SaltStore: Send + Sync {
    /// Read a value. `Ok(None)` means the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Insert or replace a value.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local scope backed by a `RwLock` around a `HashMap`.
#[derive(Default)]
pub struct InMemorySaltStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySaltStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaltStore for InMemorySaltStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| StorageError::Unavailable("salt store lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("salt store lock poisoned".into()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// On-disk scope: a flat JSON object in a single file.
///
/// A missing file is an empty scope. A file whose contents do not parse is
/// also treated as empty, so the salt gets regenerated and the file
/// rewritten; only I/O failures are reported as errors.
#[derive(Debug, Clone)]
pub struct FileSaltStore {
    path: PathBuf,
}

impl FileSaltStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(StorageError::io(err)),
        };
        match serde_json::from_str(&text) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "salt_store_corrupt");
                Ok(HashMap::new())
            }
        }
    }
}

impl SaltStore for FileSaltStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StorageError::io)?;
        }
        let text = serde_json::to_string_pretty(&map).map_err(StorageError::io)?;
        fs::write(&self.path, text).map_err(StorageError::io)
    }
}

/// Fresh salt: 32 lowercase hex characters from a v4 UUID.
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Signal source yielding the scope's salt, creating it on first use.
#[derive(Clone)]
pub struct StorageSalt {
    store: Arc<dyn SaltStore>,
    key: String,
}

impl StorageSalt {
    pub fn new(store: Arc<dyn SaltStore>) -> Self {
        Self::with_key(store, DEFAULT_SALT_KEY)
    }

    pub fn with_key(store: Arc<dyn SaltStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    fn acquire(&self) -> Result<String, StorageError> {
        if let Some(existing) = self.store.get(&self.key)?.filter(|s| !s.is_empty()) {
            return Ok(existing);
        }
        let salt = generate_salt();
        self.store.put(&self.key, &salt)?;
        debug!(key = %self.key, "storage_salt_created");
        Ok(salt)
    }
}

#[async_trait]
impl SignalSource for StorageSalt {
    type Output = String;

    fn name(&self) -> &'static str {
        "storage_salt"
    }

    async fn probe(&self) -> Result<String, ProbeError> {
        let this = self.clone();
        run_blocking(move || Ok(this.acquire()?)).await
    }
}
