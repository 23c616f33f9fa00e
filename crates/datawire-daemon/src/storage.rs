//! Key-value storage backends.

use crate::state::{Result, StateError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A flat JSON key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores all `entries`, replacing existing values.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()>;
}

/// Stores all keys in a single JSON object file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens a store backed by `path`, creating the parent directory.
    ///
    /// The file itself is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StateError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_object(&self) -> Result<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StateError::ReadFile {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content).map_err(|e| StateError::ParseJson {
            path: self.path.clone(),
            source: e,
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut object = self.read_object().await?;
        Ok(object.remove(key))
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut object = match self.read_object().await {
            Ok(object) => object,
            Err(StateError::ParseJson { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "replacing unreadable storage file");
                Map::new()
            }
            Err(e) => return Err(e),
        };
        object.extend(entries);

        let json = serde_json::to_string_pretty(&Value::Object(object))?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| StateError::WriteFile {
                path: temp.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StateError::WriteFile {
                path: self.path.clone(),
                source: e,
            })
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything stored.
    pub async fn dump(&self) -> Map<String, Value> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        self.entries.lock().await.extend(entries);
        Ok(())
    }
}
