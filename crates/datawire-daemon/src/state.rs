//! Typed access to persisted usage state.

use crate::storage::{JsonFileStore, KeyValueStore};
use datawire_ledger::{DurableState, DurableView};
use datawire_types::Settings;
use directories::ProjectDirs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Storage key for the daily history.
pub const DAILY_USAGE_KEY: &str = "dailyUsage";

/// Storage key for the per-domain totals.
pub const SITE_USAGE_KEY: &str = "siteUsage";

/// Storage key for the current session.
pub const CURRENT_SESSION_KEY: &str = "currentSession";

/// Storage key for user settings.
pub const SETTINGS_KEY: &str = "settings";

/// File name used inside the data directory.
const STORAGE_FILE_NAME: &str = "storage.json";

/// Errors that can occur while reading or writing persisted state.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse JSON.
    #[error("Failed to parse storage file '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to serialize or decode a value.
    #[error("Failed to serialize state: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// The storage backend is not available.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for state operations.
pub type Result<T> = std::result::Result<T, StateError>;

/// Typed wrapper over a [`KeyValueStore`].
///
/// Every key is independently optional: a key that is missing, or whose
/// value does not decode, is logged and reported as absent. The daily and
/// per-domain maps are decoded entry by entry, so one bad entry is skipped
/// without losing the rest of the map.
#[derive(Debug, Clone)]
pub struct UsageStore {
    store: Arc<dyn KeyValueStore>,
}

impl UsageStore {
    /// Wraps a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Opens the JSON file store inside `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let store = JsonFileStore::open(data_dir.join(STORAGE_FILE_NAME))?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Opens the JSON file store in the default data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path())
    }

    /// Returns the default data directory.
    ///
    /// Uses the `directories` crate to find the appropriate location:
    /// - Linux: `~/.local/share/datawire/`
    /// - macOS: `~/Library/Application Support/datawire/`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\datawire\`
    ///
    /// Falls back to `~/.datawire/` if the platform-specific location
    /// cannot be determined.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "datawire").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Returns the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Loads settings, falling back to defaults.
    pub async fn load_settings(&self) -> Settings {
        self.load_key(SETTINGS_KEY).await.unwrap_or_default()
    }

    /// Saves settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be encoded or written.
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        self.store.set(vec![(SETTINGS_KEY.to_string(), value)]).await
    }

    /// Loads the persisted daily history, domain totals and session.
    pub async fn load_durable(&self) -> DurableState {
        DurableState {
            daily_usage: self.load_map(DAILY_USAGE_KEY).await,
            site_usage: self.load_map(SITE_USAGE_KEY).await,
            current_session: self.load_key(CURRENT_SESSION_KEY).await,
        }
    }

    /// Encodes the durable part of a ledger into storage entries.
    ///
    /// Encoding is separate from [`save_entries`](Self::save_entries) so
    /// callers can release their ledger lock before the write.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be encoded.
    pub fn encode_durable(view: DurableView<'_>) -> Result<Vec<(String, Value)>> {
        Ok(vec![
            entry(DAILY_USAGE_KEY, view.daily_usage)?,
            entry(SITE_USAGE_KEY, view.site_usage)?,
            entry(CURRENT_SESSION_KEY, view.current_session)?,
        ])
    }

    /// Writes pre-encoded entries in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub async fn save_entries(&self, entries: Vec<(String, Value)>) -> Result<()> {
        self.store.set(entries).await
    }

    async fn read_key(&self, key: &str) -> Option<Value> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored value");
                None
            }
        }
    }

    async fn load_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.read_key(key).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring stored value that does not decode");
                None
            }
        }
    }

    async fn load_map<K, V>(&self, key: &str) -> Option<BTreeMap<K, V>>
    where
        K: FromStr + Ord,
        K::Err: Display,
        V: DeserializeOwned,
    {
        let Value::Object(entries) = self.read_key(key).await? else {
            tracing::warn!(key, "ignoring stored value that is not a map");
            return None;
        };

        let mut map = BTreeMap::new();
        for (name, value) in entries {
            let entry_key = match name.parse::<K>() {
                Ok(entry_key) => entry_key,
                Err(e) => {
                    tracing::warn!(key, entry = %name, error = %e, "skipping stored entry with invalid key");
                    continue;
                }
            };
            match serde_json::from_value(value) {
                Ok(totals) => {
                    map.insert(entry_key, totals);
                }
                Err(e) => {
                    tracing::warn!(key, entry = %name, error = %e, "skipping stored entry that does not decode");
                }
            }
        }
        Some(map)
    }
}

fn entry<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<(String, Value)> {
    Ok((key.to_string(), serde_json::to_value(value)?))
}

/// Fallback for determining home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".datawire")
}
