//! Local persistence for session statistics
//!
//! Statistics live under a single key in a small string key-value store,
//! the same contract a browser's local storage offers. [`FileStore`] keeps
//! the map in one JSON file; [`MemoryStore`] keeps it in memory.

use crate::config::StorageConfig;
use crate::error::{Result, SofiError};
use crate::stats::SessionStats;
use anyhow::Context;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod types;
pub use types::StoredStats;

/// Key under which the statistics record is stored
pub const STATS_KEY: &str = "sofiAIStats";

/// Durable string key-value store
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store; nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written map behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be determined or created
    pub fn new() -> Result<Self> {
        Self::open(default_stats_path()?)
    }

    /// Open the store configured in `storage.path`, or the default one
    ///
    /// # Errors
    ///
    /// Returns error if the store location cannot be created or read
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::open(path.clone()),
            None => Self::new(),
        }
    }

    /// Open (or lazily create) the store at `path`
    ///
    /// A file that is not a JSON object of strings is treated as empty and
    /// will be overwritten on the next write.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofi_chat::storage::{FileStore, KeyValueStore};
    ///
    /// let dir = std::env::temp_dir().join("sofi-doc-store");
    /// let mut store = FileStore::open(dir.join("stats.json")).unwrap();
    /// store.set("greeting", "hola").unwrap();
    /// assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hola"));
    /// ```
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for store")
                    .map_err(|e| SofiError::Storage(e.to_string()))?;
            }
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable store at {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(SofiError::Io(e).into()),
        };

        Ok(Self { path, entries })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| SofiError::Storage(format!("Failed to serialize store: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                SofiError::Storage(format!(
                    "Failed to write store {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Default location of the statistics file
///
/// # Errors
///
/// Returns error if the platform data directory cannot be determined
pub fn default_stats_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("ai", "sofi", "sofi-chat")
        .ok_or_else(|| SofiError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("stats.json"))
}

/// Load statistics, falling back to zeroed defaults
///
/// Absent, unreadable or malformed records never fail: they are logged and
/// replaced by [`SessionStats::default`].
pub fn load_stats(store: &dyn KeyValueStore) -> SessionStats {
    let raw = match store.get(STATS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return SessionStats::default(),
        Err(e) => {
            tracing::warn!("Failed to read stored statistics: {}", e);
            return SessionStats::default();
        }
    };

    match serde_json::from_str::<StoredStats>(&raw) {
        Ok(stored) => stored.into(),
        Err(e) => {
            tracing::warn!("Stored statistics are corrupt, resetting: {}", e);
            SessionStats::default()
        }
    }
}

/// Persist statistics under [`STATS_KEY`]
///
/// # Errors
///
/// Returns error if serialization or the underlying store write fails
pub fn save_stats(store: &mut dyn KeyValueStore, stats: &SessionStats) -> Result<()> {
    let json = serde_json::to_string(&StoredStats::from_stats(stats))?;
    store.set(STATS_KEY, &json)
}
