//! Persistence
//!
//! The whole store is one JSON blob under the `habits` key of a small
//! key-value storage. On disk every key is a file in the data directory:
//! - Store: ~/.local/share/habits/habits
//!
//! Older releases wrote other shapes under the same key. Each shape is a
//! variant of [`PersistedStore`] with its own migration step; the loader
//! walks a blob forward to the current shape, then repairs invariants.
//!
//! Loading never fails: missing or malformed data yields the seed habits.
//! Saving is best-effort: failures are logged and the in-memory store wins.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::habit::Habit;
use crate::store::{HabitStore, StoreError};

/// Key the store is persisted under
pub const STORE_KEY: &str = "habits";

/// Minimal key-value storage
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let tmp = self.dir.join(format!(".{}.tmp", key));

        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory storage
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Why a persisted blob could not be used
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Stored habits are not valid JSON in any known shape: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Stored habits break store invariants: {0}")]
    Invalid(#[from] StoreError),
}

/// Every shape the store has been persisted in, newest first
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PersistedStore {
    /// `{ "active": [...], "inactive": [...] }`
    V2(StoreV2),
    /// `{ "active": [...] }`
    V1(StoreV1),
    /// `[...]`
    V0(Vec<Habit>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreV2 {
    pub active: Vec<Habit>,
    pub inactive: Vec<Habit>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreV1 {
    pub active: Vec<Habit>,
}

impl PersistedStore {
    pub fn version(&self) -> u32 {
        match self {
            PersistedStore::V2(_) => 2,
            PersistedStore::V1(_) => 1,
            PersistedStore::V0(_) => 0,
        }
    }

    /// Walk the blob forward to the current shape
    pub fn migrate(self) -> Result<HabitStore, StoreError> {
        let v2 = match self {
            PersistedStore::V0(habits) => migrate_v1(migrate_v0(habits)),
            PersistedStore::V1(v1) => migrate_v1(v1),
            PersistedStore::V2(v2) => v2,
        };

        let store = HabitStore {
            active: v2.active,
            inactive: v2.inactive,
        }
        .normalized();
        store.check_invariants()?;
        Ok(store)
    }
}

/// Flat list -> `{ active }`. Everything was active in the flat shape.
fn migrate_v0(habits: Vec<Habit>) -> StoreV1 {
    StoreV1 { active: habits }
}

/// `{ active }` -> `{ active, inactive }`, splitting out archived habits
fn migrate_v1(v1: StoreV1) -> StoreV2 {
    let (active, inactive): (Vec<Habit>, Vec<Habit>) = v1.active.into_iter().partition(|h| !h.archived);
    StoreV2 { active, inactive }
}

/// Decode a persisted blob of any known shape into the current store
pub fn decode(text: &str) -> Result<HabitStore, PersistError> {
    let persisted: PersistedStore = serde_json::from_str(text)?;
    let version = persisted.version();
    let store = persisted.migrate()?;
    debug!(version, "decoded persisted store");
    Ok(store)
}

/// Load the store, falling back to the seed habits
pub fn load_store(storage: &impl Storage) -> HabitStore {
    let text = match storage.get(STORE_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!("no stored habits, using defaults");
            return HabitStore::with_defaults();
        }
        Err(e) => {
            warn!(error = %e, "failed to read stored habits, using defaults");
            return HabitStore::with_defaults();
        }
    };

    match decode(&text) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "ignoring stored habits, using defaults");
            HabitStore::with_defaults()
        }
    }
}

/// Persist the store. Returns false (after logging) if the write failed.
pub fn save_store(storage: &mut impl Storage, store: &HabitStore) -> bool {
    let json = match serde_json::to_string(store) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to serialize habits");
            return false;
        }
    };

    match storage.set(STORE_KEY, &json) {
        Ok(()) => {
            debug!(active = store.active.len(), inactive = store.inactive.len(), "saved habits");
            true
        }
        Err(e) => {
            warn!(error = %e, "failed to save habits");
            false
        }
    }
}

/// Forget the persisted store
pub fn clear(storage: &mut impl Storage) -> Result<()> {
    storage.remove(STORE_KEY)
}
