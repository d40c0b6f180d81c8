//! Backup export and import
//!
//! A backup is a pretty-printed JSON document:
//!
//! ```json
//! { "version": "0.2.0", "habits": { "active": [...], "inactive": [...] } }
//! ```
//!
//! Imports are validated field by field against this schema and must carry
//! exactly the running version. Anything else is rejected with a
//! [`BackupError`] and the caller's store is left alone.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::date::key_for;
use crate::habit::Habit;
use crate::store::{HabitStore, StoreError};

/// Version written to, and required from, backup files
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Import validation failures
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backup is missing '{0}'")]
    MissingField(&'static str),

    #[error("Backup version {found} does not match app version {expected}")]
    VersionMismatch { expected: String, found: String },

    #[error("Backup contains an inconsistent store: {0}")]
    Invalid(#[from] StoreError),
}

/// Exported document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: String,
    pub habits: HabitStore,
}

impl ExportDocument {
    pub fn new(store: &HabitStore) -> Self {
        Self {
            version: APP_VERSION.to_string(),
            habits: store.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize backup")
    }
}

/// Import document as read from disk, before validation
#[derive(Debug, Deserialize)]
struct RawBackup {
    version: Option<String>,
    habits: Option<RawHabits>,
}

#[derive(Debug, Deserialize)]
struct RawHabits {
    active: Option<Vec<Habit>>,
    // older exports only wrote the active list
    #[serde(default)]
    inactive: Vec<Habit>,
}

/// Backup filename for a given local date
pub fn export_filename(date: NaiveDate) -> String {
    format!("2-minutes-habits-backup-{}-{}.json", key_for(date), APP_VERSION)
}

/// Write a backup of `store` into `dir`, returning the file path
pub fn export_to_dir(dir: &Path, store: &HabitStore, date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let path = dir.join(export_filename(date));
    let content = ExportDocument::new(store).to_json()?;

    fs::write(&path, content).with_context(|| format!("Failed to write backup: {}", path.display()))?;
    Ok(path)
}

/// Validate a backup document and return the store it holds
pub fn parse_import(text: &str, expected_version: &str) -> Result<HabitStore, BackupError> {
    let raw: RawBackup = serde_json::from_str(text)?;

    let found = raw.version.ok_or(BackupError::MissingField("version"))?;
    if found != expected_version {
        return Err(BackupError::VersionMismatch {
            expected: expected_version.to_string(),
            found,
        });
    }

    let habits = raw.habits.ok_or(BackupError::MissingField("habits"))?;
    let active = habits.active.ok_or(BackupError::MissingField("habits.active"))?;

    let store = HabitStore {
        active,
        inactive: habits.inactive,
    }
    .normalized();
    store.check_invariants()?;
    Ok(store)
}

/// Read and validate a backup file
pub fn read_import(path: &Path, expected_version: &str) -> Result<HabitStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup: {}", path.display()))?;

    parse_import(&text, expected_version)
        .with_context(|| format!("Invalid backup: {}", path.display()))
}
