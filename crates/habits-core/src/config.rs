//! Configuration management for the habits tracker

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration, read from `~/.config/habits/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// How many habits onboarding lets the user pick
    #[serde(default = "default_max_active_habits")]
    pub max_active_habits: usize,

    /// Default window for `habits stats` (days)
    #[serde(default = "default_stats_days")]
    pub stats_days: u32,

    /// Overrides the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_max_active_habits() -> usize {
    4
}

fn default_stats_days() -> u32 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_active_habits: default_max_active_habits(),
            stats_days: default_stats_days(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_active_habits, 4);
        assert_eq!(config.stats_days, 7);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"stats_days": 30}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.stats_days, 30);
        assert_eq!(config.max_active_habits, 4);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");
        let config = Config {
            max_active_habits: 6,
            stats_days: 14,
            data_dir: Some(PathBuf::from("/tmp/habits-data")),
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
