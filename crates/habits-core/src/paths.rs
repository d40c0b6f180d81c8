//! Standard paths used by the habits tracker

use std::path::PathBuf;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "HABITS_DATA_DIR";

/// Standard habits paths
pub struct Paths {
    /// Data directory (~/.local/share/habits)
    pub data: PathBuf,
    /// Config directory (~/.config/habits)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("habits");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("habits");

        Self { data, config }
    }

    /// Path of the user config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Resolve the directory holding the persisted store.
    ///
    /// `HABITS_DATA_DIR` wins over the config override, which wins over the
    /// platform default.
    pub fn resolve_data_dir(&self, configured: Option<&PathBuf>) -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        configured.cloned().unwrap_or_else(|| self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dirs_end_with_app_name() {
        let paths = Paths::new();
        assert!(paths.data.ends_with("habits"));
        assert!(paths.config.ends_with("habits"));
        assert!(paths.config_file().ends_with("habits/config.json"));
    }
}
