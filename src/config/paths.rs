//! Path management for Storevault
//!
//! Provides XDG-compliant path resolution for the store, snapshot artifacts,
//! the backup registry and the activity log.
//!
//! ## Path Resolution Order
//!
//! 1. `STOREVAULT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/storevault` or `~/.config/storevault`
//! 3. Windows: `%APPDATA%\storevault`

use std::path::PathBuf;

use crate::error::StoreError;

/// Manages all paths used by Storevault
#[derive(Debug, Clone)]
pub struct StorePaths {
    /// Base directory for all Storevault data
    base_dir: PathBuf,
}

impl StorePaths {
    /// Create a new StorePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if neither the override variable nor a home/config
    /// directory can be determined.
    pub fn new() -> Result<Self, StoreError> {
        let base_dir = if let Ok(custom) = std::env::var("STOREVAULT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create StorePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding one JSON file per entity collection
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory holding snapshot artifacts
    pub fn artifact_dir(&self) -> PathBuf {
        self.base_dir.join("artifacts")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the activity log
    pub fn activity_log(&self) -> PathBuf {
        self.base_dir.join("activity.log")
    }

    /// Get the path to the backup record registry
    pub fn backups_file(&self) -> PathBuf {
        self.base_dir.join("backups.json")
    }

    /// Get the path to the restore lock file
    pub fn restore_lock(&self) -> PathBuf {
        self.data_dir().join("restore.lock")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn products_file(&self) -> PathBuf {
        self.data_dir().join("products.json")
    }

    pub fn customers_file(&self) -> PathBuf {
        self.data_dir().join("customers.json")
    }

    pub fn settings_store_file(&self) -> PathBuf {
        self.data_dir().join("settings.json")
    }

    pub fn orders_file(&self) -> PathBuf {
        self.data_dir().join("orders.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| StoreError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| StoreError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.artifact_dir())
            .map_err(|e| StoreError::Io(format!("Failed to create artifact directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default base directory based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, StoreError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                StoreError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("storevault"))
}

/// Resolve the default base directory based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, StoreError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| StoreError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("storevault"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.artifact_dir(), temp_dir.path().join("artifacts"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.artifact_dir().exists());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.backups_file(), temp_dir.path().join("backups.json"));
        assert_eq!(
            paths.products_file(),
            temp_dir.path().join("data").join("products.json")
        );
    }
}
