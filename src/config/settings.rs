//! Operator settings for Storevault
//!
//! Manages restore defaults, the transaction timeout, retention of scheduled
//! backups and logging preferences.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::StorePaths;
use crate::backup::ConflictStrategy;
use crate::error::StoreError;

/// Retention settings for scheduled backups
///
/// Manual backups are never pruned automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of completed scheduled backups to keep
    pub scheduled_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            scheduled_count: 14,
        }
    }
}

/// User settings for Storevault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Upper bound on a restore's transactional unit, in seconds
    #[serde(default = "default_restore_timeout_secs")]
    pub restore_timeout_secs: u64,

    /// Conflict strategy used when a restore does not name one
    #[serde(default)]
    pub default_conflict_strategy: ConflictStrategy,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// Default tracing filter when `STOREVAULT_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Actor recorded in the activity log when none is given
    #[serde(default = "default_actor")]
    pub default_actor: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_restore_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_actor() -> String {
    "admin".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            restore_timeout_secs: default_restore_timeout_secs(),
            default_conflict_strategy: ConflictStrategy::default(),
            backup_retention: BackupRetention::default(),
            log_level: default_log_level(),
            default_actor: default_actor(),
        }
    }
}

impl Settings {
    /// The restore transaction timeout as a Duration
    pub fn restore_timeout(&self) -> Duration {
        Duration::from_secs(self.restore_timeout_secs)
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &StorePaths) -> Result<Self, StoreError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| StoreError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                StoreError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &StorePaths) -> Result<(), StoreError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| StoreError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
