//! Backup record model
//!
//! A `BackupRecord` is the metadata row describing one snapshot artifact.
//! It moves through a small lifecycle:
//!
//! ```text
//! PENDING --start--> IN_PROGRESS --complete--> COMPLETED
//!    |                    |
//!    +------fail----------+------fail-------> FAILED
//! ```
//!
//! COMPLETED and FAILED are terminal; any further transition is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BackupId;
use crate::error::{StoreError, StoreResult};

/// How a backup was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupType {
    #[default]
    Manual,
    Scheduled,
}

impl fmt::Display for BackupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupType::Manual => write!(f, "MANUAL"),
            BackupType::Scheduled => write!(f, "SCHEDULED"),
        }
    }
}

/// Lifecycle status of a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl BackupStatus {
    /// Whether no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupStatus::Pending => write!(f, "PENDING"),
            BackupStatus::InProgress => write!(f, "IN_PROGRESS"),
            BackupStatus::Completed => write!(f, "COMPLETED"),
            BackupStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Which collections a snapshot contains
///
/// `include_products` covers categories as well as products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionFlags {
    pub include_products: bool,
    pub include_orders: bool,
    pub include_customers: bool,
    pub include_settings: bool,
}

impl Default for InclusionFlags {
    fn default() -> Self {
        Self {
            include_products: true,
            include_orders: false,
            include_customers: true,
            include_settings: true,
        }
    }
}

impl InclusionFlags {
    /// Every collection, orders included
    pub fn all() -> Self {
        Self {
            include_orders: true,
            ..Self::default()
        }
    }
}

/// Where and how a completed snapshot artifact was stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub url: String,
    pub size_bytes: u64,
    pub checksum: String,
}

/// Metadata for one backup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub id: BackupId,

    /// Artifact file name
    pub filename: String,

    /// Artifact size in bytes (0 until completed)
    #[serde(default)]
    pub file_size: u64,

    /// Artifact location, set on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// SHA-256 of the artifact bytes, hex encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    #[serde(rename = "type")]
    pub backup_type: BackupType,

    pub status: BackupStatus,

    /// Total records across the included collections
    #[serde(default)]
    pub record_count: usize,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(flatten)]
    pub inclusion: InclusionFlags,

    pub created_by: String,
}

impl BackupRecord {
    /// Create a new pending backup record
    pub fn new(
        backup_type: BackupType,
        inclusion: InclusionFlags,
        created_by: impl Into<String>,
    ) -> Self {
        let id = BackupId::new();
        let now = Utc::now();
        let filename = format!(
            "backup-{}-{}.json",
            now.format("%Y%m%d-%H%M%S"),
            &id.as_uuid().to_string()[..8]
        );

        Self {
            id,
            filename,
            file_size: 0,
            file_url: None,
            checksum: None,
            backup_type,
            status: BackupStatus::Pending,
            record_count: 0,
            created_at: now,
            completed_at: None,
            error_message: None,
            inclusion,
            created_by: created_by.into(),
        }
    }

    /// PENDING -> IN_PROGRESS
    pub fn start(&mut self) -> StoreResult<()> {
        if self.status != BackupStatus::Pending {
            return Err(self.invalid_state("only pending backups can be started"));
        }
        self.status = BackupStatus::InProgress;
        Ok(())
    }

    /// IN_PROGRESS -> COMPLETED
    pub fn complete(&mut self, artifact: StoredArtifact, record_count: usize) -> StoreResult<()> {
        if self.status != BackupStatus::InProgress {
            return Err(self.invalid_state("only in-progress backups can be completed"));
        }
        self.status = BackupStatus::Completed;
        self.file_url = Some(artifact.url);
        self.file_size = artifact.size_bytes;
        self.checksum = Some(artifact.checksum);
        self.record_count = record_count;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// PENDING | IN_PROGRESS -> FAILED
    pub fn fail(&mut self, message: impl Into<String>) -> StoreResult<()> {
        if self.status.is_terminal() {
            return Err(self.invalid_state("terminal backups cannot change status"));
        }
        self.status = BackupStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Check the backup may be read by a restore and return its artifact URL
    pub fn restorable_url(&self) -> StoreResult<&str> {
        if self.status != BackupStatus::Completed {
            return Err(self.invalid_state("only completed backups can be restored"));
        }
        self.file_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| self.invalid_state("backup has no artifact"))
    }

    fn invalid_state(&self, reason: &str) -> StoreError {
        StoreError::InvalidState {
            id: self.id.short(),
            status: self.status.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> StoredArtifact {
        StoredArtifact {
            url: "file:///tmp/backup.json".into(),
            size_bytes: 128,
            checksum: "abc".into(),
        }
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = BackupRecord::new(BackupType::Manual, InclusionFlags::default(), "admin");
        assert_eq!(record.status, BackupStatus::Pending);
        assert!(record.filename.starts_with("backup-"));
        assert!(record.filename.ends_with(".json"));
        assert!(record.file_url.is_none());
    }

    #[test]
    fn test_happy_path_lifecycle() {
        let mut record = BackupRecord::new(BackupType::Scheduled, InclusionFlags::all(), "cron");
        record.start().unwrap();
        assert_eq!(record.status, BackupStatus::InProgress);

        record.complete(artifact(), 42).unwrap();
        assert_eq!(record.status, BackupStatus::Completed);
        assert_eq!(record.record_count, 42);
        assert_eq!(record.file_size, 128);
        assert!(record.completed_at.is_some());
        assert_eq!(record.restorable_url().unwrap(), "file:///tmp/backup.json");
    }

    #[test]
    fn test_failure_captures_message() {
        let mut record = BackupRecord::new(BackupType::Manual, InclusionFlags::default(), "admin");
        record.start().unwrap();
        record.fail("disk full").unwrap();

        assert_eq!(record.status, BackupStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("disk full"));
        assert!(record.restorable_url().is_err());
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        let mut record = BackupRecord::new(BackupType::Manual, InclusionFlags::default(), "admin");
        record.start().unwrap();
        record.complete(artifact(), 1).unwrap();

        assert!(record.fail("late failure").is_err());
        assert!(record.start().is_err());
        assert!(record.complete(artifact(), 2).is_err());
        assert_eq!(record.status, BackupStatus::Completed);
        assert_eq!(record.record_count, 1);
    }

    #[test]
    fn test_complete_requires_in_progress() {
        let mut record = BackupRecord::new(BackupType::Manual, InclusionFlags::default(), "admin");
        let err = record.complete(artifact(), 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidState { .. }));
    }

    #[test]
    fn test_pending_backup_not_restorable() {
        let record = BackupRecord::new(BackupType::Manual, InclusionFlags::default(), "admin");
        let err = record.restorable_url().unwrap_err();
        assert!(err.to_string().contains("PENDING"));
    }

    #[test]
    fn test_serialized_shape() {
        let record = BackupRecord::new(BackupType::Manual, InclusionFlags::default(), "admin");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "MANUAL");
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["includeProducts"], true);
        assert_eq!(value["includeOrders"], false);
        assert_eq!(value["createdBy"], "admin");
    }
}
